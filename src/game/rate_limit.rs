//! Farm budget and attack cooldown gates.
//!
//! Both gates read and write state stored on the [`Character`] itself, so they are
//! persisted with the document and survive restarts:
//! - Farm: [`FARM_LIMIT`] uses per [`FARM_RESET_SECONDS`] window. The window opens
//!   lazily on the first farm attempted after the previous one expired.
//! - Attack: at least [`ATTACK_COOLDOWN_SECONDS`] between accepted attacks.
//!
//! A denial never touches gate state.

use chrono::{DateTime, Utc};

use crate::game::clock::unix_seconds_f64;
use crate::game::errors::{GameError, Gate};
use crate::game::rules::{ATTACK_COOLDOWN_SECONDS, FARM_LIMIT, FARM_RESET_SECONDS};
use crate::game::types::Character;

/// Farm uses left after a successful farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmBudget {
    pub used: u32,
    pub limit: u32,
}

impl FarmBudget {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

fn farm_window_expired(character: &Character, now: i64) -> bool {
    now - character.farm_window_start >= FARM_RESET_SECONDS
}

/// Consume one farm use, opening a new window first if the old one expired.
pub fn consume_farm(character: &mut Character, now: DateTime<Utc>) -> Result<FarmBudget, GameError> {
    let now_secs = now.timestamp();
    let expired = farm_window_expired(character, now_secs);
    let used = if expired { 0 } else { character.farm_uses };
    if used >= FARM_LIMIT {
        let retry_in = (character.farm_window_start + FARM_RESET_SECONDS - now_secs).max(0);
        return Err(GameError::RateLimited {
            gate: Gate::Farm,
            retry_in,
        });
    }
    if expired {
        character.farm_uses = 0;
        character.farm_window_start = now_secs;
    }
    character.farm_uses += 1;
    Ok(FarmBudget {
        used: character.farm_uses,
        limit: FARM_LIMIT,
    })
}

/// Farm uses still available at `now`, without consuming one.
pub fn farm_uses_left(character: &Character, now: DateTime<Utc>) -> u32 {
    if farm_window_expired(character, now.timestamp()) {
        FARM_LIMIT
    } else {
        FARM_LIMIT.saturating_sub(character.farm_uses)
    }
}

/// Check the attack cooldown without recording anything.
pub fn ensure_attack_ready(character: &Character, now: DateTime<Utc>) -> Result<(), GameError> {
    let now_secs = unix_seconds_f64(now);
    let elapsed = now_secs - character.last_attack;
    if elapsed < ATTACK_COOLDOWN_SECONDS {
        let retry_in = (ATTACK_COOLDOWN_SECONDS - elapsed).ceil().max(1.0) as i64;
        return Err(GameError::RateLimited {
            gate: Gate::Attack,
            retry_in,
        });
    }
    Ok(())
}

/// Stamp an accepted attack. Never moves the timestamp backwards.
pub fn record_attack(character: &mut Character, now: DateTime<Utc>) {
    let now_secs = unix_seconds_f64(now);
    if now_secs > character.last_attack {
        character.last_attack = now_secs;
    }
}

/// Full attack gate: deny inside the cooldown, otherwise stamp `now`.
pub fn pass_attack_gate(character: &mut Character, now: DateTime<Utc>) -> Result<(), GameError> {
    ensure_attack_ready(character, now)?;
    record_attack(character, now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn farm_limit_then_denied() {
        let mut c = Character::new("u1");
        for i in 1..=FARM_LIMIT {
            let budget = consume_farm(&mut c, t0() + Duration::seconds(i as i64)).unwrap();
            assert_eq!(budget.used, i);
        }
        let before = c.clone();
        let err = consume_farm(&mut c, t0() + Duration::seconds(60)).unwrap_err();
        match err {
            GameError::RateLimited { gate, retry_in } => {
                assert_eq!(gate, Gate::Farm);
                assert!(retry_in > 0 && retry_in <= FARM_RESET_SECONDS);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c, before, "denial must not mutate");
    }

    #[test]
    fn farm_window_resets_after_expiry() {
        let mut c = Character::new("u1");
        for _ in 0..FARM_LIMIT {
            consume_farm(&mut c, t0()).unwrap();
        }
        let later = t0() + Duration::seconds(FARM_RESET_SECONDS);
        assert_eq!(farm_uses_left(&c, later), FARM_LIMIT);
        let budget = consume_farm(&mut c, later).unwrap();
        assert_eq!(budget.used, 1);
        assert_eq!(budget.remaining(), FARM_LIMIT - 1);
        assert_eq!(c.farm_window_start, later.timestamp());
    }

    #[test]
    fn first_farm_opens_window() {
        let mut c = Character::new("u1");
        consume_farm(&mut c, t0()).unwrap();
        assert_eq!(c.farm_window_start, t0().timestamp());
        assert_eq!(c.farm_uses, 1);
    }

    #[test]
    fn attack_cooldown_denies_without_mutation() {
        let mut c = Character::new("u1");
        pass_attack_gate(&mut c, t0()).unwrap();
        let stamped = c.last_attack;
        let err = pass_attack_gate(&mut c, t0() + Duration::seconds(9)).unwrap_err();
        assert!(matches!(
            err,
            GameError::RateLimited {
                gate: Gate::Attack,
                retry_in: 1
            }
        ));
        assert_eq!(c.last_attack, stamped);
        pass_attack_gate(&mut c, t0() + Duration::seconds(10)).unwrap();
        assert!(c.last_attack > stamped);
    }

    #[test]
    fn never_attacked_is_ready() {
        let c = Character::new("u1");
        assert!(ensure_attack_ready(&c, t0()).is_ok());
    }
}
