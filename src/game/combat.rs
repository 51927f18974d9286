//! Attack resolution: damage and crit, hp floor, victory, loot and cascading level-ups.
//!
//! Roll order is fixed so a seeded or scripted [`Roller`] reproduces a fight exactly:
//! 1. base damage in [`BASE_DAMAGE`]
//! 2. crit check ([`CRIT_CHANCE`])
//! 3. on victory only: experience in [`XP_PER_KILL`], common loot check, common pick
//!    (if hit), rare loot check, rare pick (if hit)

use chrono::{DateTime, Utc};

use crate::game::dice::Roller;
use crate::game::errors::GameError;
use crate::game::rate_limit::{ensure_attack_ready, record_attack};
use crate::game::rules::{
    xp_to_next_level, BASE_DAMAGE, COMMON_LOOT_CHANCE, CRIT_CHANCE, CRIT_MULTIPLIER, LOOT_COMMON,
    LOOT_RARE, RARE_LOOT_CHANCE, XP_PER_KILL,
};
use crate::game::types::{Character, Monster};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootDrop {
    pub item: String,
    pub rarity: Rarity,
}

/// Rewards of a kill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victory {
    pub experience_gained: u32,
    pub loot: Vec<LootDrop>,
    /// Every level reached by this kill, in order.
    pub levels_reached: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub attack_label: String,
    pub damage: u32,
    pub critical: bool,
    /// Monster state right after the hit (hp may be 0).
    pub monster: Monster,
    pub victory: Option<Victory>,
}

/// Add `gain` experience and level up as long as the threshold of the *current*
/// level is met. Returns the levels reached, in order.
pub fn apply_experience(character: &mut Character, gain: u32) -> Vec<u32> {
    character.experience = character.experience.saturating_add(gain);
    let mut reached = Vec::new();
    loop {
        let need = xp_to_next_level(character.level);
        if need == 0 || character.experience < need {
            break;
        }
        character.experience -= need;
        character.level += 1;
        reached.push(character.level);
    }
    reached
}

fn roll_damage(roller: &mut dyn Roller) -> (u32, bool) {
    let base = roller.roll_range(BASE_DAMAGE.0, BASE_DAMAGE.1);
    let critical = roller.roll_chance(CRIT_CHANCE);
    let damage = if critical {
        base.saturating_mul(CRIT_MULTIPLIER)
    } else {
        base
    };
    (damage, critical)
}

fn roll_loot(roller: &mut dyn Roller) -> Vec<LootDrop> {
    let mut loot = Vec::new();
    if roller.roll_chance(COMMON_LOOT_CHANCE) {
        let item = LOOT_COMMON[roller.roll_index(LOOT_COMMON.len())];
        loot.push(LootDrop {
            item: item.to_string(),
            rarity: Rarity::Common,
        });
    }
    if roller.roll_chance(RARE_LOOT_CHANCE) {
        let item = LOOT_RARE[roller.roll_index(LOOT_RARE.len())];
        loot.push(LootDrop {
            item: item.to_string(),
            rarity: Rarity::Rare,
        });
    }
    loot
}

fn claim_victory(character: &mut Character, roller: &mut dyn Roller) -> Victory {
    character.current_monster = None;
    let experience_gained = roller.roll_range(XP_PER_KILL.0, XP_PER_KILL.1);
    let loot = roll_loot(roller);
    character
        .inventory
        .extend(loot.iter().map(|drop| drop.item.clone()));
    let levels_reached = apply_experience(character, experience_gained);
    Victory {
        experience_gained,
        loot,
        levels_reached,
    }
}

/// Resolve one attack by `name` using `attack_id`.
///
/// Checks, in order: active encounter, attack cooldown, known attack id. Nothing is
/// mutated unless all three pass.
pub fn resolve_attack(
    name: &str,
    character: &mut Character,
    attack_id: &str,
    now: DateTime<Utc>,
    roller: &mut dyn Roller,
) -> Result<AttackOutcome, GameError> {
    if character.current_monster.is_none() {
        return Err(GameError::NoActiveEncounter(name.to_string()));
    }
    ensure_attack_ready(character, now)?;
    let attack_label = character
        .attacks
        .get(attack_id)
        .cloned()
        .ok_or_else(|| GameError::UnknownAttack {
            character: name.to_string(),
            attack: attack_id.to_string(),
        })?;

    record_attack(character, now);
    let (damage, critical) = roll_damage(roller);

    let monster = match character.current_monster.as_mut() {
        Some(m) => {
            m.take_damage(damage);
            m.clone()
        }
        None => return Err(GameError::NoActiveEncounter(name.to_string())),
    };

    let victory = if monster.is_defeated() {
        Some(claim_victory(character, roller))
    } else {
        None
    };

    Ok(AttackOutcome {
        attack_label,
        damage,
        critical,
        monster,
        victory,
    })
}
