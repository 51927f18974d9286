//! Process-wide counters for bot activity: commands handled, gate denials, victories
//! and level-ups. Exposed through [`snapshot`] for `farmbot status` and tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::game::errors::Gate;

static FARM_DENIALS: AtomicU64 = AtomicU64::new(0);
static ATTACK_DENIALS: AtomicU64 = AtomicU64::new(0);
static VICTORIES: AtomicU64 = AtomicU64::new(0);
static LEVEL_UPS: AtomicU64 = AtomicU64::new(0);
static FAILED_COMMANDS: AtomicU64 = AtomicU64::new(0);

static COMMAND_COUNTERS: OnceLock<Mutex<HashMap<String, u64>>> = OnceLock::new();

fn command_counter_lock() -> &'static Mutex<HashMap<String, u64>> {
    COMMAND_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Count one handled command under `name` (e.g. "farm").
pub fn record_command(name: &str) -> u64 {
    let mut guard = match command_counter_lock().lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let counter = guard.entry(name.to_string()).or_default();
    *counter = counter.saturating_add(1);
    *counter
}

pub fn record_denial(gate: Gate) {
    match gate {
        Gate::Farm => FARM_DENIALS.fetch_add(1, Ordering::Relaxed),
        Gate::Attack => ATTACK_DENIALS.fetch_add(1, Ordering::Relaxed),
    };
}

pub fn record_victory(levels_gained: usize) {
    VICTORIES.fetch_add(1, Ordering::Relaxed);
    LEVEL_UPS.fetch_add(levels_gained as u64, Ordering::Relaxed);
}

pub fn record_failure() {
    FAILED_COMMANDS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub commands: HashMap<String, u64>,
    pub farm_denials: u64,
    pub attack_denials: u64,
    pub victories: u64,
    pub level_ups: u64,
    pub failed_commands: u64,
}

pub fn snapshot() -> Snapshot {
    let commands = match command_counter_lock().lock() {
        Ok(g) => g.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    Snapshot {
        commands,
        farm_denials: FARM_DENIALS.load(Ordering::Relaxed),
        attack_denials: ATTACK_DENIALS.load(Ordering::Relaxed),
        victories: VICTORIES.load(Ordering::Relaxed),
        level_ups: LEVEL_UPS.load(Ordering::Relaxed),
        failed_commands: FAILED_COMMANDS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are global and other tests bump them too, so only assert growth.
    #[test]
    fn counters_grow() {
        let before = snapshot();
        let n = record_command("unit-test-cmd");
        record_denial(Gate::Attack);
        record_victory(2);
        let after = snapshot();
        assert!(n >= 1);
        assert_eq!(after.commands.get("unit-test-cmd"), Some(&n));
        assert!(after.attack_denials > before.attack_denials);
        assert!(after.level_ups >= before.level_ups + 2);
    }
}
