//! Fixed game rules: rate-limit constants, combat ranges, the monster catalog and loot tables.
//!
//! These values are part of the game contract and are deliberately not read from config.

/// Farm actions allowed per reset window.
pub const FARM_LIMIT: u32 = 3;
/// Length of the farm window in seconds (3h).
pub const FARM_RESET_SECONDS: i64 = 3 * 60 * 60;
/// Minimum seconds between two attacks of the same character.
pub const ATTACK_COOLDOWN_SECONDS: f64 = 10.0;
/// Experience needed per level: reaching `level + 1` costs `level * LEVEL_XP_UNIT`.
pub const LEVEL_XP_UNIT: u32 = 20;

/// Inclusive experience range granted per kill.
pub const XP_PER_KILL: (u32, u32) = (5, 10);
/// Inclusive base damage range of an attack.
pub const BASE_DAMAGE: (u32, u32) = (4, 8);
pub const CRIT_CHANCE: f64 = 0.10;
pub const CRIT_MULTIPLIER: u32 = 2;

pub const COMMON_LOOT_CHANCE: f64 = 0.25;
pub const RARE_LOOT_CHANCE: f64 = 0.05;

pub const LOOT_COMMON: [&str; 3] = ["Peau", "Griffe", "Potion"];
pub const LOOT_RARE: [&str; 2] = ["Épée légendaire", "Anneau magique"];

/// Static catalog entry for a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub max_hp: u32,
    /// Elemental weakness tag (display only)
    pub weakness: &'static str,
    /// Embed color as 0xRRGGBB
    pub color: u32,
}

pub const MONSTERS: [MonsterTemplate; 3] = [
    MonsterTemplate {
        name: "Gobelin",
        max_hp: 20,
        weakness: "feu",
        color: 0x2ecc71,
    },
    MonsterTemplate {
        name: "Loup",
        max_hp: 30,
        weakness: "terre",
        color: 0x95a5a6,
    },
    MonsterTemplate {
        name: "Orc",
        max_hp: 40,
        weakness: "eau",
        color: 0xe74c3c,
    },
];

/// Experience required to leave `level`.
pub fn xp_to_next_level(level: u32) -> u32 {
    level.saturating_mul(LEVEL_XP_UNIT)
}
