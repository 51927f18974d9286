//! Test utilities & fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use farmbot::game::clock::ManualClock;
use farmbot::game::dice::{Roll, ScriptedRolls};
use farmbot::game::rules::MONSTERS;
use farmbot::game::store::CharacterStore;
use farmbot::game::{Character, Document, Engine, Monster};

/// Fixed starting instant for deterministic clocks.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap()
}

/// Engine over `store` with a manual clock and a scripted roll sequence.
pub fn scripted_engine(
    store: Arc<dyn CharacterStore>,
    rolls: Vec<Roll>,
) -> (Engine, ManualClock) {
    let clock = ManualClock::new(start_time());
    let engine = Engine::new(store)
        .with_clock(Arc::new(clock.clone()))
        .with_roller(Box::new(ScriptedRolls::new(rolls)));
    (engine, clock)
}

/// Character owned by `owner` with one attack, optionally mid-fight with
/// catalog monster `monster_idx` at `hp`.
pub fn fighter(owner: &str, monster: Option<(usize, u32)>) -> Character {
    let mut c = Character::new(owner);
    c.attacks.insert("attaque1".into(), "Boule de feu".into());
    c.attacks.insert("attaque2".into(), "Coup de bâton".into());
    if let Some((idx, hp)) = monster {
        let mut m = Monster::from_template(&MONSTERS[idx]);
        m.hp = hp;
        c.current_monster = Some(m);
    }
    c
}

pub fn document(entries: Vec<(&str, Character)>) -> Document {
    let mut doc = Document::new();
    for (name, c) in entries {
        doc.insert(name, c);
    }
    doc
}
