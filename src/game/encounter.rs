use crate::game::dice::Roller;
use crate::game::rules::{MonsterTemplate, MONSTERS};
use crate::game::types::{Character, Monster};

/// Pick a template uniformly from `catalog`.
pub fn pick_template<'a>(catalog: &'a [MonsterTemplate], roller: &mut dyn Roller) -> Option<&'a MonsterTemplate> {
    if catalog.is_empty() {
        return None;
    }
    catalog.get(roller.roll_index(catalog.len()))
}

/// Start a fresh encounter from the built-in catalog at full hp.
///
/// Any monster already in the slot is replaced, including its remaining hp.
pub fn spawn_encounter(character: &mut Character, roller: &mut dyn Roller) -> Monster {
    // MONSTERS is a non-empty const, the fallback is unreachable in practice
    let template = pick_template(&MONSTERS, roller).unwrap_or(&MONSTERS[0]);
    let monster = Monster::from_template(template);
    if let Some(previous) = character.current_monster.replace(monster.clone()) {
        log::debug!(
            "encounter replaced: {} ({}/{} hp) discarded",
            previous.name,
            previous.hp,
            previous.max_hp
        );
    }
    monster
}
