//! Persistent records: [`Character`], [`Monster`] and the whole-store [`Document`].
//!
//! Field names on disk keep the historical bot layout (`niveau`, `xp`, `attaques`,
//! `inventaire`, `farm_uses`, `last_farm_reset`, `last_attack`, `current_monster`,
//! `rang_en_attente`) so existing documents load unchanged. Unknown keys set at
//! creation time are preserved through [`Character::extra`].
//!
//! Older documents may hold numbers as text (`"niveau": "5"`) because creation
//! attributes used to be stored verbatim; the numeric fields accept both forms. A
//! record that still does not parse is set aside in the [`Document`] and written
//! back unchanged, so one bad record never locks out the other players.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::game::rules::{xp_to_next_level, MonsterTemplate};
use crate::logutil::escape_log;

fn default_level() -> u32 {
    1
}

fn default_rank() -> String {
    "F".to_string()
}

/// Number-or-numeric-text field readers.
mod loose {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Text(String),
    }

    fn integer<E: Error>(loose: Loose) -> Result<i64, E> {
        match loose {
            Loose::Unsigned(v) => i64::try_from(v).map_err(|_| E::custom(format!("{} out of range", v))),
            Loose::Signed(v) => Ok(v),
            Loose::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(v as i64),
            Loose::Float(v) => Err(E::custom(format!("expected an integer, got {}", v))),
            Loose::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("expected an integer, got {:?}", s))),
        }
    }

    pub fn to_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = integer::<D::Error>(Loose::deserialize(d)?)?;
        u32::try_from(v).map_err(|_| D::Error::custom(format!("{} out of range", v)))
    }

    pub fn to_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        integer(Loose::deserialize(d)?)
    }

    pub fn to_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Loose::deserialize(d)? {
            Loose::Unsigned(v) => Ok(v as f64),
            Loose::Signed(v) => Ok(v as f64),
            Loose::Float(v) => Ok(v),
            Loose::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", s))),
        }
    }
}

/// Live monster bound to exactly one character's `current_monster` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub weakness: String,
    #[serde(default)]
    pub color: u32,
}

impl Monster {
    pub fn from_template(template: &MonsterTemplate) -> Self {
        Monster {
            name: template.name.to_string(),
            hp: template.max_hp,
            max_hp: template.max_hp,
            weakness: template.weakness.to_string(),
            color: template.color,
        }
    }

    /// Subtract `damage` with a floor of zero. Returns the remaining hp.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.hp = self.hp.saturating_sub(damage);
        self.hp
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}

/// One player character. The character's name is its key in the [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// External identity of the creator; never reassigned.
    pub owner: String,
    #[serde(rename = "niveau", default = "default_level", deserialize_with = "loose::to_u32")]
    pub level: u32,
    #[serde(rename = "xp", default, deserialize_with = "loose::to_u32")]
    pub experience: u32,
    #[serde(default = "default_rank")]
    pub rank: String,
    /// attack id -> display label
    #[serde(rename = "attaques", default)]
    pub attacks: BTreeMap<String, String>,
    #[serde(rename = "inventaire", default)]
    pub inventory: Vec<String>,
    /// Farm actions consumed in the current window
    #[serde(rename = "farm_uses", default, deserialize_with = "loose::to_u32")]
    pub farm_uses: u32,
    /// Unix seconds at which the current farm window opened (0 = never)
    #[serde(rename = "last_farm_reset", default, deserialize_with = "loose::to_i64")]
    pub farm_window_start: i64,
    #[serde(default)]
    pub current_monster: Option<Monster>,
    #[serde(rename = "rang_en_attente", default)]
    pub pending_rank: Option<String>,
    /// Unix seconds (fractional) of the last accepted attack (0 = never)
    #[serde(rename = "last_attack", default, deserialize_with = "loose::to_f64")]
    pub last_attack: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Character {
    /// Fresh level-1 character for `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Character {
            owner: owner.into(),
            level: default_level(),
            experience: 0,
            rank: default_rank(),
            attacks: BTreeMap::new(),
            inventory: Vec::new(),
            farm_uses: 0,
            farm_window_start: 0,
            current_monster: None,
            pending_rank: None,
            last_attack: 0.0,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }

    pub fn in_encounter(&self) -> bool {
        self.current_monster.is_some()
    }

    /// Timestamp of the last attack, or `None` if the character never attacked.
    pub fn last_attack_time(&self) -> Option<f64> {
        (self.last_attack > 0.0).then_some(self.last_attack)
    }

    /// Experience still needed for the next level.
    pub fn xp_remaining(&self) -> u32 {
        xp_to_next_level(self.level).saturating_sub(self.experience)
    }
}

/// The full character set, keyed by character name. This is the unit the store
/// loads and saves atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    characters: BTreeMap<String, Character>,
    /// Records that failed to parse, written back verbatim on save
    unreadable: BTreeMap<String, serde_json::Value>,
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(untagged)]
        enum Entry<'a> {
            Parsed(&'a Character),
            Raw(&'a serde_json::Value),
        }
        let mut merged: BTreeMap<&str, Entry<'_>> = self
            .unreadable
            .iter()
            .map(|(name, raw)| (name.as_str(), Entry::Raw(raw)))
            .collect();
        for (name, character) in &self.characters {
            merged.insert(name.as_str(), Entry::Parsed(character));
        }
        serializer.collect_map(merged)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Document::from_records(records))
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from raw records, setting aside the ones that do not parse.
    pub fn from_records(records: BTreeMap<String, serde_json::Value>) -> Self {
        let mut document = Document::new();
        for (name, raw) in records {
            match Character::deserialize(&raw) {
                Ok(character) => {
                    document.characters.insert(name, character);
                }
                Err(e) => {
                    log::warn!("skipping unreadable character {}: {}", escape_log(&name), e);
                    document.unreadable.insert(name, raw);
                }
            }
        }
        document
    }

    /// Names of records kept verbatim because they could not be parsed.
    pub fn unreadable_names(&self) -> Vec<String> {
        self.unreadable.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// True for parsed and unreadable records alike, so names stay unique.
    pub fn contains(&self, name: &str) -> bool {
        self.characters.contains_key(name) || self.unreadable.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.get_mut(name)
    }

    /// Insert or replace a character.
    pub fn insert(&mut self, name: impl Into<String>, character: Character) {
        let name = name.into();
        self.unreadable.remove(&name);
        self.characters.insert(name, character);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Character)> {
        self.characters.iter()
    }

    /// Names of the characters created by `owner`, in name order.
    pub fn owned_by(&self, owner: &str) -> Vec<String> {
        self.characters
            .iter()
            .filter(|(_, c)| c.is_owned_by(owner))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of distinct owners in the document.
    pub fn owner_count(&self) -> usize {
        let mut owners: Vec<&str> = self.characters.values().map(|c| c.owner.as_str()).collect();
        owners.sort_unstable();
        owners.dedup();
        owners.len()
    }
}
