//! The engine owns the shared state and runs every command as one serialized
//! load→mutate→save cycle.
//!
//! Concurrency: a single `tokio::sync::Mutex` guards the random source and, by
//! convention, the whole document. A command holds it from `load` until its `save`
//! returns, so two commands can never interleave their read-modify-write cycles and
//! no save can clobber another command's update. The lock is process-wide; several
//! processes sharing one JSON file would need optimistic versioning instead.
//!
//! Failure atomicity: the mutated document is saved once, only when the operation
//! succeeds. Any error drops the in-memory copy, so nothing partial is persisted. A
//! failed load or save is retried once before it surfaces as
//! [`GameError::Persistence`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::game::clock::{Clock, SystemClock};
use crate::game::combat::{resolve_attack, AttackOutcome};
use crate::game::dice::{entropy_roller, Roller};
use crate::game::encounter::spawn_encounter;
use crate::game::errors::{GameError, StoreError};
use crate::game::rate_limit::{consume_farm, farm_uses_left, FarmBudget};
use crate::game::resolver::{resolve_name, EditDistanceMatcher, NameMatcher};
use crate::game::store::CharacterStore;
use crate::game::types::{Character, Document, Monster};
use crate::logutil::escape_log;

/// Longest accepted character name, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// Keys that `create` may not set through `key=value` attributes.
const RESERVED_KEYS: [&str; 9] = [
    "owner",
    "niveau",
    "xp",
    "inventaire",
    "farm_uses",
    "last_farm_reset",
    "current_monster",
    "last_attack",
    "name",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CreationReport {
    pub name: String,
    pub character: Character,
    /// Attribute keys that were refused (reserved fields)
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmReport {
    pub name: String,
    pub monster: Monster,
    pub budget: FarmBudget,
    /// Monster that was still active and got discarded by this farm
    pub replaced: Option<Monster>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackReport {
    pub name: String,
    pub outcome: AttackOutcome,
    pub level: u32,
    pub experience: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetView {
    pub name: String,
    pub character: Character,
    pub farm_uses_left: u32,
}

pub struct Engine {
    store: Arc<dyn CharacterStore>,
    clock: Arc<dyn Clock>,
    matcher: Arc<dyn NameMatcher>,
    /// The document lock. Also guards the roller so rolls follow command order.
    roller: Mutex<Box<dyn Roller>>,
}

impl Engine {
    /// Engine with the system clock, an entropy-seeded roller and fuzzy name matching.
    pub fn new(store: Arc<dyn CharacterStore>) -> Self {
        Engine {
            store,
            clock: Arc::new(SystemClock),
            matcher: Arc::new(EditDistanceMatcher::default()),
            roller: Mutex::new(entropy_roller()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_roller(mut self, roller: Box<dyn Roller>) -> Self {
        self.roller = Mutex::new(roller);
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn NameMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn store(&self) -> &Arc<dyn CharacterStore> {
        &self.store
    }

    fn load_with_retry(&self) -> Result<Document, StoreError> {
        self.store.load().or_else(|e| {
            log::warn!("load from {} failed ({}), retrying once", self.store.describe(), e);
            self.store.load()
        })
    }

    fn save_with_retry(&self, document: &Document) -> Result<(), StoreError> {
        self.store.save(document).or_else(|e| {
            log::warn!("save to {} failed ({}), retrying once", self.store.describe(), e);
            self.store.save(document)
        })
    }

    /// Run `op` against a freshly loaded document and persist the result once.
    async fn mutate<T, F>(&self, op: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut Document, &mut dyn Roller, DateTime<Utc>) -> Result<T, GameError>,
    {
        let mut roller = self.roller.lock().await;
        let mut document = self.load_with_retry().map_err(|e| {
            log::error!("character document unavailable: {}", e);
            GameError::from(e)
        })?;
        let now = self.clock.now();
        let value = op(&mut document, &mut **roller, now)?;
        self.save_with_retry(&document).map_err(|e| {
            log::error!("character document not saved: {}", e);
            GameError::from(e)
        })?;
        Ok(value)
    }

    /// Run `op` against a freshly loaded document without saving.
    async fn inspect<T, F>(&self, op: F) -> Result<T, GameError>
    where
        F: FnOnce(&Document, DateTime<Utc>) -> Result<T, GameError>,
    {
        let _guard = self.roller.lock().await;
        let document = self.load_with_retry()?;
        op(&document, self.clock.now())
    }

    fn resolve(&self, document: &Document, owner: &str, query: &str) -> Result<String, GameError> {
        let owned = document.owned_by(owner);
        resolve_name(query, &owned, self.matcher.as_ref())
            .ok_or_else(|| GameError::NotFound(query.to_string()))
    }

    /// Create a character owned by `owner`.
    ///
    /// Attribute keys starting with `attaque` register attacks, `rank` and
    /// `rang_en_attente` set the rank fields, reserved keys are ignored and anything
    /// else is kept as a free-form attribute.
    pub async fn create_character(
        &self,
        owner: &str,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<CreationReport, GameError> {
        validate_name(name)?;
        let report = self
            .mutate(|document, _roller, _now| {
                if document.contains(name) {
                    return Err(GameError::AlreadyExists(name.to_string()));
                }
                let (character, ignored) = build_character(owner, attributes);
                document.insert(name, character.clone());
                Ok(CreationReport {
                    name: name.to_string(),
                    character,
                    ignored,
                })
            })
            .await?;
        log::info!(
            "character created: {} (owner {}, {} attacks)",
            escape_log(name),
            owner,
            report.character.attacks.len()
        );
        Ok(report)
    }

    /// Names of the characters owned by `owner`.
    pub async fn list_owned(&self, owner: &str) -> Result<Vec<String>, GameError> {
        self.inspect(|document, _now| Ok(document.owned_by(owner))).await
    }

    /// Spend one farm use and start a new encounter.
    pub async fn farm(&self, owner: &str, query: &str) -> Result<FarmReport, GameError> {
        self.mutate(|document, roller, now| {
            let name = self.resolve(document, owner, query)?;
            let character = document
                .get_mut(&name)
                .ok_or_else(|| GameError::NotFound(query.to_string()))?;
            let budget = consume_farm(character, now)?;
            let replaced = character.current_monster.clone();
            let monster = spawn_encounter(character, roller);
            log::debug!(
                "farm: {} meets {} ({}/{} uses)",
                escape_log(&name),
                monster.name,
                budget.used,
                budget.limit
            );
            Ok(FarmReport {
                name,
                monster,
                budget,
                replaced,
            })
        })
        .await
    }

    /// Attack the active monster with `attack_id`.
    pub async fn attack(&self, owner: &str, query: &str, attack_id: &str) -> Result<AttackReport, GameError> {
        let report = self
            .mutate(|document, roller, now| {
                let name = self.resolve(document, owner, query)?;
                let character = document
                    .get_mut(&name)
                    .ok_or_else(|| GameError::NotFound(query.to_string()))?;
                let outcome = resolve_attack(&name, character, attack_id, now, roller)?;
                Ok(AttackReport {
                    level: character.level,
                    experience: character.experience,
                    name,
                    outcome,
                })
            })
            .await?;
        if let Some(victory) = &report.outcome.victory {
            log::info!(
                "victory: {} defeated {} (+{} xp, {} drops)",
                escape_log(&report.name),
                report.outcome.monster.name,
                victory.experience_gained,
                victory.loot.len()
            );
            for level in &victory.levels_reached {
                log::info!("level up: {} reached level {}", escape_log(&report.name), level);
            }
        }
        Ok(report)
    }

    /// Read-only view of one of `owner`'s characters.
    pub async fn sheet(&self, owner: &str, query: &str) -> Result<SheetView, GameError> {
        self.inspect(|document, now| {
            let name = self.resolve(document, owner, query)?;
            let character = document
                .get(&name)
                .cloned()
                .ok_or_else(|| GameError::NotFound(query.to_string()))?;
            Ok(SheetView {
                farm_uses_left: farm_uses_left(&character, now),
                name,
                character,
            })
        })
        .await
    }

    /// Consistent copy of the whole document.
    pub async fn snapshot(&self) -> Result<Document, GameError> {
        self.inspect(|document, _now| Ok(document.clone())).await
    }
}

/// Character names are single tokens of printable characters.
pub fn validate_name(name: &str) -> Result<(), GameError> {
    let invalid = name.is_empty()
        || name.chars().count() > MAX_NAME_CHARS
        || name.chars().any(|c| c.is_whitespace() || c.is_control());
    if invalid {
        return Err(GameError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn build_character(owner: &str, attributes: &[(String, String)]) -> (Character, Vec<String>) {
    let mut character = Character::new(owner);
    let mut ignored = Vec::new();
    for (key, value) in attributes {
        if key.starts_with("attaque") {
            character.attacks.insert(key.clone(), value.clone());
        } else if key == "rank" {
            character.rank = value.clone();
        } else if key == "rang_en_attente" {
            character.pending_rank = Some(value.clone());
        } else if RESERVED_KEYS.contains(&key.as_str()) {
            ignored.push(key.clone());
        } else {
            character
                .extra
                .insert(key.clone(), serde_json::Value::String(value.clone()));
        }
    }
    (character, ignored)
}
