//! # Game core
//!
//! Character progression state machine and its persistence contract.
//!
//! - [`types`] - `Character`, `Monster` and the whole-store `Document`
//! - [`rules`] - fixed constants, monster catalog and loot tables
//! - [`rate_limit`] - farm budget and attack cooldown gates
//! - [`encounter`] - monster spawning on a successful farm
//! - [`combat`] - damage, crit, victory, loot and cascading level-ups
//! - [`store`] - `CharacterStore` trait with JSON file and in-memory backends
//! - [`engine`] - serialized load→mutate→save cycles behind one lock
//! - [`resolver`] - owner-scoped exact/fuzzy character name resolution
//! - [`dice`] / [`clock`] - injectable randomness and time
//!
//! ```text
//! command ─▶ Engine (lock) ─▶ store.load ─▶ resolve name ─▶ gates / combat ─▶ store.save
//! ```

pub mod clock;
pub mod combat;
pub mod dice;
pub mod encounter;
pub mod engine;
pub mod errors;
pub mod rate_limit;
pub mod resolver;
pub mod rules;
pub mod store;
pub mod types;

pub use engine::Engine;
pub use errors::{GameError, Gate, StoreError};
pub use types::{Character, Document, Monster};
