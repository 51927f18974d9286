use std::fmt;

use thiserror::Error;

/// Which rate-limiting gate denied an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    Farm,
    Attack,
}

impl Gate {
    pub fn as_str(self) -> &'static str {
        match self {
            Gate::Farm => "farm",
            Gate::Attack => "attack",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a [`CharacterStore`](crate::game::store::CharacterStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around IO errors (directory creation, locking, rename).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be parsed or serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing resource cannot be reached right now.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The backing resource existed and was removed behind our back.
    #[error("backing document was deleted: {0}")]
    Deleted(String),
}

/// Errors surfaced by engine operations. Every variant is recoverable and is
/// rendered to the invoking user by the command layer.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unknown character, or a character owned by someone else.
    #[error("character not found: {0}")]
    NotFound(String),

    #[error("character already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid character name: {0}")]
    InvalidName(String),

    /// A gate refused the action. `retry_in` is the number of whole seconds
    /// until the gate reopens.
    #[error("rate limited ({gate}), retry in {retry_in}s")]
    RateLimited { gate: Gate, retry_in: i64 },

    #[error("no active encounter for {0}")]
    NoActiveEncounter(String),

    #[error("unknown attack {attack} for {character}")]
    UnknownAttack { character: String, attack: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl GameError {
    /// Short stable code, one per taxonomy entry.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotFound(_) => "not_found",
            GameError::AlreadyExists(_) => "already_exists",
            GameError::InvalidName(_) => "invalid_name",
            GameError::RateLimited { .. } => "rate_limited",
            GameError::NoActiveEncounter(_) => "no_active_encounter",
            GameError::UnknownAttack { .. } => "unknown_attack",
            GameError::Persistence(_) => "persistence_error",
        }
    }
}
