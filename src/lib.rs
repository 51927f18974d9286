//! # FarmBot - chat-command micro-RPG
//!
//! Players create characters, spend a limited number of expeditions ("farms") to meet
//! monsters, fight them with cooldown-gated attacks, collect loot and level up.
//!
//! ## Features
//!
//! - **Rate limiting**: 3 expeditions per 3-hour window, 10 s attack cooldown.
//! - **Combat**: random damage with crits, loot tables, cascading level-ups.
//! - **Persistence**: one JSON document for all characters, compatible with the
//!   French-keyed layout (`niveau`, `attaques`, `inventaire`, ...).
//! - **Concurrency**: every command runs one load→mutate→save cycle behind a single
//!   engine lock, so concurrent commands never lose updates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use farmbot::bot::{CommandHandler, CommandParser};
//! use farmbot::game::{store::JsonFileStore, Engine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(JsonFileStore::new("./data", "characters.json"));
//!     let handler = CommandHandler::new(Arc::new(Engine::new(store)), CommandParser::new("!"));
//!     if let Some(reply) = handler.handle("42", "!create Arwen attaque1=Feu").await {
//!         println!("{}", reply.render());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - engine, rules, rate limiting, encounters, combat and storage
//! - [`bot`] - command parsing, dispatch, reply rendering and the console transport
//! - [`config`] - TOML configuration
//! - [`logutil`] - log-safe escaping of user text
//! - [`metrics`] - process-wide activity counters

pub mod bot;
pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
