//! # Configuration
//!
//! TOML configuration for the bot, loaded once at startup.
//!
//! ```toml
//! [bot]
//! name = "FarmBot"
//! command_prefix = "!"
//!
//! [storage]
//! data_dir = "./data"
//! document_file = "characters.json"
//!
//! [logging]
//! level = "info"
//! file = "farmbot.log"
//! ```
//!
//! ```rust,no_run
//! use farmbot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("prefix: {}", config.bot.prefix());
//!     Ok(())
//! }
//! ```
//!
//! Game constants (farm limit, cooldowns, loot tables) are fixed in
//! [`crate::game::rules`] and deliberately absent here.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Prefixes accepted for `command_prefix`. Anything else falls back to `!`.
pub const ALLOWED_PREFIXES: [&str; 7] = ["!", "^", "+", "$", "/", ">", "?"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
}

fn default_prefix() -> String {
    "!".to_string()
}

impl BotConfig {
    /// Effective command prefix after validation.
    pub fn prefix(&self) -> &str {
        let p = self.command_prefix.trim();
        if ALLOWED_PREFIXES.contains(&p) {
            p
        } else {
            "!"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    #[serde(default = "default_document_file")]
    pub document_file: String,
}

fn default_document_file() -> String {
    "characters.json".to_string()
}

impl StorageConfig {
    pub fn document_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.document_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        if config.bot.prefix() != config.bot.command_prefix.trim() {
            log::warn!(
                "command_prefix '{}' not allowed, using '!'",
                config.bot.command_prefix
            );
        }
        Ok(config)
    }

    /// Write the default configuration to `path`
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "FarmBot".to_string(),
                command_prefix: default_prefix(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                document_file: default_document_file(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("farmbot.log".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.bot.name, "FarmBot");
        assert_eq!(config.bot.prefix(), "!");
        assert_eq!(
            config.storage.document_path(),
            PathBuf::from("./data").join("characters.json")
        );
        assert_eq!(config.logging.file.as_deref(), Some("farmbot.log"));
    }

    #[test]
    fn disallowed_prefix_falls_back() {
        let bot = BotConfig {
            name: "x".into(),
            command_prefix: "#".into(),
        };
        assert_eq!(bot.prefix(), "!");
        let bot = BotConfig {
            name: "x".into(),
            command_prefix: " ^ ".into(),
        };
        assert_eq!(bot.prefix(), "^");
    }

    #[test]
    fn optional_keys_default_when_missing() {
        let raw = r#"
[bot]
name = "Tavern"

[storage]
data_dir = "/var/lib/farmbot"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.bot.command_prefix, "!");
        assert_eq!(config.storage.document_file, "characters.json");
        assert!(config.logging.file.is_none());
    }

    #[tokio::test]
    async fn create_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let config = Config::load(path).await.unwrap();
        assert_eq!(config.bot.name, "FarmBot");
        assert_eq!(config.storage.document_file, "characters.json");
    }
}
