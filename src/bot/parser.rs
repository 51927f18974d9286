//! Chat command parser.
//!
//! Commands must start with the configured prefix (default `!`) so normal
//! conversation never triggers the bot. Command words are case-insensitive and the
//! historical French names are accepted as aliases:
//!
//! | Command | Alias | Arguments |
//! |---|---|---|
//! | `create` | `addpersonnage` | `<name> [key=value ...]` |
//! | `farm` | | `[name ...]` (rest of line) |
//! | `attack` | | `<name> <attack_id>` |
//! | `sheet` | `fiche` | `<name>` |
//! | `help` | `menu` | |
use log::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Create {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Farm {
        name: Option<String>,
    },
    Attack {
        name: String,
        attack: String,
    },
    Sheet {
        name: String,
    },
    Help,
    /// Prefixed but not a known command
    Unknown(String),
    /// Known command with bad arguments; carries a usage hint
    Invalid(String),
}

impl BotCommand {
    /// Stable name for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            BotCommand::Create { .. } => "create",
            BotCommand::Farm { .. } => "farm",
            BotCommand::Attack { .. } => "attack",
            BotCommand::Sheet { .. } => "sheet",
            BotCommand::Help => "help",
            BotCommand::Unknown(_) => "unknown",
            BotCommand::Invalid(_) => "invalid",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = if prefix.trim().is_empty() {
            "!".to_string()
        } else {
            prefix.trim().to_string()
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse one chat line. Returns `None` when the line is not addressed to the bot.
    pub fn parse(&self, raw: &str) -> Option<BotCommand> {
        let body = raw.trim().strip_prefix(self.prefix.as_str())?;
        let body = body.trim_start();
        let (word, rest) = match body.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (body, ""),
        };
        if word.is_empty() {
            return None;
        }
        let cmd = match word.to_ascii_lowercase().as_str() {
            "create" | "addpersonnage" => self.parse_create(rest),
            "farm" => BotCommand::Farm {
                name: (!rest.is_empty()).then(|| rest.to_string()),
            },
            "attack" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(name), Some(attack)) => BotCommand::Attack {
                        name: name.to_string(),
                        attack: attack.to_string(),
                    },
                    _ => BotCommand::Invalid(format!("{}attack <name> <attack>", self.prefix)),
                }
            }
            "sheet" | "fiche" => match rest.split_whitespace().next() {
                Some(name) => BotCommand::Sheet {
                    name: name.to_string(),
                },
                None => BotCommand::Invalid(format!("{}sheet <name>", self.prefix)),
            },
            "help" | "menu" => BotCommand::Help,
            other => BotCommand::Unknown(other.to_string()),
        };
        trace!("Parsed {} from '{}'", cmd.label(), crate::logutil::escape_log(raw));
        Some(cmd)
    }

    fn parse_create(&self, rest: &str) -> BotCommand {
        let mut tokens = rest.split_whitespace();
        let Some(name) = tokens.next() else {
            return BotCommand::Invalid(format!(
                "{}create <name> attaque1=... attaque2=...",
                self.prefix
            ));
        };
        let attributes = tokens
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotCommand::Create {
            name: name.to_string(),
            attributes,
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new("!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_unprefixed_chatter() {
        let p = CommandParser::default();
        assert_eq!(p.parse("farm Arwen"), None);
        assert_eq!(p.parse("!"), None);
    }

    #[test]
    fn create_collects_key_value_pairs() {
        let p = CommandParser::default();
        let cmd = p
            .parse("!addpersonnage Arwen attaque1=Feu junk attaque2=Glace=Froide rank=B")
            .unwrap();
        assert_eq!(
            cmd,
            BotCommand::Create {
                name: "Arwen".into(),
                attributes: vec![
                    ("attaque1".into(), "Feu".into()),
                    ("attaque2".into(), "Glace=Froide".into()),
                    ("rank".into(), "B".into()),
                ],
            }
        );
    }

    #[test]
    fn farm_name_is_optional_and_takes_rest_of_line() {
        let p = CommandParser::default();
        assert_eq!(p.parse("!farm"), Some(BotCommand::Farm { name: None }));
        assert_eq!(
            p.parse("!FARM  Arwen la Grise "),
            Some(BotCommand::Farm {
                name: Some("Arwen la Grise".into())
            })
        );
    }

    #[test]
    fn attack_requires_two_arguments() {
        let p = CommandParser::default();
        assert!(matches!(p.parse("!attack Arwen"), Some(BotCommand::Invalid(_))));
        assert_eq!(
            p.parse("!attack Arwen attaque1"),
            Some(BotCommand::Attack {
                name: "Arwen".into(),
                attack: "attaque1".into()
            })
        );
    }

    #[test]
    fn aliases_and_custom_prefix() {
        let p = CommandParser::new("^");
        assert_eq!(p.parse("^menu"), Some(BotCommand::Help));
        assert_eq!(
            p.parse("^fiche Arwen"),
            Some(BotCommand::Sheet {
                name: "Arwen".into()
            })
        );
        assert_eq!(p.parse("^dance"), Some(BotCommand::Unknown("dance".into())));
        assert_eq!(p.parse("!help"), None);
    }
}
