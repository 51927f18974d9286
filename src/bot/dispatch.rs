//! Command dispatch: parse a chat line, run it through the [`Engine`] and turn the
//! result (or the error) into a [`Reply`].
use std::sync::Arc;

use log::{debug, warn};

use crate::bot::parser::{BotCommand, CommandParser};
use crate::bot::reply::{hp_bar, Reply, HP_BAR_CELLS};
use crate::game::combat::Rarity;
use crate::game::engine::{AttackReport, CreationReport, FarmReport, SheetView, MAX_NAME_CHARS};
use crate::game::errors::{GameError, Gate};
use crate::game::rules::{xp_to_next_level, FARM_LIMIT};
use crate::game::types::Monster;
use crate::game::Engine;
use crate::logutil::escape_log;
use crate::metrics;

const SHEET_COLOR: u32 = 0x3498db;
const HELP_COLOR: u32 = 0xf1c40f;
const CREATE_COLOR: u32 = 0x9b59b6;
const VICTORY_COLOR: u32 = 0xf39c12;

pub struct CommandHandler {
    engine: Arc<Engine>,
    parser: CommandParser,
    bot_name: String,
}

impl CommandHandler {
    pub fn new(engine: Arc<Engine>, parser: CommandParser) -> Self {
        Self {
            engine,
            parser,
            bot_name: "FarmBot".to_string(),
        }
    }

    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = name.into();
        self
    }

    /// Handle one chat line from `user_id`. `None` means the line was not a command.
    pub async fn handle(&self, user_id: &str, raw: &str) -> Option<Reply> {
        let cmd = self.parser.parse(raw)?;
        metrics::record_command(cmd.label());
        debug!("{} from {}: {}", cmd.label(), user_id, escape_log(raw));
        let result = match cmd {
            BotCommand::Create { name, attributes } => self
                .engine
                .create_character(user_id, &name, &attributes)
                .await
                .map(|r| self.render_created(&r)),
            BotCommand::Farm { name: None } => self
                .engine
                .list_owned(user_id)
                .await
                .map(|names| self.render_owned(&names)),
            BotCommand::Farm { name: Some(name) } => self
                .engine
                .farm(user_id, &name)
                .await
                .map(|r| render_farm(&r)),
            BotCommand::Attack { name, attack } => self
                .engine
                .attack(user_id, &name, &attack)
                .await
                .map(|r| render_attack(&r)),
            BotCommand::Sheet { name } => self
                .engine
                .sheet(user_id, &name)
                .await
                .map(|v| render_sheet(&v)),
            BotCommand::Help => Ok(self.render_help()),
            BotCommand::Unknown(word) => Ok(Reply::error(
                "unknown_command",
                format!(
                    "❓ Unknown command `{}`. Try {}help.",
                    word,
                    self.parser.prefix()
                ),
            )),
            BotCommand::Invalid(usage) => Ok(Reply::error("usage", format!("Usage: {}", usage))),
        };
        Some(result.unwrap_or_else(|e| self.render_error(&e)))
    }

    fn render_error(&self, err: &GameError) -> Reply {
        metrics::record_failure();
        let p = self.parser.prefix();
        let text = match err {
            GameError::NotFound(name) => {
                format!("❌ You have no character named `{}`.", name)
            }
            GameError::AlreadyExists(name) => {
                format!("❌ A character named `{}` already exists.", name)
            }
            GameError::InvalidName(_) => format!(
                "❌ Character names must be a single word of at most {} characters.",
                MAX_NAME_CHARS
            ),
            GameError::RateLimited { gate, retry_in } => {
                metrics::record_denial(*gate);
                match gate {
                    Gate::Farm => format!(
                        "⏳ No expeditions left ({}/{}). Next reset in {}.",
                        FARM_LIMIT,
                        FARM_LIMIT,
                        format_wait(*retry_in)
                    ),
                    Gate::Attack => format!("⏳ Catch your breath! Attack again in {}s.", retry_in),
                }
            }
            GameError::NoActiveEncounter(name) => format!(
                "❌ {} is not fighting anything. Start with {}farm {}.",
                name, p, name
            ),
            GameError::UnknownAttack { character, attack } => {
                format!("❌ {} does not know the attack `{}`.", character, attack)
            }
            GameError::Persistence(e) => {
                warn!("command failed on persistence: {}", e);
                "⚠️ Character sheets are unavailable right now, try again later.".to_string()
            }
        };
        Reply::error(err.code(), text)
    }

    fn render_created(&self, report: &CreationReport) -> Reply {
        let c = &report.character;
        let attacks = if c.attacks.is_empty() {
            "None".to_string()
        } else {
            c.attacks
                .iter()
                .map(|(id, label)| format!("{}: {}", id, label))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let mut reply = Reply::embed(format!("✅ {} joins the adventure", report.name), CREATE_COLOR)
            .description(format!(
                "Rank {} · Level {}. Farm with {}farm {}",
                c.rank,
                c.level,
                self.parser.prefix(),
                report.name
            ))
            .field("Attacks", attacks, false);
        if !report.ignored.is_empty() {
            reply = reply.field("Ignored", report.ignored.join(", "), false);
        }
        reply
    }

    fn render_owned(&self, names: &[String]) -> Reply {
        let p = self.parser.prefix();
        if names.is_empty() {
            return Reply::text(format!(
                "You have no characters yet. Create one with {}create <name> attaque1=...",
                p
            ));
        }
        let list = names
            .iter()
            .map(|n| format!("• {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        Reply::embed("⚔️ Your characters", SHEET_COLOR)
            .description(format!("Pick one: {}farm <name>", p))
            .field("Characters", list, false)
    }

    fn render_help(&self) -> Reply {
        let p = self.parser.prefix();
        Reply::embed(format!("📜 {} menu", self.bot_name), HELP_COLOR)
            .field(
                format!("{}create <name> attaque1=... [rank=...]", p),
                "Create a character",
                false,
            )
            .field(
                format!("{}farm [name]", p),
                format!("Start an expedition ({} per 3h)", FARM_LIMIT),
                false,
            )
            .field(format!("{}attack <name> <attack>", p), "Hit the current monster", false)
            .field(format!("{}sheet <name>", p), "Show a character sheet", false)
            .field(format!("{}help", p), "This menu", false)
    }
}

fn monster_gauge(monster: &Monster) -> String {
    format!(
        "{} {}/{}",
        hp_bar(monster.hp, monster.max_hp, HP_BAR_CELLS),
        monster.hp,
        monster.max_hp
    )
}

fn render_farm(report: &FarmReport) -> Reply {
    let m = &report.monster;
    let mut reply = Reply::embed(format!("🌲 {} goes farming", report.name), m.color)
        .description(format!("A wild **{}** appears!", m.name))
        .field("HP", monster_gauge(m), false)
        .field("Weakness", m.weakness.clone(), true)
        .field(
            "Expeditions left",
            format!("{}/{}", report.budget.remaining(), report.budget.limit),
            true,
        );
    if let Some(prev) = &report.replaced {
        reply = reply.field("Fled", format!("The {} ({} hp) ran away.", prev.name, prev.hp), false);
    }
    reply
}

fn render_attack(report: &AttackReport) -> Reply {
    let o = &report.outcome;
    let crit = if o.critical { " 💥 Critical!" } else { "" };
    let description = format!("{} deals **{}** damage.{}", o.attack_label, o.damage, crit);
    let Some(victory) = &o.victory else {
        return Reply::embed(format!("⚔️ {} attacks", report.name), o.monster.color)
            .description(description)
            .field(o.monster.name.clone(), monster_gauge(&o.monster), false);
    };
    metrics::record_victory(victory.levels_reached.len());
    let mut spoils = vec![format!("+{} XP", victory.experience_gained)];
    for drop in &victory.loot {
        let icon = match drop.rarity {
            Rarity::Common => "🎁",
            Rarity::Rare => "✨",
        };
        spoils.push(format!("{} {}", icon, drop.item));
    }
    let mut reply = Reply::embed(format!("🏆 {} defeats the {}", report.name, o.monster.name), VICTORY_COLOR)
        .description(description)
        .field("Spoils", spoils.join("\n"), false);
    for level in &victory.levels_reached {
        reply = reply.field("🎉 Level up", format!("Level {}", level), true);
    }
    reply.field(
        "XP",
        format!("{}/{}", report.experience, xp_to_next_level(report.level)),
        true,
    )
}

fn render_sheet(view: &SheetView) -> Reply {
    let c = &view.character;
    let attacks = if c.attacks.is_empty() {
        "None".to_string()
    } else {
        c.attacks.values().cloned().collect::<Vec<_>>().join("\n")
    };
    let inventory = if c.inventory.is_empty() {
        "Empty".to_string()
    } else {
        c.inventory.join(", ")
    };
    let mut reply = Reply::embed(format!("🧙 {}", view.name), SHEET_COLOR)
        .field("Rank", c.rank.clone(), true)
        .field("Level", c.level.to_string(), true)
        .field(
            "XP",
            format!("{}/{}", c.experience, xp_to_next_level(c.level)),
            true,
        )
        .field("Next level", format!("{} XP to go", c.xp_remaining()), true)
        .field("Attacks", attacks, false)
        .field("Inventory", inventory, false)
        .field(
            "Expeditions left",
            format!("{}/{}", view.farm_uses_left, FARM_LIMIT),
            true,
        );
    if let Some(rank) = &c.pending_rank {
        reply = reply.field("Pending rank", rank.clone(), true);
    }
    if let Some(m) = &c.current_monster {
        reply = reply.field(format!("Fighting {}", m.name), monster_gauge(m), false);
    }
    reply
}

/// "2h 05m", "12m", "40s".
fn format_wait(seconds: i64) -> String {
    let s = seconds.max(0);
    let (h, m) = (s / 3600, (s % 3600) / 60);
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m", m)
    } else {
        format!("{}s", s)
    }
}
