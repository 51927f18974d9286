mod common;

use std::sync::Arc;

use chrono::Duration;
use farmbot::bot::{CommandHandler, CommandParser};
use farmbot::game::dice::Roll;
use farmbot::game::store::MemoryStore;
use farmbot::metrics;

fn handler(rolls: Vec<Roll>) -> (CommandHandler, farmbot::game::clock::ManualClock) {
    let (engine, clock) = common::scripted_engine(Arc::new(MemoryStore::new()), rolls);
    (
        CommandHandler::new(Arc::new(engine), CommandParser::new("!")).with_bot_name("Taverne"),
        clock,
    )
}

#[tokio::test]
async fn full_session_through_chat_commands() {
    let (h, clock) = handler(vec![
        Roll::Index(0),
        Roll::Value(8),
        Roll::Hit(true),
        Roll::Value(4),
        Roll::Hit(false),
        Roll::Value(7),
        Roll::Hit(false),
        Roll::Hit(true),
        Roll::Index(0),
    ]);

    let created = h
        .handle("42", "!addpersonnage Arwen attaque1=Boule_de_feu rank=E")
        .await
        .unwrap();
    assert!(!created.is_error());
    assert_eq!(created.field_value("Attacks"), Some("attaque1: Boule_de_feu"));

    let farm = h.handle("42", "!farm arwen").await.unwrap();
    assert_eq!(farm.color, Some(0x2ecc71));
    assert_eq!(farm.field_value("Expeditions left"), Some("2/3"));
    assert!(farm.render().contains("Gobelin"));

    let hit = h.handle("42", "!attack Arwen attaque1").await.unwrap();
    assert!(hit.render().contains("Critical"));
    assert_eq!(
        hit.field_value("Gobelin"),
        Some(format!("{}{} 4/20", "🟩".repeat(2), "⬛".repeat(8)).as_str())
    );

    let early = h.handle("42", "!attack Arwen attaque1").await.unwrap();
    assert_eq!(early.code, Some("rate_limited"));
    assert!(early.render().contains("10s"));

    clock.advance(Duration::seconds(10));
    let win = h.handle("42", "!attack Arwen attaque1").await.unwrap();
    let spoils = win.field_value("Spoils").unwrap();
    assert!(spoils.contains("+7 XP"));
    assert!(spoils.contains("✨ Épée légendaire"));
    assert_eq!(win.field_value("XP"), Some("7/20"));

    let sheet = h.handle("42", "!fiche Arwen").await.unwrap();
    assert_eq!(sheet.field_value("Rank"), Some("E"));
    assert_eq!(sheet.field_value("Inventory"), Some("Épée légendaire"));
    assert_eq!(sheet.field_value("Expeditions left"), Some("2/3"));
}

#[tokio::test]
async fn other_players_cannot_drive_my_character() {
    let (h, _clock) = handler(vec![]);
    h.handle("1", "!create Arwen attaque1=Feu").await.unwrap();
    let r = h.handle("2", "!farm Arwen").await.unwrap();
    assert_eq!(r.code, Some("not_found"));
    let r = h.handle("2", "!sheet Arwen").await.unwrap();
    assert_eq!(r.code, Some("not_found"));
}

#[tokio::test]
async fn farm_denial_reports_reset_time_and_counts() {
    let (h, _clock) = handler(vec![]);
    h.handle("1", "!create Arwen").await.unwrap();
    for _ in 0..3 {
        assert!(!h.handle("1", "!farm Arwen").await.unwrap().is_error());
    }
    let before = metrics::snapshot().farm_denials;
    let denied = h.handle("1", "!farm Arwen").await.unwrap();
    assert_eq!(denied.code, Some("rate_limited"));
    assert!(denied.render().contains("3h 00m"));
    assert!(metrics::snapshot().farm_denials > before);
}

#[tokio::test]
async fn help_and_usage_replies() {
    let (h, _clock) = handler(vec![]);
    let help = h.handle("1", "!menu").await.unwrap();
    assert_eq!(help.title.as_deref(), Some("📜 Taverne menu"));
    assert!(help.render().contains("!attack <name> <attack>"));

    let usage = h.handle("1", "!attack Arwen").await.unwrap();
    assert_eq!(usage.code, Some("usage"));

    let bad = h.handle("1", "!create two\u{7}bell").await.unwrap();
    assert_eq!(bad.code, Some("invalid_name"));
}
