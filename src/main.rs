//! Binary entrypoint for the FarmBot CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the data directory
//! - `start [--seed <n>]` - serve commands from stdin, one `<user_id> <command line>` per line
//! - `status` - print character and encounter counts from the document
//!
//! See the library crate docs for module-level details: `farmbot::`.
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use farmbot::bot::{console, CommandHandler, CommandParser};
use farmbot::config::Config;
use farmbot::game::dice::seeded_roller;
use farmbot::game::store::{CharacterStore, JsonFileStore};
use farmbot::game::Engine;
use farmbot::metrics;

#[derive(Parser)]
#[command(name = "farmbot")]
#[command(about = "A chat-command micro-RPG: farm monsters, fight, level up")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve commands from stdin
    Start {
        /// Seed the dice for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write a default configuration file
    Init,
    /// Show character statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new FarmBot configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let cfg = Config::default();
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            let store = JsonFileStore::new(&cfg.storage.data_dir, &cfg.storage.document_file);
            store.load()?;
            info!("Character document ready at {}", store.path().display());
        }
        Commands::Start { seed } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting FarmBot v{}", env!("CARGO_PKG_VERSION"));

            let store = Arc::new(JsonFileStore::new(
                &config.storage.data_dir,
                &config.storage.document_file,
            ));
            let mut engine = Engine::new(store);
            if let Some(seed) = seed {
                info!("Dice seeded with {}", seed);
                engine = engine.with_roller(seeded_roller(seed));
            }
            info!("Using character document {}", engine.store().describe());
            let engine = Arc::new(engine);
            let handler = CommandHandler::new(engine, CommandParser::new(config.bot.prefix()))
                .with_bot_name(config.bot.name.clone());

            println!(
                "{} ready. Type `<user_id> {}help` (Ctrl-D to quit).",
                config.bot.name,
                config.bot.prefix()
            );
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console::run(Arc::new(handler), stdin, tokio::io::stdout()).await?;

            let m = metrics::snapshot();
            let mut commands: Vec<_> = m.commands.into_iter().collect();
            commands.sort();
            info!(
                "session totals: commands {:?}, victories {}, level-ups {}, denials farm={} attack={}, failed {}",
                commands, m.victories, m.level_ups, m.farm_denials, m.attack_denials, m.failed_commands
            );
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let store = Arc::new(JsonFileStore::new(
                &config.storage.data_dir,
                &config.storage.document_file,
            ));
            let path = store.path().to_path_buf();
            let document = Engine::new(store).snapshot().await?;
            let in_encounter = document.iter().filter(|(_, c)| c.in_encounter()).count();
            let top = document.iter().max_by_key(|(_, c)| (c.level, c.experience));
            println!("{} status", config.bot.name);
            println!("  document:     {}", path.display());
            println!("  characters:   {}", document.len());
            println!("  players:      {}", document.owner_count());
            println!("  in encounter: {}", in_encounter);
            let unreadable = document.unreadable_names();
            if !unreadable.is_empty() {
                println!("  unreadable:   {}", unreadable.join(", "));
            }
            if let Some((name, c)) = top {
                println!("  top level:    {} (level {}, {} xp)", name, c.level, c.experience);
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Foreground sessions also get the log on the console
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
