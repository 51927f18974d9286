//! Chat-facing layer: command parsing, dispatch into the game engine and reply
//! rendering. Transports ([`console`], or any chat adapter) feed
//! raw lines to [`CommandHandler::handle`] and print the returned [`Reply`].
pub mod console;
pub mod dispatch;
pub mod parser;
pub mod reply;

pub use dispatch::CommandHandler;
pub use parser::{BotCommand, CommandParser};
pub use reply::Reply;
