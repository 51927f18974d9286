//! Line-oriented console transport.
//!
//! Each input line is `<user_id> <command line>`, e.g. `42 !farm Arwen`. Replies are
//! rendered to text and written back, followed by a blank line. Empty lines and lines
//! starting with `#` are skipped so scripted sessions can carry comments.
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::bot::dispatch::CommandHandler;

/// Split a console line into the invoking user and the chat text.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (user, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some((user, rest))
}

/// Serve commands from `input` until EOF. Returns the number of replies written.
pub async fn run<R, W>(handler: Arc<CommandHandler>, input: R, mut output: W) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut replies = 0u64;
    while let Some(line) = lines.next_line().await? {
        let Some((user, text)) = split_line(&line) else {
            debug!("console: skipped line");
            continue;
        };
        if let Some(reply) = handler.handle(user, text).await {
            output.write_all(reply.render().as_bytes()).await?;
            output.write_all(b"\n\n").await?;
            output.flush().await?;
            replies += 1;
        }
    }
    info!("console input closed after {} replies", replies);
    Ok(replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::parser::CommandParser;
    use crate::game::store::MemoryStore;
    use crate::game::Engine;

    #[test]
    fn splits_user_and_text() {
        assert_eq!(split_line("42 !farm Arwen"), Some(("42", "!farm Arwen")));
        assert_eq!(split_line("  7\t!help "), Some(("7", "!help")));
        assert_eq!(split_line("# comment"), None);
        assert_eq!(split_line("42"), None);
        assert_eq!(split_line(""), None);
    }

    #[tokio::test]
    async fn scripted_session() {
        let engine = Engine::new(Arc::new(MemoryStore::new()));
        let handler = Arc::new(CommandHandler::new(Arc::new(engine), CommandParser::default()));
        let script = b"# setup\n1 !create Arwen attaque1=Feu\n1 hello\n1 !sheet Arwen\n" as &[u8];
        let mut out = Vec::new();
        let count = run(handler, script, &mut out).await.unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Arwen joins the adventure"));
        assert!(text.contains("Level: 1"));
        assert!(text.contains("Next level: 20 XP to go"));
    }
}
