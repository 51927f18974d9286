//! Log hygiene for user-supplied text (character names, raw command lines).
//!
//! Chat input can carry newlines or control characters that would split or corrupt a
//! log line. Everything user-controlled goes through [`escape_log`] first.

/// Longest preview kept in a log line, in characters.
pub const MAX_LOG_CHARS: usize = 160;

/// Escape control characters and backslashes, and cap the length with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_LOG_CHARS) + 4);
    for (i, ch) in s.chars().enumerate() {
        if i == MAX_LOG_CHARS {
            out.push('…');
            break;
        }
        if ch.is_control() || ch == '\\' {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    out
}
