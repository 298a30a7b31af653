//! Terminal display utilities for CLI output formatting.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| Terminal {
        width: terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH),
        is_tty: io::stdout().is_terminal(),
    })
}

/// Get the current terminal width in characters (default width when piped).
pub fn terminal_width() -> usize {
    let info = terminal_info();
    if info.is_tty {
        info.width
    } else {
        DEFAULT_WIDTH
    }
}

/// Truncate text to fit within the specified display width.
///
/// Wide characters count double; an ellipsis is appended when anything was
/// cut.
///
/// ```
/// use paper_feed::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let total_width: usize = text.chars().map(char_width).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        let w = char_width(c);
        if current_width + w > budget {
            break;
        }
        current_width += w;
        truncated.push(c);
    }

    format!("{}...", truncated.trim_end())
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Render an upstream ISO-8601 timestamp as a short date.
///
/// Unparseable input is returned unchanged.
pub fn format_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
