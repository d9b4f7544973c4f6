//! Status markers and ANSI coloring.

pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[1;31m";
pub const GREEN: &str = "\x1b[1;32m";
pub const CYAN: &str = "\x1b[1;36m";

pub const OK_MARKER: &str = "OK";
pub const FAILED_MARKER: &str = "FAILED";

/// Wrap `text` in `color` when colors are enabled.
pub fn colorize(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// `OK` in green or `FAILED` in red.
pub fn status_marker(success: bool, colors: bool) -> String {
    if success {
        colorize(OK_MARKER, GREEN, colors)
    } else {
        colorize(FAILED_MARKER, RED, colors)
    }
}

/// Strip ANSI escape sequences, for comparing colored reports against plain text.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}
