//! ANSI 256-color escape directives and color-aware text measurement.
//!
//! All layout math in [`crate::tile`] measures *visible* columns: a
//! recognized color escape (ESC `[`, digits and `;`, terminated by `m`)
//! occupies zero columns, every other character occupies one.

use std::sync::OnceLock;

use regex::Regex;

/// Bold style
pub const BOLD: &str = "\u{1b}[1m";

// Foreground color codes (256-color palette)
pub const RED: &str = "\u{1b}[38;5;9m";
pub const COPPER: &str = "\u{1b}[38;5;173m";
pub const YELLOW: &str = "\u{1b}[38;5;227m";
pub const GREEN: &str = "\u{1b}[38;5;36m";
pub const BLUE: &str = "\u{1b}[38;5;33m";
pub const PURPLE: &str = "\u{1b}[38;5;105m";
pub const GREY: &str = "\u{1b}[38;5;247m";
pub const DKGREY: &str = "\u{1b}[38;5;242m";
pub const WHITE: &str = "\u{1b}[38;5;255m";
pub const BLACK: &str = "\u{1b}[38;5;232m";

// Background color codes
pub const BG_WHITE: &str = "\u{1b}[48;5;255m";

/// Reset all attributes
pub const RESET: &str = "\u{1b}[0m";

/// Matches one color escape: ESC `[`, any digits/semicolons, `m`.
fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("static pattern is valid"))
}

/// Removes every recognized color escape from `line`.
pub fn strip_colors(line: &str) -> String {
    color_pattern().replace_all(line, "").into_owned()
}

/// The number of visible columns in `line`: color escapes are zero-width,
/// everything else is one column per character.
pub fn visible_len(line: &str) -> usize {
    strip_colors(line).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_colors_removes_foreground_codes() {
        let line = format!("{RED}error{RESET}");
        assert_eq!(strip_colors(&line), "error");
    }

    #[test]
    fn strip_colors_removes_background_and_bold() {
        let line = format!("{BOLD}{BG_WHITE}x{RESET}");
        assert_eq!(strip_colors(&line), "x");
    }

    #[test]
    fn strip_colors_leaves_plain_text_alone() {
        assert_eq!(strip_colors("plain text"), "plain text");
    }

    #[test]
    fn visible_len_ignores_escapes() {
        let line = format!("{GREEN}abc{RESET}def");
        assert_eq!(visible_len(&line), 6);
    }

    #[test]
    fn visible_len_is_invariant_under_colorization() {
        // visible_len(colorize(s)) == visible_len(s)
        let plain = "12 views";
        let colored = format!("{DKGREY}12 {YELLOW}views{RESET}");
        assert_eq!(visible_len(&colored), visible_len(plain));
    }

    #[test]
    fn visible_len_empty() {
        assert_eq!(visible_len(""), 0);
        assert_eq!(visible_len(RESET), 0);
    }
}
