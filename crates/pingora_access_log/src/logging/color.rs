//! ANSI colors for access lines and the process-wide color switch.

use std::sync::atomic::{AtomicU8, Ordering};

pub const GREEN: &str = "\x1b[97;42m";
pub const WHITE: &str = "\x1b[90;47m";
pub const YELLOW: &str = "\x1b[90;43m";
pub const RED: &str = "\x1b[97;41m";
pub const BLUE: &str = "\x1b[97;44m";
pub const MAGENTA: &str = "\x1b[97;45m";
pub const CYAN: &str = "\x1b[97;46m";
pub const RESET: &str = "\x1b[0m";

/// Whether access lines carry ANSI color escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color only when the sink was detected as a terminal.
    #[default]
    Auto,
    Disabled,
    Forced,
}

impl ColorMode {
    pub fn emits_color(self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Forced => true,
            ColorMode::Disabled => false,
            ColorMode::Auto => is_terminal,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            ColorMode::Auto => 0,
            ColorMode::Disabled => 1,
            ColorMode::Forced => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ColorMode::Disabled,
            2 => ColorMode::Forced,
            _ => ColorMode::Auto,
        }
    }
}

static GLOBAL_COLOR_MODE: AtomicU8 = AtomicU8::new(ColorMode::Auto.as_u8());

/// Mode used by access logs that were not given an explicit one.
pub fn global_color_mode() -> ColorMode {
    ColorMode::from_u8(GLOBAL_COLOR_MODE.load(Ordering::Relaxed))
}

pub fn set_global_color_mode(mode: ColorMode) {
    GLOBAL_COLOR_MODE.store(mode.as_u8(), Ordering::Relaxed);
}

/// Never emit colors from access logs without an explicit mode.
pub fn disable_color() {
    set_global_color_mode(ColorMode::Disabled);
}

/// Always emit colors from access logs without an explicit mode, terminal or not.
pub fn force_color() {
    set_global_color_mode(ColorMode::Forced);
}

pub fn reset_color_mode() {
    set_global_color_mode(ColorMode::Auto);
}

pub fn status_code_color(code: u16) -> &'static str {
    match code {
        200..=299 => GREEN,
        300..=399 => WHITE,
        400..=499 => YELLOW,
        _ => RED,
    }
}

/// Unknown methods get the reset sequence, i.e. no color.
pub fn method_color(method: &str) -> &'static str {
    match method {
        "GET" => BLUE,
        "POST" => CYAN,
        "PUT" => YELLOW,
        "DELETE" => RED,
        "PATCH" => GREEN,
        "HEAD" => MAGENTA,
        "OPTIONS" => WHITE,
        _ => RESET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_buckets() {
        assert_eq!(status_code_color(200), GREEN);
        assert_eq!(status_code_color(299), GREEN);
        assert_eq!(status_code_color(301), WHITE);
        assert_eq!(status_code_color(404), YELLOW);
        assert_eq!(status_code_color(500), RED);
        assert_eq!(status_code_color(2), RED);
        assert_eq!(status_code_color(199), RED);
    }

    #[test]
    fn method_table() {
        assert_eq!(method_color("GET"), BLUE);
        assert_eq!(method_color("POST"), CYAN);
        assert_eq!(method_color("PUT"), YELLOW);
        assert_eq!(method_color("DELETE"), RED);
        assert_eq!(method_color("PATCH"), GREEN);
        assert_eq!(method_color("HEAD"), MAGENTA);
        assert_eq!(method_color("OPTIONS"), WHITE);
        assert_eq!(method_color("TRACE"), RESET);
        assert_eq!(method_color("get"), RESET);
    }

    #[test]
    fn reset_is_the_sgr0_sequence() {
        assert_eq!(RESET.as_bytes(), &[27, 91, 48, 109]);
    }

    #[test]
    fn mode_against_terminal_detection() {
        assert!(ColorMode::Auto.emits_color(true));
        assert!(!ColorMode::Auto.emits_color(false));
        assert!(ColorMode::Forced.emits_color(true));
        assert!(ColorMode::Forced.emits_color(false));
        assert!(!ColorMode::Disabled.emits_color(true));
        assert!(!ColorMode::Disabled.emits_color(false));
    }

    #[test]
    fn mode_survives_the_atomic_encoding() {
        for mode in [ColorMode::Auto, ColorMode::Disabled, ColorMode::Forced] {
            assert_eq!(ColorMode::from_u8(mode.as_u8()), mode);
        }
    }
}
