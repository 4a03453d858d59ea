//! Terminal styling and color detection.

/// ANSI escape codes used by the text renderers.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    /// Bright bold white for vehicle ids.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    pub const GRAY: &str = "\x1b[90m";
    /// Available vehicles and completed trips.
    pub const GREEN: &str = "\x1b[32m";
    /// Reserved vehicles and conflicts.
    pub const RED: &str = "\x1b[31m";
}

/// Resolved color codes, either ANSI sequences or empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub green: &'static str,
    pub red: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            green: colors::GREEN,
            red: colors::RED,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            green: "",
            red: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, else `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI colors should be used.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_palette_is_empty() {
        let plain = ColorPalette::plain();
        assert!(plain.reset.is_empty());
        assert!(plain.green.is_empty());
    }

    #[test]
    fn test_colored_palette_uses_ansi() {
        let colored = ColorPalette::colored();
        assert_eq!(colored.reset, colors::RESET);
        assert!(colored.red.starts_with("\x1b["));
    }
}
