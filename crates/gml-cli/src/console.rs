//! Terminal console utilities

use std::env;
use std::io::{self, IsTerminal};

/// Console output handler with color support
pub struct Console {
    color_enabled: bool,
}

impl Console {
    /// Create a console, enabling colors only for a terminal without `NO_COLOR`
    pub fn new() -> Self {
        Self {
            color_enabled: io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Create a console with colors disabled
    pub fn no_colors() -> Self {
        Self {
            color_enabled: false,
        }
    }

    /// Colorize text with the specified color
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            Color::Red => format!("\x1b[31m{text}\x1b[0m"),
            Color::Yellow => format!("\x1b[33m{text}\x1b[0m"),
            Color::Green => format!("\x1b[32m{text}\x1b[0m"),
            Color::Cyan => format!("\x1b[36m{text}\x1b[0m"),
            Color::Dim => format!("\x1b[2m{text}\x1b[0m"),
            Color::Bold => format!("\x1b[1m{text}\x1b[0m"),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// ANSI colors used by the formatter's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Cyan,
    Dim,
    Bold,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_colors() {
        let console = Console::no_colors();
        assert_eq!(console.colorize("test", Color::Red), "test");
    }

    #[test]
    fn test_colorize_when_enabled() {
        let console = Console {
            color_enabled: true,
        };
        assert_eq!(console.colorize("ok", Color::Green), "\x1b[32mok\x1b[0m");
    }
}
