// SPDX-License-Identifier: MIT
//
// Cell colors.
//
// The buffer stores exactly what the terminal will be told: a palette index,
// a 24-bit RGB triple, or "whatever the terminal's default is". No alpha,
// no color-space math. Anything richer (blending, contrast, palettes built
// in perceptual spaces) happens before a color reaches a cell.

use std::fmt;

/// Compact color for terminal cell storage.
///
/// Small and cheap to compare, which matters for the diff hot loop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// ANSI 256-color palette index. 0–15 are the classic named colors.
    Ansi256(u8),

    /// Terminal default color (respects the user's terminal theme).
    #[default]
    Default,
}

impl CellColor {
    pub const BLACK: Self = Self::Ansi256(0);
    pub const RED: Self = Self::Ansi256(1);
    pub const GREEN: Self = Self::Ansi256(2);
    pub const YELLOW: Self = Self::Ansi256(3);
    pub const BLUE: Self = Self::Ansi256(4);
    pub const MAGENTA: Self = Self::Ansi256(5);
    pub const CYAN: Self = Self::Ansi256(6);
    pub const WHITE: Self = Self::Ansi256(7);
    pub const GRAY: Self = Self::Ansi256(8);
    pub const BRIGHT_RED: Self = Self::Ansi256(9);
    pub const BRIGHT_GREEN: Self = Self::Ansi256(10);
    pub const BRIGHT_YELLOW: Self = Self::Ansi256(11);
    pub const BRIGHT_BLUE: Self = Self::Ansi256(12);
    pub const BRIGHT_MAGENTA: Self = Self::Ansi256(13);
    pub const BRIGHT_CYAN: Self = Self::Ansi256(14);
    pub const BRIGHT_WHITE: Self = Self::Ansi256(15);

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse `#rrggbb` (or `rrggbb`) into an RGB color.
    ///
    /// ```
    /// use tea_term::color::CellColor;
    ///
    /// assert_eq!(CellColor::from_hex("#17a2b8"), Some(CellColor::Rgb(0x17, 0xa2, 0xb8)));
    /// assert_eq!(CellColor::from_hex("nope"), None);
    /// ```
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_terminal_default() {
        assert!(CellColor::default().is_default());
        assert!(!CellColor::RED.is_default());
    }

    #[test]
    fn hex_with_and_without_hash() {
        assert_eq!(CellColor::from_hex("#ff0080"), Some(CellColor::Rgb(255, 0, 128)));
        assert_eq!(CellColor::from_hex("ff0080"), Some(CellColor::Rgb(255, 0, 128)));
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert_eq!(CellColor::from_hex("#fff"), None);
        assert_eq!(CellColor::from_hex("#gg0000"), None);
        assert_eq!(CellColor::from_hex("#ééé"), None);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", CellColor::Rgb(1, 2, 255)), "#0102ff");
        assert_eq!(format!("{:?}", CellColor::Ansi256(42)), "ansi(42)");
        assert_eq!(CellColor::Default.to_string(), "default");
    }
}
