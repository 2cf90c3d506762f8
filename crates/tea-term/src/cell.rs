// SPDX-License-Identifier: MIT
//
// Styled cells.
//
// A Cell is one column of one row: a glyph and the Style it's drawn with.
// Views never build cells themselves; they hand a char and a Style to the
// Viewport and the Buffer decides what lands in the grid.
//
// Wide glyphs span two columns. The left cell carries the glyph, the right
// one is a "tail": no glyph of its own, same style, so a background painted
// under a wide glyph stays unbroken and the diff sees both columns change
// together.

use crate::color::CellColor;

bitflags::bitflags! {
    /// SGR text attributes.
    ///
    /// ```
    /// use tea_term::cell::Attr;
    ///
    /// let strong = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(strong.contains(Attr::UNDERLINE));
    /// assert_eq!(strong.sgr_codes().collect::<Vec<_>>(), [1, 4]);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        /// Swap foreground and background.
        const INVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

impl Attr {
    const SGR: [(Self, u8); 8] = [
        (Self::BOLD, 1),
        (Self::DIM, 2),
        (Self::ITALIC, 3),
        (Self::UNDERLINE, 4),
        (Self::BLINK, 5),
        (Self::INVERSE, 7),
        (Self::HIDDEN, 8),
        (Self::STRIKETHROUGH, 9),
    ];

    /// The SGR parameter of every set flag, in ascending order.
    pub fn sgr_codes(self) -> impl Iterator<Item = u8> {
        Self::SGR
            .into_iter()
            .filter(move |&(flag, _)| self.contains(flag))
            .map(|(_, code)| code)
    }
}

/// Colors plus attributes.
///
/// ```
/// use tea_term::cell::{Attr, Style};
/// use tea_term::color::CellColor;
///
/// let warn = Style::NONE.fg(CellColor::YELLOW).attrs(Attr::BOLD);
/// assert_ne!(warn, Style::NONE);
/// assert_eq!(warn.with(Attr::ITALIC).attrs, Attr::BOLD | Attr::ITALIC);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const NONE: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    /// Replace the attribute set.
    #[inline]
    #[must_use]
    pub const fn attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Add to the attribute set.
    #[inline]
    #[must_use]
    pub const fn with(self, attrs: Attr) -> Self {
        Self {
            attrs: self.attrs.union(attrs),
            ..self
        }
    }
}

/// One grid column.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    glyph: Glyph,
    pub style: Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Char(char),
    /// Right half of the wide glyph to the left.
    Tail,
}

impl Cell {
    /// A blank cell with default styling.
    pub const EMPTY: Self = Self::blank(Style::NONE);

    #[inline]
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self {
            glyph: Glyph::Char(ch),
            style,
        }
    }

    /// A space painted with `style`.
    #[inline]
    #[must_use]
    pub const fn blank(style: Style) -> Self {
        Self::new(' ', style)
    }

    /// The right half of a wide glyph.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            glyph: Glyph::Tail,
            style,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        matches!(self.glyph, Glyph::Tail)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// The glyph; `None` for a continuation.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        match self.glyph {
            Glyph::Char(ch) => Some(ch),
            Glyph::Tail => None,
        }
    }

    /// Turn a wide glyph that lost its tail back into a plain blank,
    /// keeping the style.
    #[inline]
    pub(crate) const fn blank_out(&mut self) {
        self.glyph = Glyph::Char(' ');
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut t = f.debug_tuple("Cell");
        match self.glyph {
            Glyph::Char(ch) => t.field(&ch),
            Glyph::Tail => t.field(&"tail"),
        };
        if self.style != Style::NONE {
            t.field(&self.style);
        }
        t.finish()
    }
}
