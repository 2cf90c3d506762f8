// SPDX-License-Identifier: MIT
//
// The pen: what the terminal was last told.
//
// Drawing a changed cell costs a cursor move, a style change and a glyph.
// The pen remembers where the terminal's cursor sits and which style it is
// drawing with, so a run of same-styled cells on one row costs one move,
// one SGR and the bare glyphs.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi::{self, Sgr};
use crate::cell::{Cell, Style};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pen {
    /// Where the next glyph lands without an explicit move.
    cursor: Option<(u16, u16)>,
    /// `None` until something establishes a known style.
    style: Option<Style>,
}

impl Pen {
    /// A pen that knows nothing about the terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            style: None,
        }
    }

    /// Record that the terminal was just reset and homed.
    pub const fn home(&mut self) {
        self.cursor = Some((0, 0));
        self.style = Some(Style::NONE);
    }

    #[inline]
    #[must_use]
    pub const fn style(&self) -> Option<Style> {
        self.style
    }

    /// Draw `cell` at column `x`, row `y`.
    ///
    /// A continuation directly after the glyph that owns it is already on
    /// screen and costs nothing. One that isn't (its owner was unchanged
    /// and not redrawn, or was overwritten) is drawn as a styled blank.
    ///
    /// # Errors
    ///
    /// Whatever `out` returns.
    pub fn draw(&mut self, out: &mut impl Write, x: u16, y: u16, cell: Cell) -> io::Result<()> {
        let next = x.saturating_add(1);
        if cell.is_continuation() && self.cursor == Some((next, y)) {
            return Ok(());
        }
        if self.cursor != Some((x, y)) {
            ansi::cursor_to(out, x, y)?;
        }
        self.set_style(out, cell.style)?;

        let ch = cell.character().unwrap_or(' ');
        let mut utf8 = [0; 4];
        out.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
        let width = u16::try_from(ch.width().unwrap_or(1).max(1)).unwrap_or(1);
        self.cursor = Some((x.saturating_add(width), y));
        Ok(())
    }

    fn set_style(&mut self, out: &mut impl Write, style: Style) -> io::Result<()> {
        let sgr = match self.style {
            Some(current) => Sgr::transition(current, style),
            None => Sgr::full(style),
        };
        sgr.write_to(out)?;
        self.style = Some(style);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use crate::color::CellColor;
    use pretty_assertions::assert_eq;

    fn draw_all(pen: &mut Pen, cells: &[(u16, u16, Cell)]) -> String {
        let mut out = Vec::new();
        for &(x, y, cell) in cells {
            pen.draw(&mut out, x, y, cell).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    fn homed() -> Pen {
        let mut pen = Pen::new();
        pen.home();
        pen
    }

    fn plain(ch: char) -> Cell {
        Cell::new(ch, Style::NONE)
    }

    #[test]
    fn unknown_pen_moves_and_resets_first() {
        let out = draw_all(&mut Pen::new(), &[(5, 3, plain('A'))]);
        assert_eq!(out, "\x1b[4;6H\x1b[0mA");
    }

    #[test]
    fn a_row_run_is_one_move() {
        let out = draw_all(&mut homed(), &[(0, 0, plain('a')), (1, 0, plain('b')), (2, 0, plain('c'))]);
        assert_eq!(out, "abc");
    }

    #[test]
    fn gaps_and_new_rows_move() {
        let out = draw_all(&mut homed(), &[(0, 0, plain('a')), (4, 0, plain('b')), (0, 1, plain('c'))]);
        assert_eq!(out, "a\x1b[1;5Hb\x1b[2;1Hc");
    }

    #[test]
    fn style_is_sent_only_on_change() {
        let red = Style::NONE.fg(CellColor::RED);
        let bold = red.with(Attr::BOLD);
        let out = draw_all(
            &mut homed(),
            &[(0, 0, Cell::new('a', red)), (1, 0, Cell::new('b', red)), (2, 0, Cell::new('c', bold))],
        );
        assert_eq!(out, "\x1b[31mab\x1b[1mc");
    }

    #[test]
    fn wide_glyph_covers_its_tail() {
        let out = draw_all(
            &mut homed(),
            &[(3, 0, plain('中')), (4, 0, Cell::continuation(Style::NONE)), (5, 0, plain('x'))],
        );
        assert_eq!(out, "\x1b[1;4H中x");
    }

    #[test]
    fn lone_tail_is_a_blank() {
        let blue = Style::NONE.bg(CellColor::BLUE);
        let out = draw_all(&mut homed(), &[(4, 0, Cell::continuation(blue))]);
        assert_eq!(out, "\x1b[1;5H\x1b[44m ");
    }

    #[test]
    fn home_assumes_default_style() {
        let mut pen = homed();
        assert_eq!(pen.style(), Some(Style::NONE));
        assert_eq!(draw_all(&mut pen, &[(0, 0, plain('a'))]), "a");
    }
}
