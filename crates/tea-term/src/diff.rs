// SPDX-License-Identifier: MIT
//
// Frame differencing.
//
// `diff` encodes what it takes to turn the terminal from `baseline` (the
// last grid that reached it) into `current`. Unchanged rows are skipped
// with one slice comparison; inside a changed row only differing cells are
// drawn.
//
// Without a baseline, or when the size changed, the frame starts with a
// reset and a clear, and cells that are plain blanks are left to the clear.
// With a baseline and nothing changed the output is empty: no sync
// markers, no reset, zero bytes.

use std::io::{self, Write};

use crate::ansi::{self, DecMode};
use crate::buffer::Grid;
use crate::cell::Style;
use crate::output::Pen;

/// What one flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    /// Cells that were sent to the terminal.
    pub cells_rendered: usize,
    /// Cells the terminal already showed.
    pub cells_skipped: usize,
    /// Bytes handed to the driver.
    pub bytes_written: usize,
}

impl FlushStats {
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

/// Append to `out` the bytes that bring the terminal from `baseline` to
/// `current`. `bytes_written` counts what was appended.
///
/// # Errors
///
/// Whatever `out` returns.
pub fn diff(baseline: Option<&Grid>, current: &Grid, out: &mut impl Write) -> io::Result<FlushStats> {
    let mut stats = FlushStats::default();
    if current.width() == 0 || current.height() == 0 {
        return Ok(stats);
    }
    let baseline = baseline.filter(|b| (b.width(), b.height()) == (current.width(), current.height()));

    let mut body = Vec::new();
    let mut pen = Pen::new();
    if baseline.is_none() {
        ansi::reset(&mut body)?;
        ansi::clear_screen(&mut body)?;
        ansi::cursor_to(&mut body, 0, 0)?;
        pen.home();
    }

    for y in 0..current.height() {
        let Some(row) = current.row(y) else { continue };
        let before = baseline.and_then(|b| b.row(y));
        if before == Some(row) {
            stats.cells_skipped += row.len();
            continue;
        }
        for (x, cell) in (0u16..).zip(row) {
            let shown = match before {
                Some(before) => before.get(usize::from(x)) == Some(cell),
                None => cell.is_empty(),
            };
            if shown {
                stats.cells_skipped += 1;
            } else {
                pen.draw(&mut body, x, y, *cell)?;
                stats.cells_rendered += 1;
            }
        }
    }

    if body.is_empty() {
        return Ok(stats);
    }
    // Hand the terminal back with a clean pen.
    if pen.style().is_some_and(|style| style != Style::NONE) {
        ansi::reset(&mut body)?;
    }

    let mut frame = Vec::with_capacity(body.len() + 16);
    ansi::set_mode(&mut frame, DecMode::SyncOutput)?;
    frame.extend_from_slice(&body);
    ansi::reset_mode(&mut frame, DecMode::SyncOutput)?;
    out.write_all(&frame)?;
    stats.bytes_written = frame.len();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell};
    use crate::color::CellColor;
    use pretty_assertions::assert_eq;

    /// Diff `current` against `baseline`, returning the stats and output.
    fn run(baseline: Option<&Grid>, current: &Grid) -> (FlushStats, String) {
        let mut out = Vec::new();
        let stats = diff(baseline, current, &mut out).unwrap();
        assert_eq!(stats.bytes_written, out.len());
        (stats, String::from_utf8(out).unwrap())
    }

    #[test]
    fn first_frame_clears_and_skips_blanks() {
        let mut grid = Grid::new(10, 5);
        grid.set(2, 1, Cell::new('x', Style::NONE));
        let (stats, out) = run(None, &grid);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 49);
        assert_eq!(out, "\x1b[?2026h\x1b[0m\x1b[2J\x1b[1;1H\x1b[2;3Hx\x1b[?2026l");
    }

    #[test]
    fn blank_first_frame_still_clears() {
        let (stats, out) = run(None, &Grid::new(4, 2));
        assert_eq!(stats.cells_rendered, 0);
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn unchanged_grid_emits_zero_bytes() {
        let grid = Grid::new(10, 5);
        let (stats, out) = run(Some(&grid), &grid);
        assert_eq!(stats.cells_skipped, 50);
        assert_eq!(stats.bytes_written, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn single_change_is_one_move_and_glyph() {
        let before = Grid::new(10, 5);
        let mut after = before.clone();
        after.set(7, 4, Cell::new('Z', Style::NONE));
        let (stats, out) = run(Some(&before), &after);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.total_cells(), 50);
        assert_eq!(out, "\x1b[?2026h\x1b[5;8H\x1b[0mZ\x1b[?2026l");
    }

    #[test]
    fn styled_change_resets_afterwards() {
        let before = Grid::new(4, 1);
        let mut after = before.clone();
        let style = Style::NONE
            .fg(CellColor::Rgb(255, 0, 0))
            .attrs(Attr::BOLD | Attr::ITALIC);
        after.set(0, 0, Cell::new('E', style));
        let (_, out) = run(Some(&before), &after);
        assert!(out.contains("\x1b[0;1;3;38;2;255;0;0mE"));
        assert!(out.ends_with("\x1b[0m\x1b[?2026l"));
    }

    #[test]
    fn size_change_is_a_first_frame() {
        let before = Grid::new(4, 2);
        let mut after = Grid::new(5, 2);
        after.set(4, 1, Cell::blank(Style::NONE.bg(CellColor::BLUE)));
        let (stats, out) = run(Some(&before), &after);
        assert_eq!(stats.cells_rendered, 1);
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn reverting_a_cell_is_a_change() {
        let blank = Grid::new(4, 1);
        let mut marked = blank.clone();
        marked.set(0, 0, Cell::new('!', Style::NONE));
        assert_eq!(run(Some(&marked), &blank).0.cells_rendered, 1);
    }

    #[test]
    fn zero_size_grid_emits_nothing() {
        let (stats, out) = run(None, &Grid::new(0, 0));
        assert_eq!(stats, FlushStats::default());
        assert!(out.is_empty());
    }
}
