// SPDX-License-Identifier: MIT
//
// Buffer: the grid a frame is drawn into, and the grid the terminal shows.
//
// A render pass writes into `grid`; `flush` diffs it against `baseline`
// and sends the difference to a Driver. The baseline only ever holds a
// grid the driver accepted, so a failed write is retried in full by the
// next flush.
//
// Writes take signed points and are clipped silently. A wide glyph takes
// its column and a tail column. Writing over either half of a wide pair
// blanks the other half; a wide glyph with no room for its tail becomes a
// blank.

use std::io;

use tracing::trace;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::cell::{Cell, Style};
use crate::diff::{self, FlushStats};
use crate::driver::Driver;
use crate::geometry::{Point, Rect, Size};

// ─── Grid ────────────────────────────────────────────────────────────────────

/// Row-major cells.
///
/// ```
/// use tea_term::buffer::Grid;
/// use tea_term::cell::{Cell, Style};
///
/// let mut grid = Grid::new(80, 24);
/// grid.set(5, 3, Cell::new('X', Style::NONE));
/// assert_eq!(grid.get(5, 3).and_then(|c| c.character()), Some('X'));
/// assert_eq!(grid.get(80, 0), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.cells.get(self.index(x, y)?)
    }

    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        let start = self.index(0, y)?;
        self.cells.get(start..start + usize::from(self.width))
    }

    /// Overwrite one cell as is. Returns whether `(x, y)` is in the grid.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        match self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Blank whatever wide pair `(x, y)` is half of.
    fn split_pair_at(&mut self, x: u16, y: u16) {
        let Some(here) = self.index(x, y) else { return };
        if self.cells[here].is_continuation() && x > 0 {
            self.cells[here - 1].blank_out();
        }
        if x + 1 < self.width && self.cells[here + 1].is_continuation() {
            self.cells[here + 1] = Cell::blank(self.cells[here + 1].style);
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid({}x{})", self.width, self.height)
    }
}

// ─── Buffer ──────────────────────────────────────────────────────────────────

pub struct Buffer {
    grid: Grid,
    /// What the terminal shows. `None` forces a full repaint.
    baseline: Option<Grid>,
    out: Vec<u8>,
}

impl Buffer {
    /// A blank buffer; the first flush repaints everything.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            grid: Grid::new(dim(size.width), dim(size.height)),
            baseline: None,
            out: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(i32::from(self.grid.width), i32::from(self.grid.height))
    }

    /// The frame as drawn so far.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Reallocate at `size` when it differs. Content is lost and the next
    /// flush repaints everything.
    pub fn resize(&mut self, size: Size) {
        if size != self.size() {
            self.grid = Grid::new(dim(size.width), dim(size.height));
            self.baseline = None;
        }
    }

    /// Start a frame at `size`: resize, or blank the grid.
    pub fn prepare(&mut self, size: Size) {
        if size == self.size() {
            self.grid.clear();
        } else {
            self.resize(size);
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, at: Point) -> Option<&Cell> {
        let (x, y) = coords(at)?;
        self.grid.get(x, y)
    }

    /// Put one glyph at `at`. Returns whether a cell changed hands:
    /// `false` for points off the grid and zero-width characters.
    pub fn write(&mut self, ch: char, at: Point, style: Style) -> bool {
        let Some((x, y)) = coords(at).filter(|&(x, y)| x < self.grid.width && y < self.grid.height)
        else {
            return false;
        };
        match ch.width().unwrap_or(0) {
            0 => return false,
            1 => {
                self.grid.split_pair_at(x, y);
                self.grid.set(x, y, Cell::new(ch, style));
            }
            _ if x + 1 == self.grid.width => {
                self.grid.split_pair_at(x, y);
                self.grid.set(x, y, Cell::blank(style));
            }
            _ => {
                self.grid.split_pair_at(x, y);
                self.grid.split_pair_at(x + 1, y);
                self.grid.set(x, y, Cell::new(ch, style));
                self.grid.set(x + 1, y, Cell::continuation(style));
            }
        }
        true
    }

    /// Paint `rect` with blanks in `style`.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        for point in rect.intersection(Rect::from_size(self.size())).points() {
            if let Some((x, y)) = coords(point) {
                self.grid.split_pair_at(x, y);
                self.grid.set(x, y, Cell::blank(style));
            }
        }
    }

    /// Send what changed since the last successful flush. No change, no
    /// bytes: the driver isn't even called.
    ///
    /// # Errors
    ///
    /// The driver's write error. The baseline stays where it was.
    pub fn flush<D: Driver + ?Sized>(&mut self, driver: &mut D) -> io::Result<FlushStats> {
        self.out.clear();
        let stats = diff::diff(self.baseline.as_ref(), &self.grid, &mut self.out)?;
        if !self.out.is_empty() {
            driver.write(&self.out)?;
        }
        match &mut self.baseline {
            Some(baseline) if baseline.width == self.grid.width && baseline.height == self.grid.height => {
                baseline.cells.copy_from_slice(&self.grid.cells);
            }
            _ => self.baseline = Some(self.grid.clone()),
        }
        trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            "flush"
        );
        Ok(stats)
    }

    /// Forget what the terminal shows.
    pub fn force_redraw(&mut self) {
        self.baseline = None;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.size())
            .field("synced", &self.baseline.is_some())
            .finish()
    }
}

fn dim(v: i32) -> u16 {
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}

fn coords(at: Point) -> Option<(u16, u16)> {
    Some((u16::try_from(at.x).ok()?, u16::try_from(at.y).ok()?))
}

// ─── Text Width ──────────────────────────────────────────────────────────────

/// Columns a character occupies: 0 for control and combining characters,
/// 2 for wide ones (CJK, most emoji), 1 otherwise.
///
/// ```
/// use tea_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Columns a string occupies.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.width()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
