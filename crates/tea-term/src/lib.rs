// SPDX-License-Identifier: MIT
//
// tea-term: the output layer of teaui.
//
// Everything between "a view wants this glyph here" and "these bytes went
// to the terminal": signed cell geometry, styled cells, a grid that frames
// are drawn into, a differ that sends only what changed, and the Driver
// trait the bytes leave through.
//
// No TUI framework underneath. Escape sequences are encoded by hand in
// `ansi`, the pen is tracked in `output`, and raw mode is plain termios in
// `terminal`. Input decoding lives elsewhere; this crate only writes.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod driver;
pub mod geometry;
pub mod output;
pub mod terminal;

pub use buffer::Buffer;
pub use cell::{Attr, Cell, Style};
pub use color::CellColor;
pub use diff::FlushStats;
pub use driver::{Driver, MemoryDriver};
pub use geometry::{Point, Rect, Size};
