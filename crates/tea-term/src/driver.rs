// SPDX-License-Identifier: MIT
//
// The seam between the engine and whatever displays its output.
//
// A Driver knows two things: how big the display is, and how to accept a
// chunk of bytes. Everything else (mouse reporting, the alternate buffer,
// cursor visibility) is an escape sequence, so those are provided methods
// built on `write` and the `ansi` encoders.
//
// `Terminal` is the real stdout/termios implementation. `MemoryDriver`
// records bytes in memory for tests and headless rendering.

use std::io;

use crate::ansi::{self, DecMode, MouseMode};
use crate::geometry::Size;

/// An output sink with a size.
pub trait Driver {
    /// Current display size in cells.
    fn size(&self) -> Size;

    /// Write `bytes` in full.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Clear the display and home the cursor.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn clear(&mut self) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::clear_screen(&mut out)?;
        ansi::cursor_to(&mut out, 0, 0)?;
        self.write(&out)
    }

    /// Start mouse reports at `mode`'s granularity, plus focus reports.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn enable_mouse(&mut self, mode: MouseMode) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::enable_mouse(&mut out, mode)?;
        ansi::set_mode(&mut out, DecMode::FocusReports)?;
        self.write(&out)
    }

    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn disable_mouse(&mut self) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::reset_mode(&mut out, DecMode::FocusReports)?;
        ansi::disable_mouse(&mut out)?;
        self.write(&out)
    }

    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn show_cursor(&mut self) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::set_mode(&mut out, DecMode::CursorVisible)?;
        self.write(&out)
    }

    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn hide_cursor(&mut self) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::reset_mode(&mut out, DecMode::CursorVisible)?;
        self.write(&out)
    }

    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn enter_alternate_buffer(&mut self) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::set_mode(&mut out, DecMode::AltScreen)?;
        self.write(&out)
    }

    /// Leave the alternate buffer with a clean pen.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn exit_alternate_buffer(&mut self) -> io::Result<()> {
        let mut out = Vec::new();
        ansi::reset(&mut out)?;
        ansi::reset_mode(&mut out, DecMode::AltScreen)?;
        self.write(&out)
    }
}

// ─── MemoryDriver ────────────────────────────────────────────────────────────

/// A driver that records everything written to it.
///
/// ```
/// use tea_term::driver::{Driver, MemoryDriver};
/// use tea_term::geometry::Size;
///
/// let mut driver = MemoryDriver::new(Size::new(80, 24));
/// driver.hide_cursor().unwrap();
/// assert_eq!(driver.take_output(), b"\x1b[?25l");
/// assert!(driver.output().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryDriver {
    size: Size,
    output: Vec<u8>,
    writes: usize,
    failing: bool,
}

impl MemoryDriver {
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            output: Vec::new(),
            writes: 0,
            failing: false,
        }
    }

    /// Change the reported size, as a terminal resize would.
    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Everything written since the last [`take_output`](Self::take_output).
    #[inline]
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// The recorded output, lossily decoded.
    #[must_use]
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Drain the recorded output.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Number of successful `write` calls so far.
    #[inline]
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Make every following write fail with `BrokenPipe` until turned off.
    pub const fn fail_writes(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Driver for MemoryDriver {
    fn size(&self) -> Size {
        self.size
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.failing {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "driver closed"));
        }
        self.output.extend_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}
