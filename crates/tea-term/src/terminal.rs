// SPDX-License-Identifier: MIT
//
// Terminal: the process's stdout as a Driver.
//
// Mode switches (alternate buffer, mouse, cursor) are the Screen's call and
// go through the provided Driver methods. This type owns what the Screen
// can't express as bytes: raw mode. `RawMode` is a guard holding the saved
// termios; dropping it puts the line discipline back.
//
// Dropping an entered Terminal, or panicking while one is entered, writes
// the restore sequence so the user's shell comes back intact. The panic
// path writes straight to fd 1; stdout's lock may be held by the frame
// that panicked.
#![allow(unsafe_code)]

use std::io::{self, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use tracing::debug;

use crate::ansi::{self, DecMode};
use crate::driver::Driver;
use crate::geometry::Size;

/// Size used when stdout isn't a terminal.
pub const FALLBACK_SIZE: Size = Size::new(80, 24);

/// Switch off every mode the engine may have switched on, ending on the
/// primary screen with a default pen and a visible cursor.
///
/// # Errors
///
/// Whatever `w` returns.
pub fn write_restore(w: &mut impl Write) -> io::Result<()> {
    ansi::reset_mode(w, DecMode::SyncOutput)?;
    ansi::reset_mode(w, DecMode::FocusReports)?;
    ansi::disable_mouse(w)?;
    ansi::reset(w)?;
    ansi::set_mode(w, DecMode::CursorVisible)?;
    ansi::reset_mode(w, DecMode::AltScreen)
}

/// Columns and rows of the terminal on stdout, if there is one.
#[cfg(unix)]
#[must_use]
pub fn query_size() -> Option<Size> {
    // SAFETY: TIOCGWINSZ fills a winsize; zeroed is a valid initial value.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: `ws` outlives the call.
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } == 0;
    (ok && ws.ws_col > 0 && ws.ws_row > 0)
        .then(|| Size::new(i32::from(ws.ws_col), i32::from(ws.ws_row)))
}

#[cfg(not(unix))]
#[must_use]
pub fn query_size() -> Option<Size> {
    None
}

// ─── Raw Mode ────────────────────────────────────────────────────────────────

/// termios as it was before raw mode, for the panic hook.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Holds stdin in raw mode until dropped.
#[cfg(unix)]
struct RawMode {
    saved: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// `None` when stdin isn't a terminal (pipes, CI).
    fn enter() -> io::Result<Option<Self>> {
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(libc::STDIN_FILENO) } == 0 {
            return Ok(None);
        }
        // SAFETY: termios is plain data; tcgetattr overwrites it.
        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: `saved` outlives the call.
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let mut termios = saved;
        // SAFETY: `termios` is a valid termios.
        unsafe { libc::cfmakeraw(&raw mut termios) };
        // SAFETY: `termios` outlives the call.
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = Some(saved);
        }
        Ok(Some(Self { saved }))
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        // SAFETY: `saved` came from tcgetattr.
        unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const self.saved) };
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = None;
        }
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    #[allow(clippy::unnecessary_wraps)]
    const fn enter() -> io::Result<Option<Self>> {
        Ok(None)
    }
}

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

#[cfg(unix)]
fn restore_after_panic() {
    let mut bytes = Vec::new();
    if write_restore(&mut bytes).is_ok() {
        // SAFETY: writes `bytes.len()` bytes from a live buffer to fd 1.
        unsafe { libc::write(libc::STDOUT_FILENO, bytes.as_ptr().cast(), bytes.len()) };
    }
    let saved = SAVED_TERMIOS.lock().ok().and_then(|slot| *slot);
    if let Some(saved) = saved {
        // SAFETY: `saved` came from tcgetattr.
        unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const saved) };
    }
}

#[cfg(not(unix))]
fn restore_after_panic() {
    let _ = write_restore(&mut io::stdout());
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// stdout as a [`Driver`].
///
/// ```no_run
/// use tea_term::driver::Driver;
/// use tea_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// term.enter_alternate_buffer()?;
/// // ... frames ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    raw: Option<RawMode>,
    entered: bool,
}

impl Terminal {
    /// A handle that hasn't touched the terminal yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: None,
            entered: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_entered(&self) -> bool {
        self.entered
    }

    /// Switch to raw mode and arm the panic hook. Does nothing if already
    /// entered.
    ///
    /// # Errors
    ///
    /// termios failures.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enter()?;
        self.entered = true;
        debug!(raw = self.raw.is_some(), "terminal entered");
        Ok(())
    }

    /// Write the restore sequence and drop raw mode. Does nothing if not
    /// entered.
    ///
    /// # Errors
    ///
    /// The write to stdout.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        self.entered = false;
        let mut bytes = Vec::new();
        write_restore(&mut bytes)?;
        let written = self.write(&bytes);
        self.raw = None;
        debug!("terminal left");
        written
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for Terminal {
    fn size(&self) -> Size {
        query_size().unwrap_or(FALLBACK_SIZE)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(bytes)?;
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
