// SPDX-License-Identifier: MIT
//
// Escape sequence encoding.
//
// Everything the engine says to a terminal is one of three shapes:
//
//   CSI row;col H        cursor placement (CUP), 0-based in our API
//   CSI ? n h / l        a DEC private mode switched on or off
//   CSI p;p;...;p m      SGR, one sequence per style change
//
// Encoders write into any `impl Write` and make no decisions; the pen in
// `output` decides what is worth sending.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::cell::{Attr, Style};
use crate::color::CellColor;

// ─── Cursor And Screen ───────────────────────────────────────────────────────

/// Place the cursor at column `x`, row `y`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Erase the whole display (ED 2). The cursor stays put.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// SGR 0: default colors, no attributes.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── DEC Private Modes ───────────────────────────────────────────────────────

/// The private modes the engine toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecMode {
    CursorVisible,
    /// Button press/release reports.
    MouseClick,
    /// Motion reports while a button is held.
    MouseDrag,
    /// Every motion report.
    MouseMotion,
    /// Focus in/out reports.
    FocusReports,
    /// SGR encoding for mouse reports.
    SgrMouse,
    AltScreen,
    /// Hold output until the mode is reset (DEC 2026).
    SyncOutput,
}

impl DecMode {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::CursorVisible => 25,
            Self::MouseClick => 1000,
            Self::MouseDrag => 1002,
            Self::MouseMotion => 1003,
            Self::FocusReports => 1004,
            Self::SgrMouse => 1006,
            Self::AltScreen => 1049,
            Self::SyncOutput => 2026,
        }
    }
}

#[inline]
pub fn set_mode(w: &mut impl Write, mode: DecMode) -> io::Result<()> {
    write!(w, "\x1b[?{}h", mode.code())
}

#[inline]
pub fn reset_mode(w: &mut impl Write, mode: DecMode) -> io::Result<()> {
    write!(w, "\x1b[?{}l", mode.code())
}

/// How much pointer activity the terminal reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    /// Presses and releases.
    Click,
    /// Also motion with a button held.
    Drag,
    /// All motion. Hover needs this.
    #[default]
    Motion,
}

impl MouseMode {
    /// Modes to set, in order. SGR encoding always comes last.
    #[must_use]
    pub const fn modes(self) -> &'static [DecMode] {
        match self {
            Self::Click => &[DecMode::MouseClick, DecMode::SgrMouse],
            Self::Drag => &[DecMode::MouseClick, DecMode::MouseDrag, DecMode::SgrMouse],
            Self::Motion => &[
                DecMode::MouseClick,
                DecMode::MouseDrag,
                DecMode::MouseMotion,
                DecMode::SgrMouse,
            ],
        }
    }
}

/// Mouse reporting on, at `mode`'s granularity.
pub fn enable_mouse(w: &mut impl Write, mode: MouseMode) -> io::Result<()> {
    mode.modes().iter().try_for_each(|&m| set_mode(w, m))
}

/// Every mouse mode off, whichever were on.
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    MouseMode::Motion
        .modes()
        .iter()
        .rev()
        .try_for_each(|&m| reset_mode(w, m))
}

// ─── SGR ─────────────────────────────────────────────────────────────────────

/// Parameters of one SGR sequence, collected before anything is written.
///
/// ```
/// use tea_term::ansi::Sgr;
/// use tea_term::cell::{Attr, Style};
/// use tea_term::color::CellColor;
///
/// let sgr = Sgr::transition(Style::NONE, Style::NONE.fg(CellColor::RED).attrs(Attr::BOLD));
/// assert_eq!(sgr.to_string(), "\x1b[1;31m");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sgr {
    params: String,
}

#[derive(Clone, Copy)]
enum Layer {
    Fg,
    Bg,
}

impl Sgr {
    /// The shortest sequence taking a terminal drawing with `from` to
    /// drawing with `to`. Dropping an attribute resets (SGR 0) and rebuilds
    /// the whole style from defaults.
    #[must_use]
    pub fn transition(from: Style, to: Style) -> Self {
        let mut sgr = Self::default();
        let from = if from.attrs.difference(to.attrs).is_empty() {
            from
        } else {
            sgr.push(0);
            Style::NONE
        };
        for code in to.attrs.difference(from.attrs).sgr_codes() {
            sgr.push(code);
        }
        if to.fg != from.fg {
            sgr.color(Layer::Fg, to.fg);
        }
        if to.bg != from.bg {
            sgr.color(Layer::Bg, to.bg);
        }
        sgr
    }

    /// Everything needed to draw with `style` from an unknown state.
    #[must_use]
    pub fn full(style: Style) -> Self {
        let mut sgr = Self::transition(Style::NONE, style);
        let head = if sgr.is_empty() { "0" } else { "0;" };
        sgr.params.insert_str(0, head);
        sgr
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Nothing is written for an empty sequence.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        write!(w, "\x1b[{}m", self.params)
    }

    fn push(&mut self, code: impl std::fmt::Display) {
        if !self.params.is_empty() {
            self.params.push(';');
        }
        let _ = write!(self.params, "{code}");
    }

    fn color(&mut self, layer: Layer, color: CellColor) {
        // Named colors use the short 30-37/90-97 (40-47/100-107) forms.
        let (default, base, bright, extended) = match layer {
            Layer::Fg => (39, 30, 90, 38),
            Layer::Bg => (49, 40, 100, 48),
        };
        match color {
            CellColor::Default => self.push(default),
            CellColor::Ansi256(n @ 0..=7) => self.push(base + u16::from(n)),
            CellColor::Ansi256(n @ 8..=15) => self.push(bright + u16::from(n - 8)),
            CellColor::Ansi256(n) => self.push(format_args!("{extended};5;{n}")),
            CellColor::Rgb(r, g, b) => self.push(format_args!("{extended};2;{r};{g};{b}")),
        }
    }
}

impl std::fmt::Display for Sgr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "\x1b[{}m", self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn step(from: Style, to: Style) -> String {
        Sgr::transition(from, to).to_string()
    }

    // ── Cursor ─────────────────────────────────────────────────────────

    #[test]
    fn cursor_is_one_based_on_the_wire() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, 0)), "\x1b[1;65536H");
    }

    // ── Modes ──────────────────────────────────────────────────────────

    #[test]
    fn modes_toggle() {
        assert_eq!(emit(|w| set_mode(w, DecMode::AltScreen)), "\x1b[?1049h");
        assert_eq!(emit(|w| reset_mode(w, DecMode::CursorVisible)), "\x1b[?25l");
        assert_eq!(emit(|w| set_mode(w, DecMode::SyncOutput)), "\x1b[?2026h");
    }

    #[test]
    fn mouse_granularity() {
        assert_eq!(
            emit(|w| enable_mouse(w, MouseMode::Click)),
            "\x1b[?1000h\x1b[?1006h"
        );
        assert_eq!(
            emit(|w| enable_mouse(w, MouseMode::Motion)),
            "\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1006h"
        );
        assert_eq!(
            emit(|w| disable_mouse(w)),
            "\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l"
        );
    }

    // ── SGR ────────────────────────────────────────────────────────────

    #[test]
    fn same_style_needs_nothing() {
        let style = Style::NONE.fg(CellColor::RED).attrs(Attr::BOLD);
        assert!(Sgr::transition(style, style).is_empty());
        assert_eq!(emit(|w| Sgr::transition(style, style).write_to(w)), "");
    }

    #[test]
    fn color_encodings() {
        let fg = |c| step(Style::NONE.fg(CellColor::BLUE), Style::NONE.fg(c));
        assert_eq!(fg(CellColor::Default), "\x1b[39m");
        assert_eq!(fg(CellColor::RED), "\x1b[31m");
        assert_eq!(fg(CellColor::BRIGHT_RED), "\x1b[91m");
        assert_eq!(fg(CellColor::Ansi256(196)), "\x1b[38;5;196m");
        assert_eq!(fg(CellColor::Rgb(1, 2, 3)), "\x1b[38;2;1;2;3m");

        let bg = |c| step(Style::NONE, Style::NONE.bg(c));
        assert_eq!(bg(CellColor::GREEN), "\x1b[42m");
        assert_eq!(bg(CellColor::BRIGHT_WHITE), "\x1b[107m");
        assert_eq!(bg(CellColor::Ansi256(236)), "\x1b[48;5;236m");
    }

    #[test]
    fn adding_attributes_is_incremental() {
        let bold = Style::NONE.attrs(Attr::BOLD).fg(CellColor::RED);
        assert_eq!(step(bold, bold.with(Attr::ITALIC)), "\x1b[3m");
    }

    #[test]
    fn dropping_an_attribute_resets_and_rebuilds() {
        let from = Style::NONE.fg(CellColor::RED).attrs(Attr::BOLD | Attr::ITALIC);
        let to = from.attrs(Attr::ITALIC);
        assert_eq!(step(from, to), "\x1b[0;3;31m");
    }

    #[test]
    fn full_starts_from_a_reset() {
        assert_eq!(Sgr::full(Style::NONE).to_string(), "\x1b[0m");
        let style = Style::NONE.bg(CellColor::Rgb(0, 0, 255)).attrs(Attr::UNDERLINE);
        assert_eq!(Sgr::full(style).to_string(), "\x1b[0;4;48;2;0;0;255m");
    }
}
