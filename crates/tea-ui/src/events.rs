// SPDX-License-Identifier: MIT
//
// Input events: what the driver side delivers, and what views receive.
//
// Two layers of mouse event. A `SystemMouseEvent` is raw pointer input at
// an absolute position. The MouseManager turns it into `MouseEvent`s
// addressed to specific views, with synthesized enter/exit/click and a
// position local to the receiving view's registered region.
//
// Keys carry a code plus modifiers and render to the conventional short
// form (`C-x`, `M-left`, `S-tab`), which is also what `FromStr` parses.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use tea_term::geometry::Point;

use crate::error::Error;

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F24.
    F(u8),
}

const NAMED_KEYS: [(KeyCode, &str); 15] = [
    (KeyCode::Enter, "enter"),
    (KeyCode::Tab, "tab"),
    (KeyCode::Backspace, "backspace"),
    (KeyCode::Escape, "escape"),
    (KeyCode::Delete, "delete"),
    (KeyCode::Insert, "insert"),
    (KeyCode::Up, "up"),
    (KeyCode::Down, "down"),
    (KeyCode::Left, "left"),
    (KeyCode::Right, "right"),
    (KeyCode::Home, "home"),
    (KeyCode::End, "end"),
    (KeyCode::PageUp, "pageup"),
    (KeyCode::PageDown, "pagedown"),
    (KeyCode::Char(' '), "space"),
];

impl KeyCode {
    /// Short name: the character itself, or a lowercase key name.
    #[must_use]
    pub fn name(self) -> String {
        if let Some((_, name)) = NAMED_KEYS.iter().find(|(code, _)| *code == self) {
            return (*name).to_string();
        }
        match self {
            Self::Char(ch) => ch.to_string(),
            Self::F(n) => format!("f{n}"),
            _ => String::new(),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        if let Some((code, _)) = NAMED_KEYS.iter().find(|(_, n)| *n == name) {
            return Some(*code);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(Self::Char(ch)),
            (Some('f'), Some(_)) => name[1..]
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=24).contains(n))
                .map(Self::F),
            _ => None,
        }
    }
}

bitflags! {
    /// Modifier keys. `ALT` is what terminals report as "meta".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A key press.
///
/// ```
/// use tea_ui::events::{KeyCode, KeyEvent, Modifiers};
///
/// let key: KeyEvent = "C-M-x".parse().unwrap();
/// assert_eq!(key.code, KeyCode::Char('x'));
/// assert_eq!(key.modifiers, Modifiers::CTRL | Modifiers::ALT);
/// assert_eq!(key.to_string(), "C-M-x");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// An unmodified key.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// An unmodified character.
    #[inline]
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }

    /// Ctrl plus a character.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// Alt (meta) plus a key.
    #[inline]
    #[must_use]
    pub const fn alt(code: KeyCode) -> Self {
        Self::new(code, Modifiers::ALT)
    }

    /// The key name without modifiers (`x`, `left`, `f5`).
    #[must_use]
    pub fn name(&self) -> String {
        self.code.name()
    }

    /// Modifiers and name in short form (`C-x`, `M-left`, `S-tab`).
    #[must_use]
    pub fn full(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("M-")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            f.write_str("S-")?;
        }
        f.write_str(&self.code.name())
    }
}

impl FromStr for KeyEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s;
        let mut modifiers = Modifiers::empty();
        // A trailing "-" is the minus key, not a separator.
        while rest.len() > 2 {
            let flag = match &rest[..2] {
                "C-" => Modifiers::CTRL,
                "M-" => Modifiers::ALT,
                "S-" => Modifiers::SHIFT,
                _ => break,
            };
            modifiers |= flag;
            rest = &rest[2..];
        }
        KeyCode::from_name(rest)
            .map(|code| Self::new(code, modifiers))
            .ok_or_else(|| Error::InvalidKey(s.to_string()))
    }
}

/// A key binding that fires for its view regardless of focus.
///
/// Character keys ignore `SHIFT` when matching; the character already says
/// whether it was shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotKey {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl HotKey {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    #[must_use]
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if self.code != key.code {
            return false;
        }
        let mask = if matches!(self.code, KeyCode::Char(_)) {
            Modifiers::CTRL | Modifiers::ALT
        } else {
            Modifiers::all()
        };
        self.modifiers & mask == key.modifiers & mask
    }
}

impl From<KeyEvent> for HotKey {
    fn from(key: KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

impl FromStr for HotKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<KeyEvent>().map(Self::from)
    }
}

// ─── Mouse ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Raw pointer action as the driver reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMouseKind {
    Down(MouseButton),
    Up(MouseButton),
    /// Motion with no button held.
    Move,
    /// Motion with a button held.
    Drag(MouseButton),
    WheelUp,
    WheelDown,
}

/// Raw pointer input at an absolute screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemMouseEvent {
    pub kind: SystemMouseKind,
    pub position: Point,
}

impl SystemMouseEvent {
    #[inline]
    #[must_use]
    pub const fn new(kind: SystemMouseKind, position: Point) -> Self {
        Self { kind, position }
    }
}

bitflags! {
    /// Categories a view can subscribe to when registering a mouse region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct MouseEvents: u8 {
        const BUTTON_LEFT   = 1 << 0;
        const BUTTON_MIDDLE = 1 << 1;
        const BUTTON_RIGHT  = 1 << 2;
        /// Pointer motion, including enter/exit.
        const MOVE          = 1 << 3;
        const WHEEL         = 1 << 4;

        const BUTTON = Self::BUTTON_LEFT.bits()
            | Self::BUTTON_MIDDLE.bits()
            | Self::BUTTON_RIGHT.bits();
    }
}

impl MouseEvents {
    /// The category a button's presses and releases belong to.
    #[must_use]
    pub const fn for_button(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::BUTTON_LEFT,
            MouseButton::Middle => Self::BUTTON_MIDDLE,
            MouseButton::Right => Self::BUTTON_RIGHT,
        }
    }
}

/// What happened, from the receiving view's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventName {
    /// The pointer moved onto the view.
    Enter,
    /// The pointer left the view.
    Exit,
    Move,
    /// Motion while this view holds the press.
    Drag,
    Down,
    Up,
    /// Down and up both landed on this view.
    Click,
    WheelUp,
    WheelDown,
}

/// A mouse event addressed to one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub name: MouseEventName,
    pub button: Option<MouseButton>,
    /// Absolute screen position.
    pub position: Point,
    /// Position relative to the origin of the view's registered region.
    pub local: Point,
}

impl MouseEvent {
    #[inline]
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        matches!(self.name, MouseEventName::Down | MouseEventName::Drag)
    }

    #[inline]
    #[must_use]
    pub const fn is_released(&self) -> bool {
        matches!(self.name, MouseEventName::Up | MouseEventName::Click)
    }

    #[inline]
    #[must_use]
    pub const fn is_clicked(&self) -> bool {
        matches!(self.name, MouseEventName::Click)
    }

    #[inline]
    #[must_use]
    pub const fn is_enter(&self) -> bool {
        matches!(self.name, MouseEventName::Enter)
    }

    #[inline]
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        matches!(self.name, MouseEventName::Exit)
    }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// Everything the driver side can deliver to a Screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The terminal changed size; the Screen re-reads the driver's size.
    Resize,
    /// The terminal window gained focus.
    Focus,
    /// The terminal window lost focus.
    Blur,
    Key(KeyEvent),
    Mouse(SystemMouseEvent),
}
