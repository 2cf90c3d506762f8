// SPDX-License-Identifier: MIT
//
// Per-view palettes.
//
// A view may carry a Theme; one that doesn't inherits its parent's, up to
// `Theme::default()` at the root. Interactive views pick a style by state
// (pressed, hovered, focused) instead of hard-coding colors.

use tea_term::cell::{Attr, Style};
use tea_term::color::CellColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    /// Body text.
    pub text: Style,
    pub text_hover: Style,
    pub text_pressed: Style,
    /// Controls (buttons, checkboxes).
    pub ui: Style,
    pub ui_hover: Style,
    pub ui_pressed: Style,
    /// A control holding keyboard focus.
    pub ui_focused: Style,
}

impl Theme {
    /// Text style for an interaction state. Pressed wins over hover.
    #[must_use]
    pub const fn text(&self, pressed: bool, hover: bool) -> Style {
        if pressed {
            self.text_pressed
        } else if hover {
            self.text_hover
        } else {
            self.text
        }
    }

    /// Control style for an interaction state. Pressed wins over hover.
    #[must_use]
    pub const fn ui(&self, pressed: bool, hover: bool) -> Style {
        if pressed {
            self.ui_pressed
        } else if hover {
            self.ui_hover
        } else {
            self.ui
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        let text = Style::NONE;
        let ui = Style::NONE.fg(CellColor::BLACK).bg(CellColor::WHITE);
        Self {
            text,
            text_hover: text.attrs(Attr::BOLD),
            text_pressed: text.attrs(Attr::INVERSE),
            ui,
            ui_hover: ui.bg(CellColor::BRIGHT_WHITE),
            ui_pressed: ui.bg(CellColor::GRAY),
            ui_focused: ui.bg(CellColor::BRIGHT_BLUE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_wins_over_hover() {
        let theme = Theme::default();
        assert_eq!(theme.ui(true, true), theme.ui_pressed);
        assert_eq!(theme.ui(false, true), theme.ui_hover);
        assert_eq!(theme.ui(false, false), theme.ui);
        assert_eq!(theme.text(true, false), theme.text_pressed);
    }
}
