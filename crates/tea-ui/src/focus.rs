// SPDX-License-Identifier: MIT
//
// Keyboard focus and hotkeys.
//
// Registrations are per frame: every render pass starts from an empty list
// and focusable views re-register while they draw. The order they register
// in is the tab order. The focused view itself persists across frames; if it
// doesn't register in a frame it has vanished and focus is dropped, never
// handed to a neighbour.

use tracing::debug;

use crate::events::{HotKey, KeyEvent};
use crate::tree::ViewId;

#[derive(Debug, Default)]
pub struct FocusManager {
    registered: Vec<ViewId>,
    hotkeys: Vec<(HotKey, ViewId)>,
    focused: Option<ViewId>,
    /// Focus as it was when the frame started.
    at_reset: Option<ViewId>,
}

impl FocusManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget this frame's registrations; remember the current focus so the
    /// end of the frame can tell whether it changed.
    pub fn reset(&mut self) {
        self.registered.clear();
        self.hotkeys.clear();
        self.at_reset = self.focused;
    }

    /// Add `view` to the tab order. Returns whether it holds focus.
    pub fn register(&mut self, view: ViewId) -> bool {
        if !self.registered.contains(&view) {
            self.registered.push(view);
        }
        self.focused == Some(view)
    }

    pub fn register_hotkey(&mut self, view: ViewId, key: HotKey) {
        self.hotkeys.push((key, view));
    }

    /// The view a key goes to: the first hotkey that matches, otherwise the
    /// focused view.
    #[must_use]
    pub fn trigger(&self, key: &KeyEvent) -> Option<ViewId> {
        self.hotkeys
            .iter()
            .find(|(hotkey, _)| hotkey.matches(key))
            .map(|&(_, view)| view)
            .or(self.focused)
    }

    /// Call once the frame is drawn. Drops a focus that didn't register and
    /// reports whether focus differs from the start of the frame.
    pub fn needs_rerender(&mut self) -> bool {
        if let Some(view) = self.focused.filter(|v| !self.registered.contains(v)) {
            debug!(?view, "focused view vanished, dropping focus");
            self.focused = None;
        }
        self.focused != self.at_reset
    }

    /// Move focus forward in tab order, wrapping. With nothing focused,
    /// picks the first view.
    pub fn focus_next(&mut self) -> Option<ViewId> {
        self.step(true)
    }

    /// Move focus backward in tab order, wrapping. With nothing focused,
    /// picks the last view.
    pub fn focus_previous(&mut self) -> Option<ViewId> {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> Option<ViewId> {
        let len = self.registered.len();
        if len == 0 {
            return self.focused;
        }
        let current = self
            .focused
            .and_then(|view| self.registered.iter().position(|&v| v == view));
        let index = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.focused = Some(self.registered[index]);
        self.focused
    }

    pub fn request_focus(&mut self, view: ViewId) {
        self.focused = Some(view);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    #[inline]
    #[must_use]
    pub const fn focused(&self) -> Option<ViewId> {
        self.focused
    }

    #[inline]
    #[must_use]
    pub fn is_focused(&self, view: ViewId) -> bool {
        self.focused == Some(view)
    }

    /// The tab order of the last frame.
    #[must_use]
    pub fn registered(&self) -> &[ViewId] {
        &self.registered
    }
}
