// SPDX-License-Identifier: MIT
//
// The handler context.
//
// Input hooks (`receive_key`, `receive_mouse`) get a `System` instead of
// the Screen. It exposes what a handler may legitimately change between
// frames: the tree, focus, the modal stack, and whether to quit. It cannot
// render; the Screen renders once the handler returns.

use tea_term::geometry::Rect;

use crate::focus::FocusManager;
use crate::modal::ModalManager;
use crate::tree::{ViewId, ViewTree};
use crate::view::View;

pub struct System<'a> {
    pub(crate) view: ViewId,
    pub(crate) tree: &'a mut ViewTree,
    pub(crate) focus: &'a mut FocusManager,
    pub(crate) modal: &'a mut ModalManager,
    pub(crate) quit: &'a mut bool,
}

impl System<'_> {
    /// The view receiving the event.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> ViewId {
        self.view
    }

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &ViewTree {
        self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut ViewTree {
        self.tree
    }

    /// Add a detached view, typically a modal about to be requested.
    pub fn insert(&mut self, view: impl View) -> ViewId {
        self.tree.insert(view)
    }

    /// Open `modal` at `rect` (absolute), on behalf of the receiving view.
    /// A refused request leaves the tree alone.
    pub fn request_modal(
        &mut self,
        modal: ViewId,
        on_close: impl FnOnce() + 'static,
        rect: Rect,
    ) -> bool {
        self.modal
            .request_modal(self.tree, self.view, modal, on_close, rect)
    }

    /// Close `modal` and every modal above it; their subtrees leave the
    /// tree. Returns the closed modals, innermost first.
    pub fn dismiss_modal(&mut self, modal: ViewId) -> Vec<ViewId> {
        let closed = self.modal.dismiss_modal(modal);
        for &id in &closed {
            self.tree.remove(id).ok();
        }
        closed
    }

    pub fn request_focus(&mut self, view: ViewId) {
        self.focus.request_focus(view);
    }

    pub fn focus_next(&mut self) -> Option<ViewId> {
        self.focus.focus_next()
    }

    pub fn focus_previous(&mut self) -> Option<ViewId> {
        self.focus.focus_previous()
    }

    pub fn blur(&mut self) {
        self.focus.blur();
    }

    #[must_use]
    pub fn is_focused(&self, view: ViewId) -> bool {
        self.focus.is_focused(view)
    }

    #[must_use]
    pub fn focused(&self) -> Option<ViewId> {
        self.focus.focused()
    }

    /// Stop the Screen after this event.
    pub fn quit(&mut self) {
        *self.quit = true;
    }
}
