// SPDX-License-Identifier: MIT
//
// Modal stack.
//
// A modal is a detached view tree drawn over everything else at a fixed
// rectangle. Modals stack: only the topmost one (or something inside it)
// may open another, so a stray view behind a dialog can't pop a second
// dialog over it. Dismissing a modal also dismisses everything opened on
// top of it.
//
// Modals render after the root, in stack order. Just before the topmost
// one renders, focus and mouse registrations are wiped, which is what
// makes everything underneath visible but inert.

use std::fmt;

use tea_term::geometry::Rect;
use tracing::debug;

use crate::tree::{ViewId, ViewTree};
use crate::viewport::{Frame, render_view};

struct Entry {
    parent: ViewId,
    modal: ViewId,
    on_close: Box<dyn FnOnce()>,
    rect: Rect,
}

#[derive(Default)]
pub struct ModalManager {
    stack: Vec<Entry>,
    active: Option<ViewId>,
}

impl ModalManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `modal`, opened by `parent`, to be drawn at `rect` (absolute).
    /// Refused unless the stack is empty or `parent` lives inside the
    /// topmost modal.
    pub fn request_modal(
        &mut self,
        tree: &ViewTree,
        parent: ViewId,
        modal: ViewId,
        on_close: impl FnOnce() + 'static,
        rect: Rect,
    ) -> bool {
        if let Some(top) = self.stack.last() {
            if !tree.is_in_subtree(parent, top.modal) {
                debug!(?parent, ?modal, top = ?top.modal, "modal rejected");
                return false;
            }
        }
        debug!(?parent, ?modal, depth = self.stack.len() + 1, "modal opened");
        self.stack.push(Entry {
            parent,
            modal,
            on_close: Box::new(on_close),
            rect,
        });
        true
    }

    /// Pop `modal` and everything above it, innermost first, running each
    /// one's `on_close`. Returns the popped modals in that order; empty if
    /// `modal` isn't on the stack.
    pub fn dismiss_modal(&mut self, modal: ViewId) -> Vec<ViewId> {
        let Some(index) = self.stack.iter().position(|entry| entry.modal == modal) else {
            return Vec::new();
        };
        let popped: Vec<Entry> = self.stack.drain(index..).rev().collect();
        let mut closed = Vec::with_capacity(popped.len());
        for entry in popped {
            debug!(modal = ?entry.modal, parent = ?entry.parent, "modal dismissed");
            (entry.on_close)();
            closed.push(entry.modal);
        }
        if self.active.is_some_and(|active| closed.contains(&active)) {
            self.active = None;
        }
        closed
    }

    /// Draw every modal in stack order, clipped to `screen`. Returns the
    /// topmost one.
    pub(crate) fn render_modals(
        &mut self,
        frame: &mut Frame,
        tree: &mut ViewTree,
        screen: Rect,
    ) -> Option<ViewId> {
        let last = self.stack.len().checked_sub(1)?;
        let entries: Vec<(ViewId, Rect)> = self
            .stack
            .iter()
            .map(|entry| (entry.modal, entry.rect))
            .collect();

        for (index, (modal, rect)) in entries.into_iter().enumerate() {
            if index == last {
                frame.reset_input();
            }
            render_view(frame, tree, modal, rect, screen);
        }
        self.active = self.stack.last().map(|entry| entry.modal);
        self.active
    }

    /// Forget which modal rendered last.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// The topmost modal as of the last render.
    #[inline]
    #[must_use]
    pub const fn active(&self) -> Option<ViewId> {
        self.active
    }

    #[must_use]
    pub fn top(&self) -> Option<ViewId> {
        self.stack.last().map(|entry| entry.modal)
    }

    /// Where `modal` is drawn, if it is stacked.
    #[must_use]
    pub fn rect(&self, modal: ViewId) -> Option<Rect> {
        self.stack
            .iter()
            .find(|entry| entry.modal == modal)
            .map(|entry| entry.rect)
    }

    /// Every stacked modal, bottom first.
    #[must_use]
    pub fn roots(&self) -> Vec<ViewId> {
        self.stack.iter().map(|entry| entry.modal).collect()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }
}

impl fmt::Debug for ModalManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalManager")
            .field("stack", &self.roots())
            .field("active", &self.active)
            .finish()
    }
}
