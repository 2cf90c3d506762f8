// SPDX-License-Identifier: MIT
//
// Viewport: a view's window onto the frame for the length of one render.
//
// A viewport is three rectangles in disguise:
//
//   offset        where the view's local (0,0) sits on screen
//   content size  the box the view was given, after its own box model
//   visible rect  the part of that box not clipped away by ancestors,
//                 in local coordinates
//
// Everything a view writes is translated by `offset` and dropped outside
// the visible rect, so a view draws in its own coordinates and never needs
// to know where it ended up or what covers it. Registrations (mouse, focus,
// ticks, hotkeys) go through the same translation into the frame's
// per-render tables.
//
// A viewport only exists inside `View::render`. It borrows the frame and
// the tree mutably, which is what stops views from rendering outside a
// render pass.

use tea_term::buffer::{Buffer, char_width};
use tea_term::cell::Style;
use tea_term::geometry::{Point, Rect, Size};

use crate::events::{HotKey, MouseEvents};
use crate::focus::FocusManager;
use crate::mouse::MouseManager;
use crate::theme::Theme;
use crate::tick::TickManager;
use crate::tree::{ViewId, ViewTree};

// ─── Frame ───────────────────────────────────────────────────────────────────

/// Per-render state: the cell buffer plus the registration tables views
/// fill while drawing.
#[derive(Debug, Default)]
pub struct Frame {
    pub(crate) buffer: Buffer,
    pub(crate) focus: FocusManager,
    pub(crate) mouse: MouseManager,
    pub(crate) tick: TickManager,
}

impl Frame {
    #[must_use]
    pub fn new(tick: TickManager) -> Self {
        Self {
            buffer: Buffer::default(),
            focus: FocusManager::new(),
            mouse: MouseManager::new(),
            tick,
        }
    }

    /// Clear every registration table before a render pass.
    pub fn reset(&mut self) {
        self.reset_input();
        self.tick.reset();
    }

    /// Clear only focus and mouse registrations, so whatever renders next
    /// is the only thing that can receive input.
    pub fn reset_input(&mut self) {
        self.focus.reset();
        self.mouse.reset();
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn focus(&self) -> &FocusManager {
        &self.focus
    }

    #[inline]
    #[must_use]
    pub const fn mouse(&self) -> &MouseManager {
        &self.mouse
    }

    #[inline]
    #[must_use]
    pub const fn tick(&self) -> &TickManager {
        &self.tick
    }
}

/// Render `id` into the region `rect` (absolute), clipped to `clip`
/// (absolute). Applies the node's box model first: the view's viewport is
/// the layout's content rect inside `rect`.
pub(crate) fn render_view(frame: &mut Frame, tree: &mut ViewTree, id: ViewId, rect: Rect, clip: Rect) {
    if !tree.contains(id) {
        return;
    }
    let inner = tree
        .layout(id)
        .content_rect(rect.size)
        .offset(rect.origin.x, rect.origin.y);
    let visible = clip
        .intersection(inner)
        .offset(-inner.origin.x, -inner.origin.y);

    tree.with_view(id, |view, tree| {
        let mut viewport = Viewport {
            frame,
            tree,
            view: id,
            offset: inner.origin,
            content_size: inner.size,
            visible,
        };
        view.render(&mut viewport);
    });
}

// ─── Viewport ────────────────────────────────────────────────────────────────

pub struct Viewport<'a> {
    frame: &'a mut Frame,
    tree: &'a mut ViewTree,
    view: ViewId,
    offset: Point,
    content_size: Size,
    visible: Rect,
}

impl<'a> Viewport<'a> {
    /// The view being rendered.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> ViewId {
        self.view
    }

    /// The box this view was given.
    #[inline]
    #[must_use]
    pub const fn content_size(&self) -> Size {
        self.content_size
    }

    /// The unclipped part of the box, in local coordinates.
    #[inline]
    #[must_use]
    pub const fn visible_rect(&self) -> Rect {
        self.visible
    }

    /// Nothing drawn here would show.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.tree.theme(self.view)
    }

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &ViewTree {
        self.tree
    }

    // ── Drawing ────────────────────────────────────────────────────────

    /// Write `text` on one line starting at `at`. Returns the number of
    /// columns advanced, whether or not they were visible. Wide glyphs are
    /// drawn only if both their columns are visible.
    pub fn write(&mut self, text: &str, at: Point, style: Style) -> i32 {
        let mut x = at.x;
        for ch in text.chars() {
            x += self.put(ch, Point::new(x, at.y), style);
        }
        x - at.x
    }

    /// Write one glyph. Returns its width in columns.
    pub fn write_char(&mut self, ch: char, at: Point, style: Style) -> i32 {
        self.put(ch, at, style)
    }

    fn put(&mut self, ch: char, at: Point, style: Style) -> i32 {
        let width = i32::try_from(char_width(ch)).unwrap_or(0);
        if width == 0 {
            return 0;
        }
        let last = at.offset(width - 1, 0);
        if self.visible.contains(at) && self.visible.contains(last) {
            self.frame
                .buffer
                .write(ch, at.add(self.offset), style);
        }
        width
    }

    /// Blank-fill the visible rect.
    pub fn paint(&mut self, style: Style) {
        let area = self.visible.offset(self.offset.x, self.offset.y);
        self.frame.buffer.fill(area, style);
    }

    /// Run `f` on a nested viewport covering `rect` (local). The nested
    /// viewport's origin is `rect.origin`; it can't draw outside `rect` or
    /// outside this viewport's visible area.
    pub fn clipped<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Viewport<'_>) -> R) -> R {
        let visible = self
            .visible
            .intersection(rect)
            .offset(-rect.origin.x, -rect.origin.y);
        let mut nested = Viewport {
            frame: &mut *self.frame,
            tree: &mut *self.tree,
            view: self.view,
            offset: self.offset.add(rect.origin),
            content_size: rect.size,
            visible,
        };
        f(&mut nested)
    }

    /// [`clipped`](Self::clipped), painting the nested area with `style`
    /// first.
    pub fn clipped_with<R>(
        &mut self,
        rect: Rect,
        style: Style,
        f: impl FnOnce(&mut Viewport<'_>) -> R,
    ) -> R {
        self.clipped(rect, |viewport| {
            viewport.paint(style);
            f(viewport)
        })
    }

    /// Hand out a pen-tracking writer starting at the local origin.
    pub fn claim<R>(&mut self, style: Style, f: impl FnOnce(&mut Writer<'_, 'a>) -> R) -> R {
        let mut writer = Writer {
            viewport: self,
            cursor: Point::ZERO,
            pen: style,
        };
        f(&mut writer)
    }

    // ── Registration ───────────────────────────────────────────────────

    /// Receive `events` anywhere in the visible rect.
    pub fn register_mouse(&mut self, events: MouseEvents) {
        self.assign_mouse(self.view, events, None);
    }

    /// Register a mouse region on behalf of `view`, covering `rect` (local,
    /// defaults to the whole visible rect) clipped to what is visible.
    pub fn assign_mouse(&mut self, view: ViewId, events: MouseEvents, rect: Option<Rect>) {
        let local = rect.map_or(self.visible, |rect| rect.intersection(self.visible));
        let area = local.offset(self.offset.x, self.offset.y);
        self.frame.mouse.register(view, area, events);
    }

    /// Ask for a `receive_tick` on the next timer tick.
    pub fn register_tick(&mut self) {
        self.frame.tick.register(self.view);
    }

    /// Join the tab order. Returns whether this view holds focus.
    pub fn register_focus(&mut self) -> bool {
        self.frame.focus.register(self.view)
    }

    pub fn register_hotkey(&mut self, key: HotKey) {
        self.frame.focus.register_hotkey(self.view, key);
    }

    // ── Children ───────────────────────────────────────────────────────

    #[must_use]
    pub fn children(&self) -> Vec<ViewId> {
        self.tree.children(self.view).to_vec()
    }

    /// A child's full size, box model included.
    #[must_use]
    pub fn size_of(&self, child: ViewId, available: Size) -> Size {
        self.tree.intrinsic_size(child, available)
    }

    /// Render `child` into `rect` (local). The child's box model is applied
    /// inside `rect` and it is clipped to this viewport's visible area.
    pub fn render(&mut self, child: ViewId, rect: Rect) {
        let rect = rect.offset(self.offset.x, self.offset.y);
        let clip = self.visible.offset(self.offset.x, self.offset.y);
        render_view(self.frame, self.tree, child, rect, clip);
    }
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// A cursor and a pen over a viewport. Text flows left to right; `\n`
/// returns to column 0 on the next row.
pub struct Writer<'v, 'a> {
    viewport: &'v mut Viewport<'a>,
    cursor: Point,
    pen: Style,
}

impl Writer<'_, '_> {
    pub fn write(&mut self, ch: char) {
        if ch == '\n' {
            self.cursor = Point::new(0, self.cursor.y + 1);
            return;
        }
        let width = self.viewport.put(ch, self.cursor, self.pen);
        self.cursor = self.cursor.offset(width, 0);
    }

    pub fn write_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.write(ch);
        }
    }

    /// Swap the pen. Returns the previous one.
    pub fn replace_pen(&mut self, pen: Style) -> Style {
        std::mem::replace(&mut self.pen, pen)
    }

    #[inline]
    #[must_use]
    pub const fn pen(&self) -> Style {
        self.pen
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point {
        self.cursor
    }

    pub fn move_to(&mut self, at: Point) {
        self.cursor = at;
    }
}
