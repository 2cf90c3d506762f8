// SPDX-License-Identifier: MIT
//
// The View contract and the box model around it.
//
// A view answers two questions: how big would you like to be given this
// much room (`intrinsic_size`), and draw yourself into this viewport
// (`render`). Everything else is an optional hook with a no-op default.
//
// Views never see their own box model. Offsets, explicit sizes, min/max
// and padding live in the node's `Layout` and are applied around the view
// by the tree (for sizing) and the viewport (for rendering). A view's
// `intrinsic_size` measures content only; its `render` gets a viewport that
// is already offset, clamped and padded.
//
//   sizing:    available − offset → content size → + padding → clamp/pin → + offset
//   rendering: origin = offset, box = given − offset → clamp/pin → inset padding

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tea_term::geometry::{Point, Rect, Size};

use crate::events::{KeyEvent, MouseEvent};
use crate::system::System;
use crate::tree::{ViewId, ViewTree};
use crate::viewport::Viewport;

// ─── View ────────────────────────────────────────────────────────────────────

/// A node in the view tree.
///
/// ```
/// use tea_term::geometry::{Point, Size};
/// use tea_ui::view::{LayoutCx, View};
/// use tea_ui::viewport::Viewport;
///
/// struct Label(&'static str);
///
/// impl View for Label {
///     fn intrinsic_size(&self, _cx: &LayoutCx<'_>, _available: Size) -> Size {
///         Size::new(self.0.len() as i32, 1)
///     }
///
///     fn render(&mut self, viewport: &mut Viewport<'_>) {
///         let style = viewport.theme().text;
///         viewport.write(self.0, Point::ZERO, style);
///     }
/// }
/// ```
pub trait View: 'static {
    /// Natural size of the content given `available` room. Pure; may be
    /// called several times per frame.
    fn intrinsic_size(&self, cx: &LayoutCx<'_>, available: Size) -> Size;

    /// Draw into the viewport and register for input.
    fn render(&mut self, viewport: &mut Viewport<'_>);

    /// A key routed to this view by focus or a hotkey.
    fn receive_key(&mut self, _event: &KeyEvent, _system: &mut System<'_>) {}

    /// A mouse event for a region this view registered.
    fn receive_mouse(&mut self, _event: &MouseEvent, _system: &mut System<'_>) {}

    /// One tick of the animation timer. Return `true` to keep ticking;
    /// the view must still call `register_tick` in the frame that follows.
    /// After `false` that frame's registration is ignored. The default
    /// leaves it to registration alone.
    fn receive_tick(&mut self, _dt: Duration) -> bool {
        true
    }

    /// About to be attached under `parent` (`None`: detached).
    fn will_move_to(&mut self, _parent: Option<ViewId>) {}

    /// Was just moved away from `parent` (`None`: was a root).
    fn did_move_from(&mut self, _parent: Option<ViewId>) {}

    /// Attached to a screen.
    fn did_mount(&mut self, _screen: ScreenId) {}

    /// Detached from a screen.
    fn did_unmount(&mut self, _screen: ScreenId) {}
}

/// Read-only sizing context: lets a container measure its children.
pub struct LayoutCx<'a> {
    pub(crate) tree: &'a ViewTree,
    pub(crate) view: ViewId,
}

impl<'a> LayoutCx<'a> {
    /// The view being measured.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> ViewId {
        self.view
    }

    #[must_use]
    pub fn children(&self) -> &'a [ViewId] {
        self.tree.children(self.view)
    }

    /// A child's full size, box model included.
    #[must_use]
    pub fn size_of(&self, child: ViewId, available: Size) -> Size {
        self.tree.intrinsic_size(child, available)
    }

    #[inline]
    #[must_use]
    pub const fn tree(&self) -> &'a ViewTree {
        self.tree
    }
}

// ─── ScreenId ────────────────────────────────────────────────────────────────

/// Identity of a Screen, for mount bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(u64);

impl ScreenId {
    /// A process-unique id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ─── Box Model ───────────────────────────────────────────────────────────────

/// Insets on four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Edges {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Edges {
    pub const ZERO: Self = Self::all(0);

    #[inline]
    #[must_use]
    pub const fn all(n: i32) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    /// `vertical` on top and bottom, `horizontal` on left and right.
    #[inline]
    #[must_use]
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Left plus right.
    #[inline]
    #[must_use]
    pub const fn horizontal(self) -> i32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[inline]
    #[must_use]
    pub const fn vertical(self) -> i32 {
        self.top + self.bottom
    }
}

/// The box model of one node.
///
/// ```
/// use tea_term::geometry::Size;
/// use tea_ui::view::Layout;
///
/// let pinned = Layout::new().width(10).height(3);
/// assert_eq!(pinned.outer_size(Size::new(80, 24), |_| Size::new(2, 1)), Size::new(10, 3));
///
/// let wide = Layout::new().min_width(5);
/// assert_eq!(wide.outer_size(Size::new(80, 24), |_| Size::new(2, 1)), Size::new(5, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Layout {
    /// Offset from the left of the region the parent gives.
    pub x: i32,
    /// Offset from the top of the region the parent gives.
    pub y: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub min_width: Option<i32>,
    pub min_height: Option<i32>,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
    pub padding: Edges,
}

impl Layout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            padding: Edges::ZERO,
        }
    }

    #[must_use]
    pub const fn offset(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    #[must_use]
    pub const fn width(self, width: i32) -> Self {
        Self {
            width: Some(width),
            ..self
        }
    }

    #[must_use]
    pub const fn height(self, height: i32) -> Self {
        Self {
            height: Some(height),
            ..self
        }
    }

    #[must_use]
    pub const fn min_width(self, min_width: i32) -> Self {
        Self {
            min_width: Some(min_width),
            ..self
        }
    }

    #[must_use]
    pub const fn min_height(self, min_height: i32) -> Self {
        Self {
            min_height: Some(min_height),
            ..self
        }
    }

    #[must_use]
    pub const fn max_width(self, max_width: i32) -> Self {
        Self {
            max_width: Some(max_width),
            ..self
        }
    }

    #[must_use]
    pub const fn max_height(self, max_height: i32) -> Self {
        Self {
            max_height: Some(max_height),
            ..self
        }
    }

    #[must_use]
    pub const fn padding(self, padding: Edges) -> Self {
        Self { padding, ..self }
    }

    /// Pin explicit dimensions, clamp the others to min then max, so a
    /// conflicting max wins.
    #[must_use]
    pub fn restrict(&self, size: Size) -> Size {
        Size::new(
            restrict_axis(size.width, self.width, self.min_width, self.max_width),
            restrict_axis(size.height, self.height, self.min_height, self.max_height),
        )
    }

    /// The full size of a node whose content measures `natural(room)`.
    pub fn outer_size(&self, available: Size, natural: impl FnOnce(Size) -> Size) -> Size {
        let pad = self.padding;
        let content = natural(available.shrink(self.x, self.y));
        self.restrict(content.grow(pad.horizontal(), pad.vertical()))
            .grow(self.x, self.y)
    }

    /// Where the content goes inside a region of `given` size, relative to
    /// the region's origin.
    #[must_use]
    pub fn content_rect(&self, given: Size) -> Rect {
        let size = self.restrict(given.shrink(self.x, self.y));
        let pad = self.padding;
        Rect::new(Point::new(self.x, self.y), size).inset(pad.top, pad.right, pad.bottom, pad.left)
    }
}

fn restrict_axis(value: i32, exact: Option<i32>, min: Option<i32>, max: Option<i32>) -> i32 {
    if let Some(exact) = exact {
        return exact.max(0);
    }
    let value = min.map_or(value, |min| value.max(min));
    max.map_or(value, |max| value.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTENT: Size = Size::new(2, 1);

    fn outer(layout: Layout, available: Size) -> Size {
        layout.outer_size(available, |_| CONTENT)
    }

    #[test]
    fn explicit_size_ignores_available() {
        let layout = Layout::new().width(10).height(3);
        assert_eq!(outer(layout, Size::new(4, 1)), Size::new(10, 3));
        assert_eq!(outer(layout, Size::new(200, 100)), Size::new(10, 3));
    }

    #[test]
    fn min_width_grows_natural_size() {
        assert_eq!(outer(Layout::new().min_width(5), Size::new(80, 24)), Size::new(5, 1));
    }

    #[test]
    fn max_clamps_natural_size() {
        let layout = Layout::new().max_width(1).max_height(0);
        assert_eq!(outer(layout, Size::new(80, 24)), Size::new(1, 0));
    }

    #[test]
    fn max_beats_a_conflicting_min() {
        let layout = Layout::new().min_width(10).max_width(5).min_height(4).max_height(2);
        assert_eq!(outer(layout, Size::new(80, 24)), Size::new(5, 2));
    }

    #[test]
    fn explicit_beats_min_and_max() {
        let layout = Layout::new().width(3).min_width(10).max_width(1);
        assert_eq!(outer(layout, Size::new(80, 24)).width, 3);
    }

    #[test]
    fn offset_shrinks_room_and_grows_box() {
        let layout = Layout::new().offset(3, 1);
        let mut seen = Size::ZERO;
        let size = layout.outer_size(Size::new(10, 5), |room| {
            seen = room;
            CONTENT
        });
        assert_eq!(seen, Size::new(7, 4));
        assert_eq!(size, Size::new(5, 2));
    }

    #[test]
    fn padding_wraps_content() {
        let layout = Layout::new().padding(Edges::symmetric(1, 2));
        let mut seen = Size::ZERO;
        let size = layout.outer_size(Size::new(10, 5), |room| {
            seen = room;
            CONTENT
        });
        assert_eq!(seen, Size::new(10, 5));
        assert_eq!(size, Size::new(6, 3));
    }

    #[test]
    fn pinned_width_includes_padding() {
        let layout = Layout::new().width(10).padding(Edges::all(1));
        assert_eq!(outer(layout, Size::new(80, 24)), Size::new(10, 3));
    }

    #[test]
    fn content_rect_applies_offset_pin_and_padding() {
        let layout = Layout::new()
            .offset(2, 1)
            .width(8)
            .padding(Edges::all(1));
        assert_eq!(
            layout.content_rect(Size::new(20, 5)),
            Rect::new(Point::new(3, 2), Size::new(6, 2))
        );
    }

    #[test]
    fn content_rect_saturates() {
        let layout = Layout::new().offset(30, 30).padding(Edges::all(2));
        assert!(layout.content_rect(Size::new(10, 10)).is_empty());
    }

    #[test]
    fn screen_ids_are_unique() {
        assert_ne!(ScreenId::next(), ScreenId::next());
    }
}
