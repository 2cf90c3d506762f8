// SPDX-License-Identifier: MIT
//
// Geometry: points, sizes, and rectangles in cell units.
//
// Every layout computation in the engine is expressed with these three
// value types. They are `Copy`, compared by value, and carry signed
// coordinates: layout arithmetic routinely produces negative origins
// (content scrolled past the top-left) or overshoots the terminal edge,
// and the clipping layer needs to see those values unclamped.
//
// Sizes are the exception: a `Size` never goes negative. `shrink` saturates
// at zero so a child squeezed by padding or offsets ends up empty instead
// of inverted.
//
// There is no separate "mutable" variant. Fields are public, so a hot loop
// that walks a cursor across a line just copies the point into a `let mut`
// binding and bumps `x` directly.

use std::fmt;

// ─── Point ──────────────────────────────────────────────────────────────────

/// A position in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This point moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Component-wise sum.
    #[inline]
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        self.offset(other.x, other.y)
    }

    /// Component-wise difference.
    #[inline]
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        self.offset(-other.x, -other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ─── Size ───────────────────────────────────────────────────────────────────

/// A width × height in cells. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// The empty size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create a size. Negative dimensions are clamped to zero.
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Whether either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of cells covered (`width × height`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Reduce both dimensions, saturating at zero.
    #[inline]
    #[must_use]
    pub const fn shrink(self, dw: i32, dh: i32) -> Self {
        Self::new(self.width - dw, self.height - dh)
    }

    /// Increase both dimensions.
    #[inline]
    #[must_use]
    pub const fn grow(self, dw: i32, dh: i32) -> Self {
        Self::new(self.width + dw, self.height + dh)
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ─── Rect ───────────────────────────────────────────────────────────────────

/// An origin plus a size. The right and bottom edges are exclusive.
///
/// ```
/// use tea_term::geometry::{Point, Rect, Size};
///
/// let r = Rect::new(Point::new(2, 1), Size::new(3, 2));
/// assert!(r.contains(Point::new(2, 1)));
/// assert!(r.contains(Point::new(4, 2)));
/// assert!(!r.contains(Point::new(5, 2)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    #[inline]
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Rectangle at the origin covering `size`.
    #[inline]
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    #[inline]
    #[must_use]
    pub const fn min_x(self) -> i32 {
        self.origin.x
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn max_x(self) -> i32 {
        self.origin.x + self.size.width
    }

    #[inline]
    #[must_use]
    pub const fn min_y(self) -> i32 {
        self.origin.y
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn max_y(self) -> i32 {
        self.origin.y + self.size.height
    }

    /// Whether the rectangle covers no cells.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.size.is_empty()
    }

    /// `min_x ≤ x < max_x` and `min_y ≤ y < max_y`.
    #[inline]
    #[must_use]
    pub const fn contains(self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// The overlapping region, or an empty rect anchored at the clamped
    /// origin when the two don't overlap.
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        let x1 = self.min_x().max(other.min_x());
        let y1 = self.min_y().max(other.min_y());
        let x2 = self.max_x().min(other.max_x());
        let y2 = self.max_y().min(other.max_y());
        Self::new(Point::new(x1, y1), Size::new(x2 - x1, y2 - y1))
    }

    /// This rectangle moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            origin: self.origin.offset(dx, dy),
            size: self.size,
        }
    }

    /// Inset each edge, saturating the size at zero.
    #[must_use]
    pub const fn inset(self, top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            origin: self.origin.offset(left, top),
            size: self.size.shrink(left + right, top + bottom),
        }
    }

    /// Every point in row-major order.
    pub fn points(self) -> impl Iterator<Item = Point> {
        let (x1, x2) = (self.min_x(), self.max_x());
        (self.min_y()..self.max_y()).flat_map(move |y| (x1..x2).map(move |x| Point::new(x, y)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.origin, self.size)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── Size ────────────────────────────────────────────────────────────

    #[test]
    fn size_new_clamps_negative() {
        assert_eq!(Size::new(-3, 4), Size::new(0, 4));
        assert_eq!(Size::new(3, -4), Size::new(3, 0));
    }

    #[test]
    fn shrink_saturates_at_zero() {
        assert_eq!(Size::new(5, 5).shrink(10, 2), Size::new(0, 3));
    }

    #[test]
    fn grow_and_max() {
        assert_eq!(Size::new(1, 2).grow(2, 2), Size::new(3, 4));
        assert_eq!(Size::new(1, 9).max(Size::new(4, 2)), Size::new(4, 9));
        assert_eq!(Size::new(1, 9).min(Size::new(4, 2)), Size::new(1, 2));
    }

    #[test]
    fn size_is_empty() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(0, 3).is_empty());
        assert!(!Size::new(1, 1).is_empty());
    }

    // ── Rect ────────────────────────────────────────────────────────────

    #[test]
    fn rect_edges() {
        let r = Rect::new(Point::new(10, 5), Size::new(80, 24));
        assert_eq!(r.min_x(), 10);
        assert_eq!(r.max_x(), 90);
        assert_eq!(r.min_y(), 5);
        assert_eq!(r.max_y(), 29);
    }

    #[test]
    fn rect_contains_corners() {
        let r = Rect::new(Point::new(10, 10), Size::new(20, 20));
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(29, 29)));
        assert!(!r.contains(Point::new(9, 10)));
        assert!(!r.contains(Point::new(30, 10)));
        assert!(!r.contains(Point::new(10, 30)));
    }

    #[test]
    fn negative_origin_contains_screen_origin() {
        let r = Rect::new(Point::new(-5, -3), Size::new(20, 10));
        assert!(r.contains(Point::ZERO));
        assert!(!r.contains(Point::new(15, 0)));
    }

    #[test]
    fn intersection_overlap() {
        let a = Rect::from_size(Size::new(20, 20));
        let b = Rect::new(Point::new(10, 10), Size::new(20, 20));
        assert_eq!(
            a.intersection(b),
            Rect::new(Point::new(10, 10), Size::new(10, 10))
        );
    }

    #[test]
    fn intersection_disjoint_is_empty() {
        let a = Rect::from_size(Size::new(10, 10));
        let b = Rect::new(Point::new(20, 20), Size::new(10, 10));
        assert!(a.intersection(b).is_empty());
    }

    #[test]
    fn intersection_adjacent_is_empty() {
        let a = Rect::from_size(Size::new(10, 10));
        let b = Rect::new(Point::new(10, 0), Size::new(10, 10));
        assert!(a.intersection(b).is_empty());
    }

    #[test]
    fn inset_shrinks_and_moves() {
        let r = Rect::from_size(Size::new(10, 4)).inset(1, 2, 1, 3);
        assert_eq!(r, Rect::new(Point::new(3, 1), Size::new(5, 2)));
    }

    #[test]
    fn points_row_major() {
        let pts: Vec<Point> = Rect::new(Point::new(1, 1), Size::new(2, 2))
            .points()
            .collect();
        assert_eq!(
            pts,
            vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(1, 2),
                Point::new(2, 2)
            ]
        );
    }

    #[test]
    fn display_formats() {
        let r = Rect::new(Point::new(1, 2), Size::new(3, 4));
        assert_eq!(r.to_string(), "(1, 2)+3x4");
    }

    // ── Properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn contains_matches_edge_definition(
            ox in -50i32..50, oy in -50i32..50,
            w in 0i32..50, h in 0i32..50,
            px in -120i32..120, py in -120i32..120,
        ) {
            let r = Rect::new(Point::new(ox, oy), Size::new(w, h));
            let p = Point::new(px, py);
            let expected = r.min_x() <= p.x && p.x < r.max_x()
                && r.min_y() <= p.y && p.y < r.max_y();
            prop_assert_eq!(r.contains(p), expected);
        }

        #[test]
        fn intersection_is_contained_in_both(
            ax in -20i32..20, ay in -20i32..20, aw in 0i32..30, ah in 0i32..30,
            bx in -20i32..20, by in -20i32..20, bw in 0i32..30, bh in 0i32..30,
        ) {
            let a = Rect::new(Point::new(ax, ay), Size::new(aw, ah));
            let b = Rect::new(Point::new(bx, by), Size::new(bw, bh));
            let i = a.intersection(b);
            for p in i.points() {
                prop_assert!(a.contains(p) && b.contains(p));
            }
        }
    }
}
