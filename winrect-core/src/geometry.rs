//! Screen-coordinate value types.
//!
//! [`Point`] and [`Rect`] are plain `Copy` values in the OS convention:
//! origin at the top-left of the primary display, y increasing downward,
//! negative coordinates allowed (monitors left of or above the primary).
//!
//! Both are `#[repr(C)]` with the same layout as Win32 `POINT` / `RECT`
//! so the FFI crate can write them straight into caller memory.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position in screen coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle in screen coordinates.
///
/// No ordering between `left`/`right` or `top`/`bottom` is enforced.
/// [`width`](Rect::width) and [`height`](Rect::height) are absolute
/// differences, so an inverted rectangle still reports a positive size.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// x of the upper-left corner.
    pub left: i32,
    /// y of the upper-left corner.
    pub top: i32,
    /// x of the lower-right corner.
    pub right: i32,
    /// y of the lower-right corner.
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// `|right - left|`.  Returned as `u32` so that any pair of `i32`
    /// edges fits.
    pub const fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    /// `|top - bottom|`.
    pub const fn height(&self) -> u32 {
        self.top.abs_diff(self.bottom)
    }

    /// `(left + width / 2, top + height / 2)`, each sum truncated toward
    /// zero.
    ///
    /// The offsets are applied to the raw `left` / `top`, not to the
    /// smaller edge.  For an inverted rectangle (`right < left` or
    /// `bottom < top`) the result therefore lies outside the rectangle:
    /// `Rect::new(10, 20, 0, 0).center()` is `(15, 30)`.  Use
    /// [`geometric_center`](Rect::geometric_center) for the true midpoint.
    ///
    /// A negative sum with an odd extent rounds up, not down:
    /// `Rect::new(-5, -5, -2, -2).center()` is `(-3, -3)`.  Saturates at
    /// the `i32` bounds.
    pub const fn center(&self) -> Point {
        Point {
            x: half_offset(self.left, self.width()),
            y: half_offset(self.top, self.height()),
        }
    }

    /// Midpoint of the [`normalized`](Rect::normalized) rectangle.
    ///
    /// Identical to [`center`](Rect::center) whenever `left <= right` and
    /// `top <= bottom`.
    pub const fn geometric_center(&self) -> Point {
        self.normalized().center()
    }

    /// The same rectangle with `left <= right` and `top <= bottom`.
    pub const fn normalized(&self) -> Rect {
        let (left, right) = if self.left <= self.right {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        };
        let (top, bottom) = if self.top <= self.bottom {
            (self.top, self.bottom)
        } else {
            (self.bottom, self.top)
        };
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Whether `p` lies inside the normalized rectangle.
    ///
    /// Left and top edges are inclusive, right and bottom exclusive, which
    /// matches how Win32 treats `RECT`.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.normalized();
        p.x >= n.left && p.x < n.right && p.y >= n.top && p.y < n.bottom
    }
}

/// `trunc(origin + extent / 2)` computed exactly in `i64`, clamped to `i32`.
const fn half_offset(origin: i32, extent: u32) -> i32 {
    let doubled = 2 * origin as i64 + extent as i64;
    let v = doubled / 2;
    if v > i32::MAX as i64 {
        i32::MAX
    } else if v < i32::MIN as i64 {
        i32::MIN
    } else {
        v as i32
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

// ---------------------------------------------------------------------------
// Win32 conversions
// ---------------------------------------------------------------------------

#[cfg(windows)]
mod win32 {
    use windows::Win32::Foundation::{POINT, RECT};

    use super::{Point, Rect};

    impl From<POINT> for Point {
        fn from(p: POINT) -> Self {
            Point::new(p.x, p.y)
        }
    }

    impl From<Point> for POINT {
        fn from(p: Point) -> Self {
            POINT { x: p.x, y: p.y }
        }
    }

    impl From<RECT> for Rect {
        fn from(r: RECT) -> Self {
            Rect::new(r.left, r.top, r.right, r.bottom)
        }
    }

    impl From<Rect> for RECT {
        fn from(r: Rect) -> Self {
            RECT {
                left: r.left,
                top: r.top,
                right: r.right,
                bottom: r.bottom,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
