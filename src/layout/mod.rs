pub mod resize;
pub mod snap;

pub use resize::{ResizeEdge, apply_resize};
pub use snap::{SnapConfig, SnapZone, detect_zone, detect_zone_with, snap_bounds, snap_bounds_with};

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates. May be negative while a pointer or a
/// window origin sits past the top-left edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum, used to enforce a minimum size.
    pub fn at_least(self, min: Size) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}

/// Signed origin with unsigned size, so windows can hang partly offscreen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(to_i32(self.width))
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(to_i32(self.height))
    }

    pub fn contains(&self, point: Point) -> bool {
        rect_contains(*self, point)
    }

    pub fn intersects(&self, other: Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlapping area of the two rectangles, or an empty rect at the
    /// origin of `self` when they do not overlap.
    pub fn intersection(&self, other: Rect) -> Rect {
        if !self.intersects(other) {
            return Rect::new(self.x, self.y, 0, 0);
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, right.abs_diff(x), bottom.abs_diff(y))
    }

    /// Rectangle of `size` centered inside `self`.
    pub fn centered(&self, size: Size) -> Rect {
        let dx = (i64::from(self.width) - i64::from(size.width)) / 2;
        let dy = (i64::from(self.height) - i64::from(size.height)) / 2;
        Rect::new(
            self.x.saturating_add(clamp_i64(dx)),
            self.y.saturating_add(clamp_i64(dy)),
            size.width,
            size.height,
        )
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }
}

pub fn rect_contains(rect: Rect, point: Point) -> bool {
    if rect.is_empty() {
        return false;
    }
    point.x >= rect.x && point.x < rect.right() && point.y >= rect.y && point.y < rect.bottom()
}

/// Clamp `rect` so at least `margin` pixels of it remain inside `bounds`
/// horizontally and its top edge (the title bar) stays inside vertically.
pub fn keep_reachable(rect: Rect, bounds: Rect, margin: u32) -> Rect {
    if bounds.is_empty() {
        return rect;
    }
    let keep_w = to_i32(margin.min(rect.width));
    let min_x = bounds.x.saturating_sub(to_i32(rect.width)).saturating_add(keep_w);
    let max_x = bounds.right().saturating_sub(keep_w);
    let max_y = bounds.bottom().saturating_sub(to_i32(margin.min(rect.height)).max(1));
    let x = rect.x.clamp(min_x.min(max_x), max_x.max(min_x));
    let y = rect.y.clamp(bounds.y, max_y.max(bounds.y));
    Rect::new(x, y, rect.width, rect.height)
}

pub(crate) fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn clamp_i64(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
