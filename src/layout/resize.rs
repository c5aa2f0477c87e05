use serde::{Deserialize, Serialize};

use super::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeEdge::Left | ResizeEdge::TopLeft | ResizeEdge::BottomLeft
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeEdge::Right | ResizeEdge::TopRight | ResizeEdge::BottomRight
        )
    }

    fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeEdge::Top | ResizeEdge::TopLeft | ResizeEdge::TopRight
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeEdge::Bottom | ResizeEdge::BottomLeft | ResizeEdge::BottomRight
        )
    }
}

/// Rectangle produced by dragging `edge` of `start` from `pointer_start` to
/// `pointer`.
///
/// The opposite edge stays anchored. When the result would shrink below
/// `min`, the dragged edge stops at the minimum instead of pushing the
/// anchored edge. With `bounds`, growing edges stop at the bounds.
pub fn apply_resize(
    start: Rect,
    edge: ResizeEdge,
    pointer_start: Point,
    pointer: Point,
    min: Size,
    bounds: Option<Rect>,
) -> Rect {
    let dx = i64::from(pointer.x) - i64::from(pointer_start.x);
    let dy = i64::from(pointer.y) - i64::from(pointer_start.y);
    let mut x = i64::from(start.x);
    let mut y = i64::from(start.y);
    let mut width = i64::from(start.width);
    let mut height = i64::from(start.height);

    if edge.moves_left() {
        x += dx;
        width -= dx;
    } else if edge.moves_right() {
        width += dx;
    }
    if edge.moves_top() {
        y += dy;
        height -= dy;
    } else if edge.moves_bottom() {
        height += dy;
    }

    if let Some(bounds) = bounds {
        let left = i64::from(bounds.x);
        let top = i64::from(bounds.y);
        let right = i64::from(bounds.right());
        let bottom = i64::from(bounds.bottom());
        if edge.moves_left() && x < left {
            width -= left - x;
            x = left;
        }
        if edge.moves_top() && y < top {
            height -= top - y;
            y = top;
        }
        if edge.moves_right() && x + width > right {
            width = right - x;
        }
        if edge.moves_bottom() && y + height > bottom {
            height = bottom - y;
        }
    }

    let min_w = i64::from(min.width.max(1));
    let min_h = i64::from(min.height.max(1));
    if width < min_w {
        if edge.moves_left() {
            x -= min_w - width;
        }
        width = min_w;
    }
    if height < min_h {
        if edge.moves_top() {
            y -= min_h - height;
        }
        height = min_h;
    }

    Rect::new(
        clamp_coord(x),
        clamp_coord(y),
        clamp_len(width),
        clamp_len(height),
    )
}

fn clamp_coord(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

fn clamp_len(value: i64) -> u32 {
    // keep lengths representable as i32 so right/bottom edges never overflow
    u32::try_from(value.clamp(1, i64::from(i32::MAX))).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Size = Size::new(200, 150);

    fn start() -> Rect {
        Rect::new(100, 500, 400, 300)
    }

    #[test]
    fn resize_top_drag_down() {
        let res = apply_resize(
            start(),
            ResizeEdge::Top,
            Point::new(300, 500),
            Point::new(300, 550),
            MIN,
            None,
        );
        assert_eq!(res, Rect::new(100, 550, 400, 250));
    }

    #[test]
    fn resize_top_drag_up() {
        let res = apply_resize(
            start(),
            ResizeEdge::Top,
            Point::new(300, 500),
            Point::new(300, 450),
            MIN,
            None,
        );
        assert_eq!(res, Rect::new(100, 450, 400, 350));
    }

    #[test]
    fn bottom_right_corner_grows_both_axes() {
        let res = apply_resize(
            start(),
            ResizeEdge::BottomRight,
            Point::new(500, 800),
            Point::new(540, 830),
            MIN,
            None,
        );
        assert_eq!(res, Rect::new(100, 500, 440, 330));
    }

    #[test]
    fn left_edge_stops_at_min_width_without_moving_right_edge() {
        let res = apply_resize(
            start(),
            ResizeEdge::Left,
            Point::new(100, 600),
            Point::new(450, 600),
            MIN,
            None,
        );
        assert_eq!(res.width, MIN.width);
        assert_eq!(res.right(), start().right());
    }

    #[test]
    fn top_left_clamps_both_axes_to_min() {
        let res = apply_resize(
            start(),
            ResizeEdge::TopLeft,
            Point::new(100, 500),
            Point::new(900, 900),
            MIN,
            None,
        );
        assert_eq!(res.size(), MIN);
        assert_eq!(res.right(), start().right());
        assert_eq!(res.bottom(), start().bottom());
    }

    #[test]
    fn bounds_stop_growing_edges() {
        let bounds = Rect::new(0, 0, 1920, 1032);
        let res = apply_resize(
            start(),
            ResizeEdge::BottomRight,
            Point::new(500, 800),
            Point::new(5000, 5000),
            MIN,
            Some(bounds),
        );
        assert_eq!(res.right(), 1920);
        assert_eq!(res.bottom(), 1032);
    }

    #[test]
    fn left_edge_offscreen_preserves_negative_origin() {
        let start = Rect::new(-80, 100, 300, 200);
        let res = apply_resize(
            start,
            ResizeEdge::Left,
            Point::new(0, 150),
            Point::new(40, 150),
            MIN,
            None,
        );
        assert_eq!(res.x, -40);
        assert_eq!(res.width, 260);
    }
}
