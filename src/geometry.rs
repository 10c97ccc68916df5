//! Points, client-space mapping and the heart outline.

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen rectangle of the canvas as reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Map a client-space point into surface pixels.
///
/// The canvas may be displayed at any CSS size, so each axis is scaled by its
/// own intrinsic/displayed ratio. Returns `None` while the canvas has no
/// displayed area (hidden, not laid out yet).
pub fn map_client_point(client: Point, rect: ClientRect, intrinsic: (u32, u32)) -> Option<Point> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let scale_x = intrinsic.0 as f64 / rect.width;
    let scale_y = intrinsic.1 as f64 / rect.height;
    Some(Point::new(
        (client.x - rect.left) * scale_x,
        (client.y - rect.top) * scale_y,
    ))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Heart made of four cubic segments, scaled to a `w` x `h` box.
///
/// The dip sits at (w/2, 0.2h) and the tip at (w/2, 0.95h); the lobes reach
/// out to 0.1w and 0.9w.
pub fn heart_outline(w: f64, h: f64) -> [PathCmd; 6] {
    let p = |fx: f64, fy: f64| Point::new(w * fx, h * fy);
    [
        PathCmd::MoveTo(p(0.5, 0.2)),
        PathCmd::CubicTo(p(0.5, 0.15), p(0.1, 0.05), p(0.1, 0.45)),
        PathCmd::CubicTo(p(0.1, 0.65), p(0.4, 0.85), p(0.5, 0.95)),
        PathCmd::CubicTo(p(0.6, 0.85), p(0.9, 0.65), p(0.9, 0.45)),
        PathCmd::CubicTo(p(0.9, 0.05), p(0.5, 0.15), p(0.5, 0.2)),
        PathCmd::Close,
    ]
}
