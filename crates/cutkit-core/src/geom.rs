//! Geometry kernel: orientation, collinearity, sharp-turn classification
//! and line/segment intersection.
//!
//! All functions here are pure and operate on mm coordinates in the
//! plotting plane (y grows downward). They are the primitives every
//! planner decision is built from.

use crate::types::Point2;

/// Floating tolerance shared by the kernel and the point model.
pub const EPSILON: f64 = 1e-10;

/// Signed area of the parallelogram spanned by `ab` and `ac`.
fn cross(a: Point2, b: Point2, c: Point2) -> f64 {
    (c.y - a.y) * (b.x - a.x) - (b.y - a.y) * (c.x - a.x)
}

/// True iff `a`, `b`, `c` are counter-clockwise in a right-handed frame.
///
/// This is the primitive for all turn and intersection logic. It gives no
/// "undefined" answer for collinear input; callers that may see
/// near-collinear triples must test [`collinear`] first.
pub fn ccw(a: Point2, b: Point2, c: Point2) -> bool {
    cross(a, b, c) > 0.0
}

/// True iff `a`, `b`, `c` lie on one line, within [`EPSILON`].
pub fn collinear(a: Point2, b: Point2, c: Point2) -> bool {
    cross(a, b, c).abs() < EPSILON
}

/// Classify the turn at `b` (coming from `a`, continuing to `c`) as sharp.
///
/// `fwd_ratio` is the cotangent of the half-angle that still counts as
/// sharp: `fwd_ratio = 0.0` is the 90° case, larger values admit shallower
/// turns as sharp.
///
/// A reference point `f` is placed forward-and-sideways from `b` by
/// blending the incoming direction (weight `fwd_ratio`) with its normal
/// (weight 1), the normal chosen on the side of line `a`-`b` that `c`
/// falls on. The turn is sharp when `c` lies on that same side of line
/// `b`-`f`, i.e. has swung past the tilted boundary.
pub fn sharp_turn(a: Point2, b: Point2, c: Point2, fwd_ratio: f64) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx * dx + dy * dy < EPSILON {
        // No incoming direction to measure against.
        return false;
    }
    let left = ccw(a, b, c);
    let (nx, ny) = if left { (-dy, dx) } else { (dy, -dx) };
    let f = Point2::new(b.x + fwd_ratio * dx + nx, b.y + fwd_ratio * dy + ny);
    ccw(b, f, c) == left
}

/// True iff `p` (assumed collinear with segment `a`-`b`) lies within the
/// segment's bounding interval, within [`EPSILON`].
fn within_segment(p: Point2, a: Point2, b: Point2) -> bool {
    let (xmin, xmax) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
    let (ymin, ymax) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
    p.x >= xmin - EPSILON && p.x <= xmax + EPSILON && p.y >= ymin - EPSILON && p.y <= ymax + EPSILON
}

/// Intersect lines `a`-`b` and `c`-`d` via Cramer's rule.
///
/// `limit_ab` / `limit_cd` restrict the result to within segment `a`-`b` /
/// `c`-`d` respectively; a violated limit yields `None`.
///
/// When the determinant vanishes the lines are near-parallel: if they are
/// additionally collinear, the first of `c`, `d`, `a` lying within
/// segment `a`-`b` is returned, which makes overlapping collinear
/// segments intersect instead of silently missing each other.
pub fn intersect_lines(
    a: Point2,
    b: Point2,
    c: Point2,
    d: Point2,
    limit_ab: bool,
    limit_cd: bool,
) -> Option<Point2> {
    let rx = b.x - a.x;
    let ry = b.y - a.y;
    let sx = d.x - c.x;
    let sy = d.y - c.y;
    let det = rx * sy - ry * sx;
    if det.abs() < EPSILON {
        if !collinear(a, b, c) || !collinear(a, b, d) {
            return None;
        }
        for p in [c, d, a] {
            if within_segment(p, a, b) && (!limit_cd || within_segment(p, c, d)) {
                return Some(p);
            }
        }
        return None;
    }
    let qx = c.x - a.x;
    let qy = c.y - a.y;
    let t = (qx * sy - qy * sx) / det;
    let u = (qx * ry - qy * rx) / det;
    if limit_ab && !(-EPSILON..=1.0 + EPSILON).contains(&t) {
        return None;
    }
    if limit_cd && !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }
    Some(Point2::new(a.x + t * rx, a.y + t * ry))
}

/// Crossing of line/segment `a`-`b` with the vertical line `x = x0`.
///
/// Equivalent to [`intersect_lines`] with one segment fixed to the axis,
/// but cheaper. With `limit` set the crossing must fall within the
/// segment.
pub fn intersect_x(x0: f64, a: Point2, b: Point2, limit: bool) -> Option<Point2> {
    let dx = b.x - a.x;
    if dx.abs() < EPSILON {
        return None;
    }
    let t = (x0 - a.x) / dx;
    if limit && !(-EPSILON..=1.0 + EPSILON).contains(&t) {
        return None;
    }
    Some(Point2::new(x0, a.y + t * (b.y - a.y)))
}

/// Crossing of line/segment `a`-`b` with the horizontal line `y = y0`.
pub fn intersect_y(y0: f64, a: Point2, b: Point2, limit: bool) -> Option<Point2> {
    let dy = b.y - a.y;
    if dy.abs() < EPSILON {
        return None;
    }
    let t = (y0 - a.y) / dy;
    if limit && !(-EPSILON..=1.0 + EPSILON).contains(&t) {
        return None;
    }
    Some(Point2::new(a.x + t * (b.x - a.x), y0))
}
