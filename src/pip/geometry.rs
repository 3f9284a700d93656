//! Segment primitives for the ray-casting containment test.
//!
//! Coordinates are treated as planar (lon = x, lat = y); no projection is
//! applied. All functions are total over finite inputs.

/// Absolute tolerance when checking that a point lies on a segment's line.
pub const ON_LINE_TOLERANCE: f64 = 1e-9;

fn sorted(a: f64, b: f64) -> (f64, f64) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn close_enough(a: f64, b: f64) -> bool {
    a.max(b) - a.min(b) < ON_LINE_TOLERANCE
}

/// Whether `(px, py)` lies on the segment `(ax, ay)-(bx, by)`.
///
/// Vertical segments require an exact x match. Otherwise the point's y must
/// be within [`ON_LINE_TOLERANCE`] of the segment's line at `px`. Both
/// variants are inclusive of the endpoints.
pub fn point_on_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    if ax == bx {
        let (min_y, max_y) = sorted(ay, by);
        return px == ax && min_y <= py && py <= max_y;
    }

    let m = (by - ay) / (bx - ax);
    let (min_x, max_x) = sorted(ax, bx);
    close_enough(m * (px - ax) + ay, py) && min_x <= px && px <= max_x
}

/// Whether a horizontal ray cast from `(px, py)` toward +x crosses the
/// segment `(ax, ay)-(bx, by)`.
///
/// A point lying exactly on a horizontal segment (left of or on its right
/// end) counts as a crossing, as does any touch of a segment endpoint.
/// Boundary points therefore lean toward "inside" but are not guaranteed to.
pub fn ray_crosses_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    // Vertical (or zero-length) segment: the ray hits it iff it lies to the
    // right and spans py.
    if ax == bx {
        let (min_y, max_y) = sorted(ay, by);
        return ax >= px && min_y <= py && py <= max_y;
    }

    let m = (by - ay) / (bx - ax);
    if m == 0.0 {
        let (_, max_x) = sorted(ax, bx);
        return py == ay && px <= max_x;
    }

    // y = m*x + n
    let n = ay - m * ax;
    let x = (py - n) / m;

    // The intersection lies on the segment and on the half-line x >= px.
    point_on_segment(x, py, ax, ay, bx, by) && x >= px
}
