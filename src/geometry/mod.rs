//! # Geometry Kernel
//!
//! Pure, stateless curve evaluators used to preview edges and to size
//! blocks. Nothing here touches the registry.
//!
//! | Function | Curve |
//! |----------|-------|
//! | [`arc_points`] | circular arc through three points |
//! | [`catmull_rom_spline`] | Catmull-Rom through N control points |
//! | [`polyline_points`] | control points, unchanged |
//! | [`line_points`] | straight segment |

pub mod arc;
pub mod spline;

pub use glam::DVec3;

pub use arc::{
    arc_center_from_radius, arc_midpoint, arc_points, circle_through_three_points,
    ArcSide, CircleFit,
};
pub use spline::catmull_rom_spline;

/// Tolerance for degeneracy tests (coincident points, zero area).
pub const EPSILON: f64 = 1e-10;

/// A straight segment: just its two ends.
pub fn line_points(a: DVec3, b: DVec3) -> Vec<DVec3> {
    vec![a, b]
}

/// Polylines are drawn through their control points as given.
pub fn polyline_points(control_points: &[DVec3]) -> Vec<DVec3> {
    control_points.to_vec()
}

/// Unit normal of a quad from the cross product of its diagonals.
/// `None` for a degenerate (zero-area) quad.
pub fn quad_normal(quad: &[DVec3; 4]) -> Option<DVec3> {
    let n = (quad[2] - quad[0]).cross(quad[3] - quad[1]);
    let len = n.length();
    if len < EPSILON { None } else { Some(n / len) }
}

/// Mean edge length of a hex along each local axis, following the
/// vertex convention (x: 0-1, 3-2, 4-5, 7-6; y: 1-2, 0-3, 5-6, 4-7;
/// z: the four verticals).
pub fn hex_axis_lengths(v: &[DVec3; 8]) -> [f64; 3] {
    const AXES: [[(usize, usize); 4]; 3] = [
        [(0, 1), (3, 2), (4, 5), (7, 6)],
        [(1, 2), (0, 3), (5, 6), (4, 7)],
        [(0, 4), (1, 5), (2, 6), (3, 7)],
    ];
    AXES.map(|edges| edges.iter().map(|&(i, j)| v[i].distance(v[j])).sum::<f64>() / 4.0)
}
