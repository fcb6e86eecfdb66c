//! Uniform Catmull-Rom splines.

use glam::DVec3;
use super::EPSILON;

/// Sample a Catmull-Rom spline passing through every control point.
///
/// The first and last control points double as their own tangent
/// anchors. Each span yields `segments_per_span + 1` samples; samples
/// closer than [`EPSILON`] to their predecessor (span joints, repeated
/// control points) are dropped. Two control points give a straight line.
pub fn catmull_rom_spline(control_points: &[DVec3], segments_per_span: usize) -> Vec<DVec3> {
    let n = control_points.len();
    if n <= 2 {
        return control_points.to_vec();
    }
    let segments = segments_per_span.max(1);

    let mut samples = Vec::with_capacity((n - 1) * (segments + 1));
    for i in 0..n - 1 {
        let p0 = control_points[i.saturating_sub(1)];
        let p1 = control_points[i];
        let p2 = control_points[i + 1];
        let p3 = control_points[(i + 2).min(n - 1)];

        for j in 0..=segments {
            let t = j as f64 / segments as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let p = 0.5
                * (2.0 * p1
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3);
            samples.push(p);
        }
    }

    let mut out: Vec<DVec3> = Vec::with_capacity(samples.len());
    for p in samples {
        match out.last() {
            Some(prev) if prev.distance(p) < EPSILON => {}
            _ => out.push(p),
        }
    }
    out
}
