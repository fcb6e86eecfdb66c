//! Circular arcs defined by three points.

use std::f64::consts::TAU;

use glam::DVec3;
use super::EPSILON;

/// Result of fitting a circle through three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleFit {
    Circle { center: DVec3, radius: f64 },
    /// Coincident or collinear input.
    Degenerate,
}

impl CircleFit {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, CircleFit::Degenerate)
    }
}

/// Which side of the chord the centre lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcSide {
    Left,
    Right,
}

impl ArcSide {
    fn sign(self) -> f64 {
        match self {
            ArcSide::Left => 1.0,
            ArcSide::Right => -1.0,
        }
    }
}

/// Circumcircle of triangle ABC via barycentric weights.
pub fn circle_through_three_points(a: DVec3, b: DVec3, c: DVec3) -> CircleFit {
    // Side lengths opposite each vertex.
    let la = b.distance(c);
    let lb = a.distance(c);
    let lc = a.distance(b);
    if la < EPSILON || lb < EPSILON || lc < EPSILON {
        return CircleFit::Degenerate;
    }

    let area = 0.5 * (b - a).cross(c - a).length();
    if area < EPSILON {
        return CircleFit::Degenerate;
    }

    let (a2, b2, c2) = (la * la, lb * lb, lc * lc);
    let wa = a2 * (b2 + c2 - a2);
    let wb = b2 * (a2 + c2 - b2);
    let wc = c2 * (a2 + b2 - c2);
    let denom = wa + wb + wc;
    if denom.abs() < EPSILON {
        return CircleFit::Degenerate;
    }

    CircleFit::Circle {
        center: (wa * a + wb * b + wc * c) / denom,
        radius: la * lb * lc / (4.0 * area),
    }
}

/// Signed sweep from the angle of A to the angle of C that passes
/// through the angle of B.
fn sweep_through(angle_a: f64, angle_b: f64, angle_c: f64) -> f64 {
    let to_b = (angle_b - angle_a).rem_euclid(TAU);
    let to_c = (angle_c - angle_a).rem_euclid(TAU);
    if to_b < to_c { to_c } else { to_c - TAU }
}

/// Sample `segments + 1` points along the arc from A through B to C.
///
/// The circle is fitted in the XY projection and z is interpolated
/// linearly from A to C, so helical arcs between layers work. Arcs that
/// are vertical (degenerate in XY) are swept in their own plane. With no
/// circle at all the result is the straight line `[A, C]`.
pub fn arc_points(a: DVec3, b: DVec3, c: DVec3, segments: usize) -> Vec<DVec3> {
    let segments = segments.max(1);
    let flat = |p: DVec3| DVec3::new(p.x, p.y, 0.0);

    let mut points = match circle_through_three_points(flat(a), flat(b), flat(c)) {
        CircleFit::Circle { center, radius } => {
            let angle = |p: DVec3| (p.y - center.y).atan2(p.x - center.x);
            let start = angle(a);
            let sweep = sweep_through(start, angle(b), angle(c));
            (0..=segments)
                .map(|i| {
                    let t = i as f64 / segments as f64;
                    let theta = start + t * sweep;
                    DVec3::new(
                        center.x + radius * theta.cos(),
                        center.y + radius * theta.sin(),
                        a.z + t * (c.z - a.z),
                    )
                })
                .collect::<Vec<_>>()
        }
        CircleFit::Degenerate => match circle_through_three_points(a, b, c) {
            CircleFit::Circle { center, radius } => in_plane_sweep(a, b, c, center, radius, segments),
            CircleFit::Degenerate => return vec![a, c],
        },
    };

    if let Some(first) = points.first_mut() {
        *first = a;
    }
    if let Some(last) = points.last_mut() {
        *last = c;
    }
    points
}

fn in_plane_sweep(a: DVec3, b: DVec3, c: DVec3, center: DVec3, radius: f64, segments: usize) -> Vec<DVec3> {
    let normal = (b - a).cross(c - a).normalize();
    let u = (a - center).normalize();
    let v = normal.cross(u);
    let angle = |p: DVec3| {
        let d = p - center;
        d.dot(v).atan2(d.dot(u))
    };
    let sweep = sweep_through(0.0, angle(b), angle(c));
    (0..=segments)
        .map(|i| {
            let theta = sweep * i as f64 / segments as f64;
            center + radius * (theta.cos() * u + theta.sin() * v)
        })
        .collect()
}

/// Centre of a circle of `radius` through `p1` and `p2`, on the chosen
/// side of the chord (perpendicular taken in the XY plane). `None` if
/// the chord is degenerate or the radius is shorter than half the chord.
pub fn arc_center_from_radius(p1: DVec3, p2: DVec3, radius: f64, side: ArcSide) -> Option<DVec3> {
    let chord = p2 - p1;
    let chord_len = chord.length();
    if chord_len < EPSILON || radius < chord_len / 2.0 {
        return None;
    }

    let offset = (radius * radius - (chord_len / 2.0).powi(2)).sqrt();
    let perp = DVec3::new(-chord.y, chord.x, 0.0);
    let perp = if perp.length() < EPSILON { DVec3::X } else { perp.normalize() };

    Some((p1 + p2) / 2.0 + side.sign() * offset * perp)
}

/// Point on the shorter arc from `p1` to `p2` around `center`, halfway
/// in angle. z is the mean of the endpoints.
pub fn arc_midpoint(p1: DVec3, p2: DVec3, center: DVec3) -> DVec3 {
    let v1 = p1 - center;
    let v2 = p2 - center;
    let a1 = v1.y.atan2(v1.x);
    let a2 = v2.y.atan2(v2.x);

    let mut diff = (a2 - a1).rem_euclid(TAU);
    if diff > std::f64::consts::PI {
        diff -= TAU;
    }
    let mid = a1 + diff / 2.0;
    let r = DVec3::new(v1.x, v1.y, 0.0).length();

    DVec3::new(
        center.x + r * mid.cos(),
        center.y + r * mid.sin(),
        (p1.z + p2.z) / 2.0,
    )
}
