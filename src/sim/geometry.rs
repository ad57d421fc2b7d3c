//! Vector helpers and exact segment intersection
//!
//! Everything collision-related reduces to one question: does the straight path
//! a particle takes this tick cross a line segment, and how far along the path?
//! That is a 2x2 linear solve, no iteration needed.

use glam::Vec2;

/// Euclidean length of a vector
#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    v.x.hypot(v.y)
}

/// Normalize `v`, returning zero (and warning) for a zero-length input
pub fn unit_vector(v: Vec2) -> Vec2 {
    let mag = magnitude(v);
    if mag == 0.0 {
        log::warn!("Attempted to normalize a zero-length vector, using (0, 0)");
        return Vec2::ZERO;
    }
    v / mag
}

/// Standard dot product
#[inline]
pub fn dot(v1: Vec2, v2: Vec2) -> f32 {
    v1.x * v2.x + v1.y * v2.y
}

/// Where a swept path crossed a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Crossing point in canvas space
    pub point: Vec2,
    /// Fraction of the path travelled before the crossing, in `[0, 1]`
    pub t: f32,
}

/// Intersect the path `p1 -> p2` with the segment `a -> b`
///
/// Solves `p1 + t(p2 - p1) = a + s(b - a)` and reports a hit only when both
/// `t` and `s` lie in `[0, 1]`. Parallel inputs (including zero-length path or
/// segment) have a zero determinant and never hit.
pub fn segment_sweep_intersect(p1: Vec2, p2: Vec2, a: Vec2, b: Vec2) -> Option<SweepHit> {
    let path = p2 - p1;
    let seg = b - a;
    let det = -seg.x * path.y + path.x * seg.y;
    if det == 0.0 {
        return None;
    }

    let rel = p1 - a;
    let s = (-path.y * rel.x + path.x * rel.y) / det;
    let t = (seg.x * rel.y - seg.y * rel.x) / det;

    // NaN fails both range checks
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(SweepHit {
            point: p1 + path * t,
            t,
        })
    } else {
        None
    }
}

/// Whether two segments cross or touch (parallel segments never do)
#[inline]
pub fn segments_cross(a1: Vec2, b1: Vec2, a2: Vec2, b2: Vec2) -> bool {
    segment_sweep_intersect(a1, b1, a2, b2).is_some()
}
