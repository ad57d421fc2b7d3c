//! Collision detection and response for line obstacles
//!
//! Detection is continuous: the straight path a particle would take this tick
//! is intersected with every obstacle and the earliest crossing wins.
//! Response is specular reflection about the line normal, with extra energy
//! loss on the vertical axis and a speed cap.

use glam::Vec2;
use std::f32::consts::FRAC_PI_4;

use super::geometry::{dot, magnitude, segment_sweep_intersect, unit_vector};
use super::state::{Line, LineRef};
use crate::consts::{BOUNCE_REDUCTION_FACTOR, MAX_SPEED};

/// Earliest obstacle crossed by a particle path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub line: LineRef,
    /// Contact point in canvas space
    pub point: Vec2,
    /// Fraction of the path travelled before contact
    pub t: f32,
}

/// Find the first obstacle crossed on the way from `from` to `to`
///
/// Among equal `t`, the obstacle yielded first wins. Contact exactly at `to`
/// (`t == 1`) is left for the next step, which starts on the line and resolves
/// it at `t == 0`.
pub fn find_earliest_collision<'a, I>(from: Vec2, to: Vec2, obstacles: I) -> Option<Collision>
where
    I: IntoIterator<Item = (LineRef, &'a Line)>,
{
    let mut earliest: Option<Collision> = None;
    for (line_ref, line) in obstacles {
        let Some(hit) = segment_sweep_intersect(from, to, line.start, line.end) else {
            continue;
        };
        if hit.t >= 1.0 {
            continue;
        }
        if earliest.is_none_or(|best| hit.t < best.t) {
            earliest = Some(Collision {
                line: line_ref,
                point: hit.point,
                t: hit.t,
            });
        }
    }
    earliest
}

/// Unit normal of a line direction (direction rotated 90°)
#[inline]
pub fn line_normal(dir: Vec2) -> Vec2 {
    unit_vector(Vec2::new(-dir.y, dir.x))
}

/// Reflect velocity off a line with direction `dir`
///
/// Standard reflection: v' = v - 2(v·n)n. A zero-length line leaves the
/// velocity unchanged.
pub fn reflect_velocity(velocity: Vec2, dir: Vec2) -> Vec2 {
    if magnitude(dir) == 0.0 {
        return velocity;
    }
    let normal = line_normal(dir);
    velocity - 2.0 * dot(velocity, normal) * normal
}

/// Scale `v` down uniformly so its length is at most `max`
#[inline]
pub fn clamp_speed(v: Vec2, max: f32) -> Vec2 {
    let speed = magnitude(v);
    if speed > max { v / speed * max } else { v }
}

/// Velocity after bouncing off a line
///
/// Reflects, damps the vertical component and caps the speed.
pub fn bounce_velocity(velocity: Vec2, dir: Vec2) -> Vec2 {
    if magnitude(dir) == 0.0 {
        return velocity;
    }
    let mut v = reflect_velocity(velocity, dir);
    v.y *= BOUNCE_REDUCTION_FACTOR;
    clamp_speed(v, MAX_SPEED)
}

/// Headings of the two children of a split: the reflected velocity turned ±45°
pub fn split_velocities(reflected: Vec2) -> [Vec2; 2] {
    [
        Vec2::from_angle(FRAC_PI_4).rotate(reflected),
        Vec2::from_angle(-FRAC_PI_4).rotate(reflected),
    ]
}
