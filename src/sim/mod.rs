//! Deterministic simulation module
//!
//! All physics and line-mode logic lives here. This module must stay pure:
//! - Time only advances through `tick`
//! - Seeded RNG only (demo scenes)
//! - Stable iteration order (drawing order, baseline last)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod demo;
pub mod geometry;
pub mod state;
pub mod tick;
pub mod tone;

pub use collision::{Collision, bounce_velocity, find_earliest_collision, reflect_velocity};
pub use geometry::{SweepHit, dot, magnitude, segment_sweep_intersect, unit_vector};
pub use state::{BallColor, Line, LineMode, LineRef, Particle, Scene};
pub use tick::{TickStats, tick};
pub use tone::{Tone, TonePlayer, ToneScale, collision_frequency, scale_for};
