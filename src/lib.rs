//! Line Instrument - draw lines, drop balls, make music
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, collisions, line modes, ticking)
//! - `persistence`: Resolution-independent scene snapshots for sharing
//! - `settings`: User preferences
//! - `audio` / `web`: Browser-side tone player and host facade (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod persistence;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use persistence::Snapshot;
pub use settings::Settings;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Downward acceleration added to every particle each tick (units/tick²)
    pub const GRAVITY: f32 = 0.0168;
    /// Fraction of velocity applied per tick when moving (limits tunneling, acts as drag)
    pub const STEP_DAMPING: f32 = 0.85;
    /// Vertical velocity kept after a bounce
    pub const BOUNCE_REDUCTION_FACTOR: f32 = 0.67;
    /// Speed cap after a reflection (units/tick)
    pub const MAX_SPEED: f32 = 5.0;

    /// Minimum time between two splits of the same lineage (ms)
    pub const SPLIT_COOLDOWN_MS: f64 = 200.0;
    /// Distance split children are pushed away from the contact point
    pub const SPLIT_OFFSET: f32 = 5.0;

    /// Spawn point height (x is always the playfield center)
    pub const SPAWN_Y: f32 = 10.0;
    /// Initial downward speed of a spawned particle
    pub const SPAWN_SPEED: f32 = 3.5;
    /// Default periodic drop rate (balls per second)
    pub const DEFAULT_DROP_RATE: f32 = 1.0;

    /// Rendered particle radius (draw surface hint only)
    pub const DOT_RADIUS: f32 = 4.0;

    /// Height of the control strip below the playfield
    pub const CONTROL_STRIP_HEIGHT: f32 = 50.0;
    /// Gap between the baseline and the control strip
    pub const BASELINE_MARGIN: f32 = 20.0;

    /// Reference length for pitch scaling: shorter lines sound higher
    pub const PITCH_REFERENCE_LENGTH: f32 = 200.0;
    /// Tone decay time (seconds)
    pub const TONE_DURATION_SECS: f32 = 1.0;
}

/// Clamp a point into the `[0, width] x [0, height]` playfield
#[inline]
pub fn clamp_point(p: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(p.x.clamp(0.0, width), p.y.clamp(0.0, height))
}
