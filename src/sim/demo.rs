//! Seeded demo scenes
//!
//! Scatters random lines across the playfield so headless runs have something
//! to bounce off. Same seed, same scene.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{LineMode, Scene};

/// Modes the demo draws, weighted toward plain sounding lines
const DEMO_MODES: [LineMode; 8] = [
    LineMode::Draw,
    LineMode::Draw,
    LineMode::Draw,
    LineMode::Silent,
    LineMode::Toggle,
    LineMode::Toggle,
    LineMode::Splitter,
    LineMode::Burner,
];

/// Shortest and longest demo line
const MIN_LENGTH: f32 = 40.0;
const MAX_LENGTH: f32 = 220.0;

/// Add `count` random lines to the scene, returning how many were stored
pub fn scatter_lines(scene: &mut Scene, seed: u64, count: usize) -> usize {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut stored = 0;

    for _ in 0..count {
        // Keep clear of the spawn point at the top
        let center = Vec2::new(
            rng.random_range(0.0..=scene.width),
            rng.random_range(scene.height * 0.15..=scene.height * 0.85),
        );
        let angle = rng.random_range(-0.6f32..=0.6);
        let half = rng.random_range(MIN_LENGTH..=MAX_LENGTH) / 2.0;
        let offset = Vec2::from_angle(angle) * half;
        let mode = DEMO_MODES[rng.random_range(0..DEMO_MODES.len())];

        if scene.add_line(center - offset, center + offset, mode).is_some() {
            stored += 1;
        }
    }

    log::info!("Scattered {} demo lines (seed {})", stored, seed);
    stored
}
