//! Collision tones
//!
//! Each ball color carries an 8-note scale. When a ball strikes a sounding
//! line, the line's orientation picks the note and its length bends the pitch.
//! Actual synthesis is someone else's job: the simulation only hands a [`Tone`]
//! to a [`TonePlayer`] and moves on.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::geometry::magnitude;
use super::state::BallColor;
use crate::consts::{PITCH_REFERENCE_LENGTH, TONE_DURATION_SECS};

/// An ordered set of 8 frequencies (Hz)
pub type ToneScale = [f32; 8];

/// A minor, A3..A4
pub const SCALE_A_MINOR: ToneScale = [
    220.00, 246.94, 261.63, 293.66, 329.63, 349.23, 392.00, 440.00,
];
/// C major, C4..C5
pub const SCALE_C_MAJOR: ToneScale = [
    261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88, 523.25,
];
/// E minor, E3..F4
pub const SCALE_E_MINOR: ToneScale = [
    164.81, 185.00, 196.00, 220.00, 246.94, 293.66, 329.63, 349.23,
];
/// G major, G3..G4
pub const SCALE_G_MAJOR: ToneScale = [
    196.00, 220.00, 246.94, 261.63, 293.66, 329.63, 369.99, 392.00,
];

/// Scale assigned to a ball of the given color
pub fn scale_for(color: BallColor) -> ToneScale {
    match color {
        BallColor::Black => SCALE_A_MINOR,
        BallColor::Red => SCALE_C_MAJOR,
        BallColor::Green => SCALE_E_MINOR,
        BallColor::Blue => SCALE_G_MAJOR,
    }
}

/// A request to sound one note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    /// Scale the note was picked from
    pub scale: ToneScale,
    /// How long the note should ring (seconds)
    pub duration_secs: f32,
}

/// Receiver of collision tones
///
/// Implementations must not block; the simulation calls this mid-tick.
pub trait TonePlayer {
    fn play_tone(&mut self, tone: Tone);
}

/// Discards every tone
impl TonePlayer for () {
    fn play_tone(&mut self, _tone: Tone) {}
}

/// Collects tones, handy for headless drivers and tests
impl TonePlayer for Vec<Tone> {
    fn play_tone(&mut self, tone: Tone) {
        self.push(tone);
    }
}

/// Pick the frequency for a ball of scale `scale` hitting a line along `dir`
///
/// The line angle, mapped from `[-π, π]` onto `[0, 1]`, selects the note;
/// `200 / length` clamped to `[0.5, 2]` scales it.
pub fn collision_frequency(scale: &ToneScale, dir: Vec2) -> f32 {
    let angle = dir.y.atan2(dir.x);
    let normalized = (angle + PI) / TAU;
    let index = (normalized * scale.len() as f32).floor() as usize % scale.len();

    let length_factor = (PITCH_REFERENCE_LENGTH / magnitude(dir)).clamp(0.5, 2.0);
    scale[index] * length_factor
}

/// Build the tone for a collision
pub fn collision_tone(scale: &ToneScale, dir: Vec2) -> Tone {
    Tone {
        frequency_hz: collision_frequency(scale, dir),
        scale: *scale,
        duration_secs: TONE_DURATION_SECS,
    }
}
