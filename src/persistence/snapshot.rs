//! Normalized scene snapshot
//!
//! Field names follow the share format already in the wild (`lines`, `dots`,
//! `predrawnLine`, ...). Every field is optional on the way in: whatever is
//! missing keeps the scene's current value. Inside a record, `null` reads the
//! same as a missing field, since browsers write NaN as `null`.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use crate::sim::{BallColor, Line, LineMode, Particle, Scene};

/// A drawn line, coordinates in playfield fractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub x1: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y1: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub x2: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y2: f32,
    /// Stroke color, informational only (mode decides on restore)
    pub color: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: LineMode,
    #[serde(deserialize_with = "null_as_active")]
    pub is_active: bool,
}

impl Default for LineRecord {
    fn default() -> Self {
        Self {
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            color: None,
            mode: LineMode::Draw,
            is_active: true,
        }
    }
}

/// Ball velocity in playfield fractions per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub x: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f32,
}

/// A ball, position and velocity in playfield fractions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotRecord {
    #[serde(deserialize_with = "lenient_pair")]
    pub position: [f32; 2],
    #[serde(deserialize_with = "null_as_default")]
    pub velocity: VelocityRecord,
    #[serde(deserialize_with = "null_as_default")]
    pub color: BallColor,
}

/// The baseline, coordinates in playfield fractions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub x1: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y1: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub x2: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y2: f32,
    pub color: Option<String>,
}

/// Resolution-independent scene record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub lines: Option<Vec<LineRecord>>,
    pub current_ball_color: Option<BallColor>,
    pub drop_rate_value: Option<f32>,
    pub dots: Option<Vec<DotRecord>>,
    /// Absent means the baseline was erased
    pub predrawn_line: Option<BaselineRecord>,
    pub current_mode: Option<LineMode>,
    pub is_sound_on: Option<bool>,
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Lines are active unless a record says otherwise
fn null_as_active<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(de)?.unwrap_or(true))
}

/// `[x, y]` where the pair or either coordinate may be `null` (read as 0)
fn lenient_pair<'de, D: Deserializer<'de>>(de: D) -> Result<[f32; 2], D::Error> {
    let pair = Option::<[Option<f32>; 2]>::deserialize(de)?.unwrap_or_default();
    Ok(pair.map(|v| v.unwrap_or_default()))
}

/// Playfield size usable as a divisor
fn extent(scene: &Scene) -> Vec2 {
    let fix = |v: f32, axis: &str| {
        if v > 0.0 && v.is_finite() {
            v
        } else {
            log::warn!("Playfield {} is {}, normalizing against 1", axis, v);
            1.0
        }
    };
    Vec2::new(fix(scene.width, "width"), fix(scene.height, "height"))
}

impl Snapshot {
    /// Record the scene with coordinates divided by its playfield size
    pub fn capture(scene: &Scene) -> Self {
        let size = extent(scene);

        let lines = scene
            .lines
            .iter()
            .map(|line| {
                let a = line.start / size;
                let b = line.end / size;
                LineRecord {
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                    color: Some(line.mode.stroke_color().to_string()),
                    mode: line.mode,
                    is_active: line.is_active,
                }
            })
            .collect();

        let dots = scene
            .particles
            .iter()
            .map(|p| {
                let pos = p.pos / size;
                let vel = p.vel / size;
                DotRecord {
                    position: [pos.x, pos.y],
                    velocity: VelocityRecord { x: vel.x, y: vel.y },
                    color: p.color,
                }
            })
            .collect();

        let predrawn_line = scene.baseline.as_ref().map(|line| {
            let a = line.start / size;
            let b = line.end / size;
            BaselineRecord {
                x1: a.x,
                y1: a.y,
                x2: b.x,
                y2: b.y,
                color: Some(line.mode.stroke_color().to_string()),
            }
        });

        Self {
            lines: Some(lines),
            current_ball_color: Some(scene.current_color),
            drop_rate_value: Some(scene.drop_rate()),
            dots: Some(dots),
            predrawn_line,
            current_mode: Some(scene.current_mode),
            is_sound_on: Some(scene.sound_on),
        }
    }

    /// Apply the snapshot to `scene`, scaling by its current playfield size
    ///
    /// Missing fields leave the scene's value alone, except the baseline: no
    /// baseline in the snapshot means no baseline in the scene. Restored balls
    /// get fresh IDs, their color's scale and no split cooldown.
    pub fn restore_into(&self, scene: &mut Scene) {
        let size = Vec2::new(scene.width, scene.height);

        if let Some(lines) = &self.lines {
            scene.lines = lines
                .iter()
                .map(|r| Line {
                    start: Vec2::new(r.x1, r.y1) * size,
                    end: Vec2::new(r.x2, r.y2) * size,
                    mode: r.mode,
                    is_active: r.is_active,
                })
                .collect();
        }

        if let Some(color) = self.current_ball_color {
            scene.current_color = color;
        }

        if let Some(rate) = self.drop_rate_value {
            scene.set_drop_rate(rate);
        }

        if let Some(dots) = &self.dots {
            let mut particles = Vec::with_capacity(dots.len());
            for r in dots {
                let id = scene.next_entity_id();
                particles.push(Particle::new(
                    id,
                    Vec2::from(r.position) * size,
                    Vec2::new(r.velocity.x, r.velocity.y) * size,
                    r.color,
                ));
            }
            scene.particles = particles;
        }

        scene.baseline = self.predrawn_line.as_ref().map(|r| {
            Line::new(
                Vec2::new(r.x1, r.y1) * size,
                Vec2::new(r.x2, r.y2) * size,
                LineMode::Draw,
            )
        });

        if let Some(mode) = self.current_mode {
            scene.current_mode = mode;
        }

        if let Some(on) = self.is_sound_on {
            scene.sound_on = on;
        }

        log::info!(
            "Restored scene: {} lines, {} balls, baseline {}",
            scene.lines.len(),
            scene.particles.len(),
            if scene.baseline.is_some() { "present" } else { "absent" }
        );
    }

    /// Build a fresh `width` x `height` scene from the snapshot
    pub fn restore(&self, width: f32, height: f32) -> Scene {
        let mut scene = Scene::new(width, height);
        self.restore_into(&mut scene);
        scene
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
