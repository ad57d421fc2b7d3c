//! Scene state and core simulation types
//!
//! The scene exclusively owns every particle and line. Renderers and the
//! snapshot serializer only read it between ticks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{magnitude, segments_cross};
use super::tone::{ToneScale, scale_for};
use crate::clamp_point;
use crate::consts::*;

/// Ball color; selects the tone scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BallColor {
    #[default]
    Black,
    Red,
    Green,
    Blue,
}

impl BallColor {
    pub const ALL: [BallColor; 4] = [
        BallColor::Black,
        BallColor::Red,
        BallColor::Green,
        BallColor::Blue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BallColor::Black => "black",
            BallColor::Red => "red",
            BallColor::Green => "green",
            BallColor::Blue => "blue",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "black" => Some(BallColor::Black),
            "red" => Some(BallColor::Red),
            "green" => Some(BallColor::Green),
            "blue" => Some(BallColor::Blue),
            _ => None,
        }
    }
}

impl From<String> for BallColor {
    fn from(s: String) -> Self {
        BallColor::from_name(&s).unwrap_or_else(|| {
            log::warn!("Unknown ball color {:?}, using black", s);
            BallColor::Black
        })
    }
}

impl From<BallColor> for String {
    fn from(color: BallColor) -> Self {
        color.as_str().to_string()
    }
}

/// How a line treats the balls that hit it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineMode {
    /// Reflect and sound
    #[default]
    Draw,
    /// Removes the lines it crosses; never stored itself
    Erase,
    /// Flips active on every hit; passes the ball when it just became active
    Toggle,
    /// Reflect without sound
    Silent,
    /// Destroys the ball
    Burner,
    /// Replaces the ball with two children
    Splitter,
}

impl LineMode {
    pub const ALL: [LineMode; 6] = [
        LineMode::Draw,
        LineMode::Erase,
        LineMode::Toggle,
        LineMode::Silent,
        LineMode::Burner,
        LineMode::Splitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineMode::Draw => "draw",
            LineMode::Erase => "erase",
            LineMode::Toggle => "toggle",
            LineMode::Silent => "silent",
            LineMode::Burner => "burner",
            LineMode::Splitter => "splitter",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draw" => Some(LineMode::Draw),
            "erase" => Some(LineMode::Erase),
            "toggle" => Some(LineMode::Toggle),
            "silent" => Some(LineMode::Silent),
            "burner" => Some(LineMode::Burner),
            "splitter" => Some(LineMode::Splitter),
            _ => None,
        }
    }

    /// Stroke color the draw surface uses for this mode
    pub fn stroke_color(&self) -> &'static str {
        match self {
            LineMode::Draw | LineMode::Toggle => "black",
            LineMode::Erase => "red",
            LineMode::Silent => "darkgray",
            LineMode::Burner => "darkred",
            LineMode::Splitter => "magenta",
        }
    }
}

impl From<String> for LineMode {
    fn from(s: String) -> Self {
        LineMode::from_name(&s).unwrap_or_else(|| {
            log::warn!("Unknown line mode {:?}, treating as draw", s);
            LineMode::Draw
        })
    }
}

impl From<LineMode> for String {
    fn from(mode: LineMode) -> Self {
        mode.as_str().to_string()
    }
}

/// A falling ball
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: BallColor,
    /// Notes this ball plays, fixed by its color at spawn
    pub scale: ToneScale,
    /// Multiplier on gravity (always 1 for now)
    pub gravity_modifier: f32,
    /// Clock time of the split that produced this ball; `None` allows an immediate split
    pub last_split_at: Option<f64>,
}

impl Particle {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, color: BallColor) -> Self {
        Self {
            id,
            pos,
            vel,
            color,
            scale: scale_for(color),
            gravity_modifier: 1.0,
            last_split_at: None,
        }
    }

    /// Whether enough time has passed since the last split
    pub fn can_split(&self, now_ms: f64) -> bool {
        match self.last_split_at {
            None => true,
            Some(at) => now_ms - at >= SPLIT_COOLDOWN_MS,
        }
    }
}

/// A line segment obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub start: Vec2,
    pub end: Vec2,
    pub mode: LineMode,
    /// Only meaningful for toggle lines
    pub is_active: bool,
}

impl Line {
    pub fn new(start: Vec2, end: Vec2, mode: LineMode) -> Self {
        Self {
            start,
            end,
            mode,
            is_active: true,
        }
    }

    /// Direction from start to end (not normalized)
    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f32 {
        magnitude(self.dir())
    }

    pub fn crosses(&self, other: &Line) -> bool {
        segments_cross(self.start, self.end, other.start, other.end)
    }
}

/// Identifies one obstacle in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRef {
    /// Index into `Scene::lines`
    Drawn(usize),
    /// The baseline near the bottom
    Baseline,
}

/// Complete scene: playfield, obstacles, particles, clocks and scalar settings
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    /// Live particles in spawn order
    pub particles: Vec<Particle>,
    /// User-drawn lines in drawing order
    pub lines: Vec<Line>,
    /// Starter line near the bottom; gone once erased
    pub baseline: Option<Line>,
    /// Color for new balls
    pub current_color: BallColor,
    /// Mode for newly drawn lines
    pub current_mode: LineMode,
    /// Sounds only play when on
    pub sound_on: bool,
    /// Balls per second; 0 means manual spawning only
    drop_rate: f32,
    /// Simulation clock (ms), advanced only by ticks
    pub clock_ms: f64,
    /// Clock time of the last periodic spawn
    pub last_spawn_ms: f64,
    next_id: u32,
}

impl Scene {
    /// Create an empty scene with a baseline
    pub fn new(width: f32, height: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            width,
            height,
            particles: Vec::new(),
            lines: Vec::new(),
            baseline: Some(Self::baseline_for(width, height)),
            current_color: BallColor::default(),
            current_mode: LineMode::default(),
            sound_on: false,
            drop_rate: DEFAULT_DROP_RATE,
            clock_ms: 0.0,
            last_spawn_ms: 0.0,
            next_id: 1,
        }
    }

    /// Baseline geometry for a playfield, just above the control strip
    pub fn baseline_for(width: f32, height: f32) -> Line {
        let lift = CONTROL_STRIP_HEIGHT + BASELINE_MARGIN;
        Line::new(
            Vec2::new(width * 0.1, height - lift),
            Vec2::new(width * 0.9, height * 0.96 - lift),
            LineMode::Draw,
        )
    }

    /// Change playfield size and put the baseline back in place
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.baseline = Some(Self::baseline_for(self.width, self.height));
        log::info!("Playfield resized to {}x{}", self.width, self.height);
    }

    /// Allocate a new particle ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn drop_rate(&self) -> f32 {
        self.drop_rate
    }

    /// Set balls per second; anything not positive and finite means manual
    pub fn set_drop_rate(&mut self, rate: f32) {
        self.drop_rate = if rate.is_finite() && rate > 0.0 { rate } else { 0.0 };
    }

    /// Time between periodic spawns, `None` in manual mode
    pub fn spawn_interval_ms(&self) -> Option<f64> {
        if self.drop_rate > 0.0 {
            Some(1000.0 / self.drop_rate as f64)
        } else {
            None
        }
    }

    /// Drop a ball from the top center; uses the current color when none given
    pub fn spawn_particle(&mut self, color: Option<BallColor>) -> u32 {
        let id = self.next_entity_id();
        let color = color.unwrap_or(self.current_color);
        self.particles.push(Particle::new(
            id,
            Vec2::new(self.width / 2.0, SPAWN_Y),
            Vec2::new(0.0, SPAWN_SPEED),
            color,
        ));
        id
    }

    /// Add a line drawn from `start` to `end` in `mode`
    ///
    /// Endpoints are clamped to the playfield and zero-length lines are
    /// dropped. Erase lines are not stored; they remove every line they cross
    /// instead. Returns the stored line's index, if one was stored.
    pub fn add_line(&mut self, start: Vec2, end: Vec2, mode: LineMode) -> Option<usize> {
        let start = clamp_point(start, self.width, self.height);
        let end = clamp_point(end, self.width, self.height);
        if start == end {
            return None;
        }

        let line = Line::new(start, end, mode);
        if mode == LineMode::Erase {
            self.erase_lines(&line);
            return None;
        }
        self.lines.push(line);
        Some(self.lines.len() - 1)
    }

    /// Remove every line, baseline included, that `eraser` crosses
    pub fn erase_lines(&mut self, eraser: &Line) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| !line.crosses(eraser));
        let mut removed = before - self.lines.len();

        if self.baseline.as_ref().is_some_and(|b| b.crosses(eraser)) {
            self.baseline = None;
            removed += 1;
            log::debug!("Baseline erased");
        }
        if removed > 0 {
            log::debug!("Erased {} line(s)", removed);
        }
        removed
    }

    /// Every obstacle a particle can hit: drawn lines first, then the baseline
    pub fn obstacles(&self) -> impl Iterator<Item = (LineRef, &Line)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (LineRef::Drawn(i), line))
            .chain(self.baseline.iter().map(|line| (LineRef::Baseline, line)))
    }

    pub fn line_mut(&mut self, r: LineRef) -> Option<&mut Line> {
        match r {
            LineRef::Drawn(i) => self.lines.get_mut(i),
            LineRef::Baseline => self.baseline.as_mut(),
        }
    }

    /// Whether a position has left the playfield (above the top is still in)
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        pos.x < 0.0 || pos.x > self.width || pos.y > self.height
    }
}
