//! Browser host facade
//!
//! The page owns the canvas, widgets and pointer events; this wrapper owns the
//! scene. Geometry crosses the boundary as flat `Float32Array`s once per frame
//! so the draw surface never touches simulation state directly.

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::consts::DOT_RADIUS;
use crate::persistence::Snapshot;
use crate::settings::Settings;
use crate::sim::{BallColor, LineMode, Scene, tick};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Line Instrument starting...");
}

/// One instrument bound to one canvas
#[wasm_bindgen]
pub struct WebInstrument {
    scene: Scene,
    audio: AudioManager,
    settings: Settings,
}

#[wasm_bindgen]
impl WebInstrument {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        let settings = Settings::load();
        let mut scene = Scene::new(width, height);
        settings.apply_to(&mut scene);

        let mut audio = AudioManager::new();
        audio.set_master_volume(settings.master_volume);

        Self {
            scene,
            audio,
            settings,
        }
    }

    /// Advance one animation frame; returns the live ball count
    pub fn tick(&mut self, dt_ms: f64) -> u32 {
        let stats = tick(&mut self.scene, dt_ms, &mut self.audio);
        if stats.split > 0 || stats.burned > 0 {
            log::debug!("Tick: {:?}", stats);
        }
        self.scene.particles.len() as u32
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.scene.resize(width, height);
    }

    /// Finish a line drawn with the current mode; false if nothing was stored
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        let mode = self.scene.current_mode;
        self.scene
            .add_line(glam::Vec2::new(x1, y1), glam::Vec2::new(x2, y2), mode)
            .is_some()
    }

    /// Drop one ball now, in `color` or the current color
    pub fn drop_ball(&mut self, color: Option<String>) {
        let color = color.as_deref().and_then(BallColor::from_name);
        self.scene.spawn_particle(color);
    }

    pub fn set_mode(&mut self, mode: &str) {
        self.scene.current_mode = LineMode::from(mode.to_string());
        self.persist();
    }

    pub fn set_ball_color(&mut self, color: &str) {
        self.scene.current_color = BallColor::from(color.to_string());
        self.persist();
    }

    pub fn set_drop_rate(&mut self, rate: f32) {
        self.scene.set_drop_rate(rate);
        self.persist();
    }

    pub fn set_sound(&mut self, on: bool) {
        self.scene.sound_on = on;
        if on {
            self.audio.resume();
        } else {
            self.audio.suspend();
        }
        self.persist();
    }

    pub fn set_volume(&mut self, vol: f32) {
        self.settings.set_master_volume(vol);
        self.audio.set_master_volume(self.settings.master_volume);
        self.persist();
    }

    /// Window lost or regained focus
    pub fn set_focused(&mut self, focused: bool) {
        if self.settings.mute_on_blur {
            self.audio.set_muted(!focused);
        }
    }

    /// Balls as `[x, y, color_index]` triplets (index into black, red, green, blue)
    pub fn particle_buffer(&self) -> Float32Array {
        let mut data = Vec::with_capacity(self.scene.particles.len() * 3);
        for p in &self.scene.particles {
            let color = BallColor::ALL.iter().position(|c| *c == p.color).unwrap_or(0);
            data.extend_from_slice(&[p.pos.x, p.pos.y, color as f32]);
        }
        Float32Array::from(data.as_slice())
    }

    /// Lines as `[x1, y1, x2, y2, mode_index, active]`, baseline last
    ///
    /// Mode indices follow draw, erase, toggle, silent, burner, splitter.
    pub fn line_buffer(&self) -> Float32Array {
        let mut data = Vec::with_capacity((self.scene.lines.len() + 1) * 6);
        for (_, line) in self.scene.obstacles() {
            let mode = LineMode::ALL.iter().position(|m| *m == line.mode).unwrap_or(0);
            data.extend_from_slice(&[
                line.start.x,
                line.start.y,
                line.end.x,
                line.end.y,
                mode as f32,
                if line.is_active { 1.0 } else { 0.0 },
            ]);
        }
        Float32Array::from(data.as_slice())
    }

    /// Radius to draw each ball at
    pub fn dot_radius(&self) -> f32 {
        DOT_RADIUS
    }

    /// Whether `line_buffer` ends with the baseline
    pub fn has_baseline(&self) -> bool {
        self.scene.baseline.is_some()
    }

    /// Current scene as shareable JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        Snapshot::capture(&self.scene)
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Load a shared scene, scaled to this canvas
    pub fn restore_json(&mut self, json: &str) -> Result<(), JsValue> {
        let snapshot = Snapshot::from_json(json).map_err(|e| {
            log::warn!("Rejected shared scene: {}", e);
            JsValue::from_str(&e.to_string())
        })?;
        snapshot.restore_into(&mut self.scene);
        self.set_sound(self.scene.sound_on);
        Ok(())
    }
}

impl WebInstrument {
    fn persist(&mut self) {
        self.settings.update_from(&self.scene);
        self.settings.save();
    }
}
