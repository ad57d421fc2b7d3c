//! Player preferences
//!
//! Persisted separately from shared scenes in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_DROP_RATE;
use crate::sim::{BallColor, LineMode, Scene};

/// Preferences that survive reloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color of newly dropped balls
    pub ball_color: BallColor,
    /// Mode for newly drawn lines
    pub line_mode: LineMode,
    /// Balls per second (0 = manual drops only)
    pub drop_rate: f32,

    // === Audio ===
    /// Collision tones on/off
    pub sound_on: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_color: BallColor::Black,
            line_mode: LineMode::Draw,
            drop_rate: DEFAULT_DROP_RATE,

            // Sound stays off until the player asks for it
            sound_on: false,
            master_volume: 0.8,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Push the scene-affecting preferences into a scene
    pub fn apply_to(&self, scene: &mut Scene) {
        scene.current_color = self.ball_color;
        scene.current_mode = self.line_mode;
        scene.set_drop_rate(self.drop_rate);
        scene.sound_on = self.sound_on;
    }

    /// Pick up preferences the player changed through the scene
    pub fn update_from(&mut self, scene: &Scene) {
        self.ball_color = scene.current_color;
        self.line_mode = scene.current_mode;
        self.drop_rate = scene.drop_rate();
        self.sound_on = scene.sound_on;
    }

    /// Set master volume, clamped to [0, 1]
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = if vol.is_nan() { 0.0 } else { vol.clamp(0.0, 1.0) };
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "line_instrument_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
