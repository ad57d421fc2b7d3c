//! Collision tones through the Web Audio API
//!
//! Each tone is a single sine voice with an exponential decay. Voices are
//! fire-and-forget: the audio graph stops and frees them on its own.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{Tone, TonePlayer};

/// Peak gain of one collision tone at full volume
const TONE_GAIN: f32 = 0.1;
/// Level the decay ramps down to (exponential ramps cannot reach zero)
const TONE_FLOOR: f32 = 0.001;

/// Audio output for the instrument
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Suspend the context while sound is off
    pub fn suspend(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.suspend();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Create an oscillator wired through a gain node to the output
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}

impl TonePlayer for AudioManager {
    fn play_tone(&mut self, tone: Tone) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Some((osc, gain)) = self.create_osc(ctx, tone.frequency_hz, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();
        let end = t + tone.duration_secs as f64;

        gain.gain().set_value_at_time(TONE_GAIN * vol, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(TONE_FLOOR, end).ok();

        osc.start().ok();
        osc.stop_with_when(end).ok();
    }
}
