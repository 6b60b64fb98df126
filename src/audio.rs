//! Sound effects
//!
//! Playback is a fire-and-forget capability. The engine calls [`SoundSink::play`]
//! and never looks at the result; a sink that cannot play (no audio context,
//! autoplay still locked) simply does nothing.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Sound effect ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Game hits, drops, flaps and decorative targets
    ButtonPop,
    /// Releasing the press bubble on the backdrop
    BasePop,
}

/// Anything that can play a [`SoundEffect`]
pub trait SoundSink {
    fn play(&self, effect: SoundEffect);
}

/// Sink for headless runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSound;

impl SoundSink for NullSound {
    fn play(&self, _effect: SoundEffect) {}
}

/// Shared sinks; the host keeps a handle for unlocking
impl<S: SoundSink + ?Sized> SoundSink for Rc<S> {
    fn play(&self, effect: SoundEffect) {
        (**self).play(effect);
    }
}

/// `master * sfx`, or 0 when muted
pub fn effective_volume(master: f32, sfx: f32, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        master.clamp(0.0, 1.0) * sfx.clamp(0.0, 1.0)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, SoundSink, effective_volume};
    use crate::settings::Settings;

    /// Procedural pops through the Web Audio API
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: effective_volume(settings.master_volume, settings.sfx_volume, settings.muted),
            }
        }

        /// Resume after the first user gesture
        pub fn unlock(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((osc, gain))
        }

        /// Short upward chirp
        fn play_button_pop(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 520.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.08).ok();
            osc.frequency().set_value_at_time(520.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(1100.0, t + 0.05).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Softer, lower bloop
        fn play_base_pop(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.14).ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(700.0, t + 0.04).ok();
            osc.frequency().exponential_ramp_to_value_at_time(180.0, t + 0.14).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.16).ok();
        }
    }

    impl SoundSink for WebAudio {
        fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            match effect {
                SoundEffect::ButtonPop => self.play_button_pop(ctx, self.volume),
                SoundEffect::BasePop => self.play_base_pop(ctx, self.volume),
            }
        }
    }
}
