//! Bubble Arcade - ambient bubble backdrop and arcade mini-games
//!
//! Core modules:
//! - `sim`: Cooperative game loop (scheduler, entity pools, motion, collision, sessions)
//! - `renderer`: 2D drawing surface abstraction and scene painter
//! - `audio`: Fire-and-forget sound effect capability
//! - `settings`: Engine configuration

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{NullSound, SoundEffect, SoundSink};
pub use settings::{QualityPreset, Settings, SettingsError};
pub use sim::{Arcade, GameMode, InputEvent, InputTarget, Key, Lifecycle};

use glam::Vec2;
use rand::Rng;

/// Engine configuration constants
pub mod consts {
    /// Nominal display refresh interval; per-frame tuning is expressed against it
    pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest delta a single motion step will integrate (backgrounded tabs)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;
    /// Largest span a single scheduler advance will cover
    pub const MAX_ADVANCE_MS: f64 = 1000.0;
    /// Shortest accepted interval period
    pub const MIN_INTERVAL_MS: f64 = 1.0;

    /// Ambient field
    pub const AMBIENT_CAP: usize = 80;
    pub const AMBIENT_INITIAL_FILL: f32 = 0.7;
    pub const BURST_COUNT: usize = 10;
    pub const BURST_CAP: usize = 40;
    pub const BURST_SPREAD: f32 = 18.0;
    pub const BURST_FADE_MULTIPLIER: f32 = 15.0;
    pub const BUBBLE_EXIT_Y: f32 = -40.0;
    pub const BUBBLE_PHASE_STEP: f32 = 0.02;
    pub const BUBBLE_FADE: f32 = 0.0007;
    pub const AMBIENT_POP_INTERVAL_MS: f64 = 1400.0;

    /// Pop rings (per nominal frame)
    pub const RING_GROWTH: f32 = 1.8;
    pub const RING_FADE: f32 = 0.018;
    pub const RING_STROKE_DECAY: f32 = 0.97;

    /// Press-and-hold bubble on the backdrop
    pub const PRESS_START_RADIUS: f32 = 12.0;
    pub const PRESS_GROWTH: f32 = 1.2;
    pub const PRESS_MAX_RADIUS: f32 = 56.0;

    /// Precision mode grow-on-hold (independent of the press bubble)
    pub const PRECISION_START_SIZE: f32 = 20.0;
    pub const PRECISION_GROWTH: f32 = 2.5;
    pub const PRECISION_GROW_PERIOD_MS: f64 = 30.0;
    pub const PRECISION_MAX_SIZE: f32 = 160.0;

    /// Countdown cadence
    pub const COUNTDOWN_PERIOD_MS: f64 = 1000.0;

    /// Default mini-game area
    pub const DEFAULT_AREA_WIDTH: f32 = 480.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 360.0;
}

/// Convert a wall-clock delta into nominal frames, clamped to `MAX_FRAME_DELTA_MS`
#[inline]
pub fn frame_scale(delta_ms: f64) -> f32 {
    let clamped = (delta_ms as f32).clamp(0.0, consts::MAX_FRAME_DELTA_MS);
    clamped / consts::NOMINAL_FRAME_MS
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Uniform sample in `[min, max)`; `min` when the range is empty
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min { rng.random_range(min..max) } else { min }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_scale_nominal() {
        assert!((frame_scale(consts::NOMINAL_FRAME_MS as f64) - 1.0).abs() < 1e-5);
        assert!((frame_scale(33.333_336) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_frame_scale_clamps() {
        let max = consts::MAX_FRAME_DELTA_MS / consts::NOMINAL_FRAME_MS;
        assert!((frame_scale(60_000.0) - max).abs() < 1e-5);
        assert_eq!(frame_scale(-5.0), 0.0);
    }

    #[test]
    fn test_random_between_empty_range() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(1);
        assert_eq!(random_between(&mut rng, 5.0, 5.0), 5.0);
        let v = random_between(&mut rng, 1.0, 2.0);
        assert!((1.0..2.0).contains(&v));
    }
}
