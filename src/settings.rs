//! Engine settings
//!
//! Loaded from JSON on native builds; the browser build starts from defaults
//! and folds in the `prefers-reduced-motion` media query.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{AMBIENT_CAP, DEFAULT_AREA_HEIGHT, DEFAULT_AREA_WIDTH};

/// Fixed seed used when none is configured on native builds
pub const DEFAULT_SEED: u64 = 0x0b0b_b1e5;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Ambient bubble ceiling for this preset
    pub fn ambient_cap(&self) -> usize {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 60,
            QualityPreset::High => AMBIENT_CAP,
        }
    }
}

/// Mini-game area size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaSize {
    pub width: f32,
    pub height: f32,
}

impl Default for AreaSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_AREA_WIDTH,
            height: DEFAULT_AREA_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Ambient bubble backdrop
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Disables the backdrop entirely
    pub reduced_motion: bool,

    /// RNG seed; None picks [`DEFAULT_SEED`] natively and the clock in the browser
    pub seed: Option<u64>,
    pub game_area: AreaSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            particles: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
            seed: None,
            game_area: AreaSize::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load `path` if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load_from_path(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Whether the ambient field runs at all
    pub fn field_enabled(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Effective ambient bubble ceiling
    pub fn ambient_cap(&self) -> usize {
        if self.field_enabled() { self.quality.ambient_cap() } else { 0 }
    }

    pub fn seed_or_default(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Read `prefers-reduced-motion` (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn with_browser_preferences(mut self) -> Self {
        let reduced = web_sys::window()
            .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok())
            .flatten()
            .is_some_and(|mq| mq.matches());
        if reduced {
            log::info!("prefers-reduced-motion set; ambient field disabled");
            self.reduced_motion = true;
        }
        self
    }
}
