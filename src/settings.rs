//! Game settings and balance
//!
//! Loaded from a JSON file on native builds; every field falls back to the
//! defaults in `crate::consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::consts::*;
use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Normal,
    Frantic,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Normal => "Normal",
            Difficulty::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "normal" => Some(Difficulty::Normal),
            "frantic" | "hard" => Some(Difficulty::Frantic),
            _ => None,
        }
    }

    /// Multiplier applied to both ends of the wave time budget
    pub fn budget_scale(&self) -> f64 {
        match self {
            Difficulty::Relaxed => 1.25,
            Difficulty::Normal => 1.0,
            Difficulty::Frantic => 0.8,
        }
    }

    /// Multiplier applied to target seek speed
    pub fn speed_scale(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Frantic => 1.3,
        }
    }
}

/// Canvas the targets roam in (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Largest top-left position a target of this footprint may occupy
    pub fn max_position(&self, footprint: f32) -> Vec2 {
        Vec2::new(
            (self.width - footprint).max(0.0),
            (self.height - footprint).max(0.0),
        )
    }
}

/// Wave progression balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    pub total_waves: u32,
    pub base_size: u32,
    pub size_increment: u32,
    pub max_budget_ms: Millis,
    pub min_budget_ms: Millis,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            total_waves: TOTAL_WAVES,
            base_size: BASE_WAVE_SIZE,
            size_increment: WAVE_SIZE_INCREMENT,
            max_budget_ms: MAX_WAVE_BUDGET_MS,
            min_budget_ms: MIN_WAVE_BUDGET_MS,
        }
    }
}

/// Per-target tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    pub sprite_width: f32,
    pub sprite_height: f32,
    pub scale: f32,
    /// Pixels per tick
    pub speed: f32,
    pub arrival_epsilon: f32,
    pub hit_margin: f32,
    /// Divides every animation's frame rate (2.0 animates twice as fast)
    pub animation_speed: f32,
    pub retarget_min_ms: Millis,
    pub retarget_max_ms: Millis,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            sprite_width: TARGET_SPRITE_WIDTH,
            sprite_height: TARGET_SPRITE_HEIGHT,
            scale: TARGET_SCALE,
            speed: TARGET_SPEED,
            arrival_epsilon: ARRIVAL_EPSILON,
            hit_margin: HIT_MARGIN,
            animation_speed: 1.0,
            retarget_min_ms: RETARGET_MIN_MS,
            retarget_max_ms: RETARGET_MAX_MS,
        }
    }
}

impl TargetSettings {
    /// Square on-screen size used for clamping and hit-boxes
    pub fn footprint(&self) -> f32 {
        self.sprite_width.max(self.sprite_height) * self.scale
    }
}

/// Everything needed to build a `GameSession`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub waves: WaveSettings,
    pub targets: TargetSettings,
    pub playfield: Playfield,
    /// Run seed for reproducibility
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            waves: WaveSettings::default(),
            targets: TargetSettings::default(),
            playfield: Playfield::default(),
            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset scaling)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Switch preset, rescaling budgets and speed relative to the current one
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let budget = difficulty.budget_scale() / self.difficulty.budget_scale();
        let speed = difficulty.speed_scale() / self.difficulty.speed_scale();

        self.waves.max_budget_ms = (self.waves.max_budget_ms as f64 * budget).round() as Millis;
        self.waves.min_budget_ms = (self.waves.min_budget_ms as f64 * budget).round() as Millis;
        self.targets.speed *= speed;
        self.difficulty = difficulty;
    }

    /// Parse settings from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let waves = &self.waves;
        if waves.total_waves <= 1 {
            return Err(ConfigError::TooFewWaves(waves.total_waves));
        }
        if waves.base_size == 0 {
            return Err(ConfigError::EmptyWave);
        }
        if waves.min_budget_ms == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if waves.min_budget_ms > waves.max_budget_ms {
            return Err(ConfigError::InvertedBudget {
                min: waves.min_budget_ms,
                max: waves.max_budget_ms,
            });
        }
        let final_size = waves
            .size_increment
            .checked_mul(waves.total_waves - 1)
            .and_then(|grown| grown.checked_add(waves.base_size));
        if final_size.is_none() {
            return Err(ConfigError::WaveSizeOverflow {
                base: waves.base_size,
                increment: waves.size_increment,
                waves: waves.total_waves,
            });
        }

        let targets = &self.targets;
        for (name, value) in [
            ("sprite_width", targets.sprite_width),
            ("sprite_height", targets.sprite_height),
            ("scale", targets.scale),
            ("speed", targets.speed),
            ("animation_speed", targets.animation_speed),
        ] {
            // NaN fails this too
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (name, value) in [
            ("arrival_epsilon", targets.arrival_epsilon),
            ("hit_margin", targets.hit_margin),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if targets.retarget_min_ms == 0
            || targets.retarget_min_ms > targets.retarget_max_ms
            || targets.retarget_max_ms > RETARGET_LIMIT_MS
        {
            return Err(ConfigError::InvalidRetargetInterval {
                min: targets.retarget_min_ms,
                max: targets.retarget_max_ms,
            });
        }

        let footprint = targets.footprint();
        let field = &self.playfield;
        if !(field.width > footprint && field.height > footprint) {
            return Err(ConfigError::PlayfieldTooSmall {
                width: field.width,
                height: field.height,
                footprint,
            });
        }

        Ok(())
    }
}
