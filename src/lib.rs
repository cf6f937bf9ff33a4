//! Alien Waves - wave progression and target lifecycle engine
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (targets, waves, session modes, hit routing)
//! - `settings`: Data-driven game balance and playfield configuration
//! - `error`: Configuration errors
//!
//! Rendering, audio and menu chrome live outside this crate; they read the
//! views and events the simulation exposes.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{Difficulty, Playfield, Settings, TargetSettings, WaveSettings};

/// Monotonic wall-clock time in milliseconds, supplied by the driver
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use super::Millis;

    /// Default playfield (canvas) size in pixels
    pub const PLAYFIELD_WIDTH: f32 = 1280.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;

    /// Target sprite cell size on the sheet, and the on-screen scale
    pub const TARGET_SPRITE_WIDTH: f32 = 200.0;
    pub const TARGET_SPRITE_HEIGHT: f32 = 200.0;
    pub const TARGET_SCALE: f32 = 0.3;

    /// Seek speed in pixels per tick
    pub const TARGET_SPEED: f32 = 1.5;
    /// Distance at which a target counts as arrived at its goal
    pub const ARRIVAL_EPSILON: f32 = 5.0;
    /// Extra hit-box padding around the footprint, each side
    pub const HIT_MARGIN: f32 = 10.0;

    /// How long a hit target stays in the dying state
    pub const DYING_DURATION_MS: Millis = 1000;
    /// Floor for the dying fade
    pub const DYING_MIN_ALPHA: f32 = 0.3;

    /// Re-target interval range (each target picks one at spawn)
    pub const RETARGET_MIN_MS: Millis = 2500;
    pub const RETARGET_MAX_MS: Millis = 5500;
    /// Longest re-target interval settings may ask for (one hour)
    pub const RETARGET_LIMIT_MS: Millis = 60 * 60 * 1000;

    /// Wave progression defaults
    pub const TOTAL_WAVES: u32 = 20;
    pub const BASE_WAVE_SIZE: u32 = 4;
    pub const WAVE_SIZE_INCREMENT: u32 = 4;
    pub const MAX_WAVE_BUDGET_MS: Millis = 60_000;
    pub const MIN_WAVE_BUDGET_MS: Millis = 20_000;

    /// Countdown thresholds for HUD urgency
    pub const WARNING_REMAINING_MS: Millis = 20_000;
    pub const CRITICAL_REMAINING_MS: Millis = 10_000;

    /// Muzzle flash drawn at the fire point
    pub const SHOT_FLASH_MS: Millis = 200;
    pub const SHOT_FLASH_MAX_RADIUS: f32 = 50.0;

    /// Sprite sheet layout: 11 frames in 200px cells
    pub const SPRITE_FRAME_COUNT: u32 = 11;
    pub const SPRITE_CELL_SIZE: u32 = 200;
}

/// Milliseconds between `since` and `now`, zero if the clock reads earlier
#[inline]
pub fn elapsed_ms(now: Millis, since: Millis) -> Millis {
    now.saturating_sub(since)
}
