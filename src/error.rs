//! Configuration errors
//!
//! Gameplay operations are total; only building a session from settings can fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("total_waves must be at least 2 to derive a time budget step (got {0})")]
    TooFewWaves(u32),
    #[error("base wave size must be at least 1")]
    EmptyWave,
    #[error("minimum wave budget must be positive")]
    ZeroBudget,
    #[error("minimum wave budget {min}ms exceeds maximum {max}ms")]
    InvertedBudget { min: u64, max: u64 },
    #[error("playfield {width}x{height} cannot fit a {footprint}px target")]
    PlayfieldTooSmall {
        width: f32,
        height: f32,
        footprint: f32,
    },
    #[error("wave size overflows by wave {waves} (base {base}, increment {increment})")]
    WaveSizeOverflow { base: u32, increment: u32, waves: u32 },
    #[error("re-target interval {min}..={max}ms is invalid")]
    InvalidRetargetInterval { min: u64, max: u64 },
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must be finite and not negative (got {value})")]
    Negative { name: &'static str, value: f32 },
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
