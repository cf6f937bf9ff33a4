//! Wave sizing and time budgets
//!
//! Waves grow by a fixed increment; the countdown shrinks linearly from the
//! maximum budget at wave 1 to the minimum at the final wave.

use crate::Millis;
use crate::settings::WaveSettings;

/// Targets spawned in wave `wave` (1-based)
///
/// Validation keeps the final wave in range; later waves saturate.
pub fn wave_size(settings: &WaveSettings, wave: u32) -> u32 {
    settings
        .size_increment
        .saturating_mul(wave.saturating_sub(1))
        .saturating_add(settings.base_size)
}

/// Budget reduction per wave
///
/// `total_waves` is validated to be at least 2 before a controller exists.
pub fn budget_step_ms(settings: &WaveSettings) -> f64 {
    let span = settings.max_budget_ms.saturating_sub(settings.min_budget_ms) as f64;
    span / settings.total_waves.saturating_sub(1).max(1) as f64
}

/// Countdown for wave `wave`, rounded to whole milliseconds, never below the minimum
pub fn time_budget_ms(settings: &WaveSettings, wave: u32) -> Millis {
    let raw = settings.max_budget_ms as f64
        - budget_step_ms(settings) * wave.saturating_sub(1) as f64;
    // Negative values saturate to 0 and are lifted by the floor
    (raw.round() as Millis).max(settings.min_budget_ms)
}
