//! Tick-driven simulation module
//!
//! All gameplay logic lives here:
//! - Single-threaded, one `tick` per frame
//! - Time is supplied by the driver (monotonic milliseconds)
//! - Seeded RNG only
//! - Stable iteration order (targets in spawn order)
//! - No rendering or platform dependencies

pub mod animation;
pub mod collision;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod target;
pub mod tick;
pub mod wave;

pub use animation::{Animation, Animator, sprite_cell};
pub use collision::{HitBox, route_fire};
pub use schedule::{EventQueue, ScheduledEvent, TimerEffect};
pub use spawn::{budget_step_ms, time_budget_ms, wave_size};
pub use state::{GameEvent, GameMode, GameSession, ShotFlash};
pub use target::{Lifecycle, Target, TargetId, TargetView};
pub use tick::{Action, TickInput, tick};
pub use wave::{TimerUrgency, WaveController, WaveHud, WaveOutcome};
