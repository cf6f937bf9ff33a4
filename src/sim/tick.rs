//! Per-frame simulation tick
//!
//! The driver calls `tick` once per display refresh with the input gathered
//! since the last frame and the current monotonic time.

use glam::Vec2;

use super::state::{GameEvent, GameSession};
use crate::Millis;

/// Discrete named actions from the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    TogglePause,
    Restart,
    ContinueWave,
}

/// Input collected for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position (crosshair)
    pub pointer: Option<Vec2>,
    /// Fire points, in the order the player fired
    pub fire: Vec<Vec2>,
    /// Named actions, applied before the update
    pub actions: Vec<Action>,
}

/// Advance the session by one frame
///
/// Order: pointer, actions, wave/target update, then queued shots.
pub fn tick(session: &mut GameSession, input: &TickInput, now: Millis) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if let Some(pointer) = input.pointer {
        session.set_pointer(pointer);
    }

    for action in &input.actions {
        match action {
            Action::Start => session.start(now, &mut events),
            Action::TogglePause => session.toggle_pause(now, &mut events),
            Action::Restart => session.restart(now, &mut events),
            Action::ContinueWave => session.continue_wave(now, &mut events),
        };
    }

    session.update(now, &mut events);

    for &point in &input.fire {
        session.fire(point, now, &mut events);
    }

    events
}
