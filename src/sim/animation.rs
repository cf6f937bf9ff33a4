//! Sprite animation catalog and per-target frame cursor
//!
//! Each animation owns a fixed frame table on the 11-frame sprite sheet and
//! a frame-advance rate in ticks.

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SPRITE_CELL_SIZE, SPRITE_FRAME_COUNT};

/// Animations a target can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    /// Parked at its goal
    Idle,
    /// Seeking a goal
    Moving,
    /// Hit, fading out
    Dying,
}

impl Animation {
    /// Sprite sheet frame indices, in playback order
    pub fn frames(self) -> &'static [u32] {
        match self {
            Animation::Idle => &[0, 1],
            Animation::Moving => &[2, 3, 4],
            Animation::Dying => &[8, 9, 10],
        }
    }

    /// Ticks per frame at animation speed 1.0
    pub fn frame_rate(self) -> u32 {
        match self {
            Animation::Idle => 40,
            Animation::Moving => 20,
            Animation::Dying => 10,
        }
    }
}

/// Playback state for one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animator {
    current: Animation,
    /// Position within `current.frames()`
    cursor: usize,
    /// Ticks since the last frame advance
    counter: u32,
}

impl Animator {
    pub fn new(animation: Animation) -> Self {
        Self {
            current: animation,
            cursor: 0,
            counter: 0,
        }
    }

    pub fn current(&self) -> Animation {
        self.current
    }

    /// Switch animation; restarting only when it actually changes
    pub fn set(&mut self, animation: Animation) {
        if self.current != animation {
            self.current = animation;
            self.cursor = 0;
            self.counter = 0;
        }
    }

    /// Count one tick, stepping to the next frame when the rate elapses
    pub fn advance(&mut self, speed: f32) {
        self.counter += 1;
        let threshold = self.current.frame_rate() as f32 / speed;
        if self.counter as f32 >= threshold {
            self.cursor = (self.cursor + 1) % self.current.frames().len();
            self.counter = 0;
        }
    }

    /// Sprite sheet frame currently shown
    ///
    /// A cursor past the table yields `SPRITE_FRAME_COUNT`, which
    /// `sprite_cell` rejects.
    pub fn frame_index(&self) -> u32 {
        self.current
            .frames()
            .get(self.cursor)
            .copied()
            .unwrap_or(SPRITE_FRAME_COUNT)
    }
}

/// Top-left pixel of a frame's cell on the sprite sheet
///
/// Sheet rows hold frames `[0,1]`, `[2,3,4]`, `[5,6,7]`, `[8,9,10]`.
/// An index past the sheet is a logic error; it is logged and the caller
/// skips drawing for that tick.
pub fn sprite_cell(frame_index: u32) -> Option<UVec2> {
    if frame_index >= SPRITE_FRAME_COUNT {
        log::warn!("Frame index out of range: {}", frame_index);
        return None;
    }
    let (col, row) = match frame_index {
        0 | 1 => (frame_index, 0),
        2..=4 => (frame_index - 2, 1),
        5..=7 => (frame_index - 5, 2),
        _ => (frame_index - 8, 3),
    };
    Some(UVec2::new(col * SPRITE_CELL_SIZE, row * SPRITE_CELL_SIZE))
}
