//! Session state and mode machine
//!
//! `GameSession` is the single top-level struct: constructed once, reset
//! explicitly on restart. Wave and target updates run only in `Playing`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::{TargetId, TargetView};
use super::wave::{WaveController, WaveHud, WaveOutcome};
use crate::consts::{SHOT_FLASH_MAX_RADIUS, SHOT_FLASH_MS};
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::{Millis, elapsed_ms};

/// Top-level mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Title menu, waiting for start
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen; nothing updates
    Paused,
    /// A wave timed out
    Over,
    /// Every wave cleared
    Victory,
}

/// Things that happened during a tick, for the audio and UI layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    ModeChanged { from: GameMode, to: GameMode },
    WaveStarted { wave: u32, size: u32, budget_ms: Millis },
    WaveSpawned { wave: u32, count: u32 },
    /// A fire action, whether or not it hit
    Shot { point: Vec2, hit: Option<TargetId> },
    TargetRemoved(TargetId),
    WaveSucceeded { wave: u32 },
    WaveFailed { wave: u32 },
    AllWavesCleared { waves: u32 },
}

/// Expanding ring drawn where the player last fired
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShotFlash {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    mode: GameMode,
    /// Last non-menu mode, kept for resume
    previous_mode: GameMode,
    wave: WaveController,
    /// Crosshair position; never used for hit-testing
    pointer: Vec2,
    last_shot: Option<(Vec2, Millis)>,
}

impl GameSession {
    /// Validate settings and build a session sitting in the menu
    pub fn new(settings: &Settings, now: Millis) -> Result<Self, ConfigError> {
        let wave = WaveController::new(settings, now)?;
        Ok(Self {
            mode: GameMode::Menu,
            previous_mode: GameMode::Menu,
            wave,
            pointer: Vec2::new(settings.playfield.width, settings.playfield.height) / 2.0,
            last_shot: None,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn previous_mode(&self) -> GameMode {
        self.previous_mode
    }

    pub fn wave(&self) -> &WaveController {
        &self.wave
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    fn set_mode(&mut self, to: GameMode, events: &mut Vec<GameEvent>) {
        let from = self.mode;
        if from == to {
            return;
        }
        if from != GameMode::Menu {
            self.previous_mode = from;
        }
        self.mode = to;
        log::info!("Mode {:?} -> {:?}", from, to);
        events.push(GameEvent::ModeChanged { from, to });
    }

    fn announce_wave(&self, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::WaveStarted {
            wave: self.wave.wave_number(),
            size: self.wave.wave_size(),
            budget_ms: self.wave.time_budget_ms(),
        });
    }

    /// Menu -> Playing; the first wave's countdown starts now
    pub fn start(&mut self, now: Millis, events: &mut Vec<GameEvent>) -> bool {
        if self.mode != GameMode::Menu {
            log::debug!("Ignoring start in {:?}", self.mode);
            return false;
        }
        self.wave.mark_started(now);
        self.set_mode(GameMode::Playing, events);
        self.announce_wave(events);
        true
    }

    /// Playing <-> Paused, carrying the countdown across the pause
    pub fn toggle_pause(&mut self, now: Millis, events: &mut Vec<GameEvent>) -> bool {
        match self.mode {
            GameMode::Playing => {
                self.wave.pause(now);
                self.set_mode(GameMode::Paused, events);
                true
            }
            GameMode::Paused => {
                self.wave.resume(now);
                self.set_mode(GameMode::Playing, events);
                true
            }
            mode => {
                log::debug!("Ignoring pause toggle in {:?}", mode);
                false
            }
        }
    }

    /// Over/Victory/Paused -> Playing from wave 1
    pub fn restart(&mut self, now: Millis, events: &mut Vec<GameEvent>) -> bool {
        if !matches!(
            self.mode,
            GameMode::Over | GameMode::Victory | GameMode::Paused
        ) {
            log::debug!("Ignoring restart in {:?}", self.mode);
            return false;
        }
        self.wave.reset(now);
        self.last_shot = None;
        log::info!("Restarting from wave 1");
        self.set_mode(GameMode::Playing, events);
        self.announce_wave(events);
        true
    }

    /// Advance past a succeeded wave
    pub fn continue_wave(&mut self, now: Millis, events: &mut Vec<GameEvent>) -> bool {
        if self.mode != GameMode::Playing {
            log::debug!("Ignoring continue in {:?}", self.mode);
            return false;
        }
        self.wave.continue_wave(now, events)
    }

    /// Fire at `point`; at most one target is hit
    pub fn fire(
        &mut self,
        point: Vec2,
        now: Millis,
        events: &mut Vec<GameEvent>,
    ) -> Option<TargetId> {
        if self.mode != GameMode::Playing {
            return None;
        }
        self.last_shot = Some((point, now));
        let hit = self.wave.fire(point, now);
        events.push(GameEvent::Shot { point, hit });
        hit
    }

    /// Run the wave for one tick and apply its outcome to the mode
    pub fn update(&mut self, now: Millis, events: &mut Vec<GameEvent>) {
        if self.mode != GameMode::Playing {
            return;
        }
        self.wave.update(now, events);
        match self.wave.outcome() {
            WaveOutcome::Failed => self.set_mode(GameMode::Over, events),
            WaveOutcome::Cleared => self.set_mode(GameMode::Victory, events),
            WaveOutcome::Active | WaveOutcome::Succeeded => {}
        }
    }

    /// Muzzle flash for the last shot, while it is still visible
    pub fn shot_flash(&self, now: Millis) -> Option<ShotFlash> {
        let (center, at) = self.last_shot?;
        let elapsed = elapsed_ms(now, at);
        if elapsed >= SHOT_FLASH_MS {
            return None;
        }
        let progress = elapsed as f32 / SHOT_FLASH_MS as f32;
        Some(ShotFlash {
            center,
            radius: progress * SHOT_FLASH_MAX_RADIUS,
            alpha: 1.0 - progress,
        })
    }

    pub fn hud(&self, now: Millis) -> WaveHud {
        self.wave.hud(now)
    }

    pub fn target_views(&self, now: Millis) -> Vec<TargetView> {
        self.wave.target_views(now)
    }
}
