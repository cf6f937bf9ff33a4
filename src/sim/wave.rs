//! Wave controller
//!
//! Owns the live targets and runs the per-wave state machine:
//!
//! - `Active`: the batch spawns once, then the countdown runs
//! - `Succeeded`: every target gone before time ran out; waits for
//!   `continue_wave`
//! - `Failed`: time ran out with targets still alive or dying (terminal)
//! - `Cleared`: the final wave succeeded (terminal)
//!
//! Failure is always evaluated before success within a tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::route_fire;
use super::schedule::{EventQueue, TimerEffect};
use super::spawn::{time_budget_ms, wave_size};
use super::state::GameEvent;
use super::target::{Target, TargetId, TargetView};
use crate::consts::{CRITICAL_REMAINING_MS, WARNING_REMAINING_MS};
use crate::error::ConfigError;
use crate::settings::{Playfield, Settings, TargetSettings, WaveSettings};
use crate::{Millis, elapsed_ms};

/// Result of the current wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveOutcome {
    Active,
    Succeeded,
    Failed,
    Cleared,
}

/// Countdown color band for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerUrgency {
    Calm,
    Warning,
    Critical,
}

impl TimerUrgency {
    pub fn from_remaining(remaining_ms: Millis) -> Self {
        if remaining_ms < CRITICAL_REMAINING_MS {
            TimerUrgency::Critical
        } else if remaining_ms < WARNING_REMAINING_MS {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Calm
        }
    }
}

/// Wave readout for the HUD
#[derive(Debug, Clone, Serialize)]
pub struct WaveHud {
    pub wave_number: u32,
    pub total_waves: u32,
    pub wave_size: u32,
    /// Alive targets only; dying ones are already dealt with
    pub alive: usize,
    pub time_remaining_ms: Millis,
    /// Remaining share of the budget, 1.0 at wave start
    pub progress: f32,
    pub urgency: TimerUrgency,
    pub outcome: WaveOutcome,
    pub awaiting_continue: bool,
}

#[derive(Debug, Clone, Copy)]
struct PauseMark {
    at: Millis,
    elapsed: Millis,
}

#[derive(Debug, Clone)]
pub struct WaveController {
    waves: WaveSettings,
    tuning: TargetSettings,
    playfield: Playfield,
    wave_number: u32,
    wave_size: u32,
    time_budget_ms: Millis,
    wave_started_at: Millis,
    spawned: bool,
    outcome: WaveOutcome,
    pause: Option<PauseMark>,
    /// Live targets in spawn order
    targets: Vec<Target>,
    timers: EventQueue,
    rng: Pcg32,
    next_id: u32,
}

impl WaveController {
    pub fn new(settings: &Settings, now: Millis) -> Result<Self, ConfigError> {
        settings.validate()?;
        let waves = settings.waves;
        Ok(Self {
            waves,
            tuning: settings.targets,
            playfield: settings.playfield,
            wave_number: 1,
            wave_size: wave_size(&waves, 1),
            time_budget_ms: time_budget_ms(&waves, 1),
            wave_started_at: now,
            spawned: false,
            outcome: WaveOutcome::Active,
            pause: None,
            targets: Vec::new(),
            timers: EventQueue::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            next_id: 1,
        })
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn total_waves(&self) -> u32 {
        self.waves.total_waves
    }

    pub fn wave_size(&self) -> u32 {
        self.wave_size
    }

    pub fn time_budget_ms(&self) -> Millis {
        self.time_budget_ms
    }

    pub fn wave_started_at(&self) -> Millis {
        self.wave_started_at
    }

    pub fn spawned(&self) -> bool {
        self.spawned
    }

    pub fn outcome(&self) -> WaveOutcome {
        self.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_some()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn timers(&self) -> &EventQueue {
        &self.timers
    }

    /// Targets still counting toward the wave (alive or dying)
    pub fn active_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.lifecycle().is_active())
            .count()
    }

    pub fn alive_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_alive()).count()
    }

    /// Countdown elapsed, frozen while paused
    pub fn elapsed_ms(&self, now: Millis) -> Millis {
        match self.pause {
            Some(mark) => mark.elapsed,
            None => elapsed_ms(now, self.wave_started_at),
        }
    }

    pub fn time_remaining_ms(&self, now: Millis) -> Millis {
        self.time_budget_ms.saturating_sub(self.elapsed_ms(now))
    }

    /// Restart the countdown from `now` (session start)
    pub fn mark_started(&mut self, now: Millis) {
        self.wave_started_at = now;
    }

    /// Run one tick of the wave
    pub fn update(&mut self, now: Millis, events: &mut Vec<GameEvent>) {
        if self.outcome != WaveOutcome::Active || self.pause.is_some() {
            return;
        }

        self.fire_due_timers(now);
        for target in &mut self.targets {
            target.update(now);
        }
        self.reap(events);
        self.spawn_wave(now, events);
        self.evaluate(now, events);
    }

    fn fire_due_timers(&mut self, now: Millis) {
        // Drain first so a rescheduled timer cannot fire again this tick
        let due: Vec<_> = std::iter::from_fn(|| self.timers.pop_due(now)).collect();
        for event in due {
            match event.effect {
                TimerEffect::Retarget => {
                    let Some(target) = self.targets.iter_mut().find(|t| t.id == event.target)
                    else {
                        continue;
                    };
                    if target.request_new_goal(&mut self.rng) {
                        // Fixed cadence, never in the past
                        let next = event
                            .fire_at
                            .saturating_add(target.retarget_interval())
                            .max(now.saturating_add(1));
                        self.timers.schedule(next, target.id, TimerEffect::Retarget);
                    }
                }
            }
        }
    }

    fn reap(&mut self, events: &mut Vec<GameEvent>) {
        let mut reaped = Vec::new();
        self.targets.retain(|t| {
            if t.is_removed() {
                reaped.push(t.id);
                false
            } else {
                true
            }
        });
        for id in reaped {
            self.timers.cancel_target(id);
            events.push(GameEvent::TargetRemoved(id));
        }
    }

    /// Spawn the wave's batch if it is due
    ///
    /// Fires at most once per wave: only while active, before the batch
    /// exists, and with no targets left over. Returns how many spawned.
    pub fn spawn_wave(&mut self, now: Millis, events: &mut Vec<GameEvent>) -> usize {
        if self.outcome != WaveOutcome::Active || self.spawned || self.active_count() > 0 {
            return 0;
        }

        for _ in 0..self.wave_size {
            let id = TargetId(self.next_id);
            self.next_id += 1;
            let target = Target::spawn(id, &self.tuning, &self.playfield, &mut self.rng);
            let fire_at = now.saturating_add(target.retarget_interval());
            self.timers.schedule(fire_at, id, TimerEffect::Retarget);
            self.targets.push(target);
        }
        self.spawned = true;

        log::debug!(
            "Wave {} spawned {} targets",
            self.wave_number,
            self.wave_size
        );
        events.push(GameEvent::WaveSpawned {
            wave: self.wave_number,
            count: self.wave_size,
        });
        self.wave_size as usize
    }

    fn evaluate(&mut self, now: Millis, events: &mut Vec<GameEvent>) {
        let active = self.active_count();

        if self.elapsed_ms(now) >= self.time_budget_ms && active > 0 {
            self.outcome = WaveOutcome::Failed;
            self.destroy_all();
            log::info!(
                "Wave {} failed! Time's up with {} targets left",
                self.wave_number,
                active
            );
            events.push(GameEvent::WaveFailed {
                wave: self.wave_number,
            });
            return;
        }

        if self.spawned && active == 0 {
            if self.wave_number < self.waves.total_waves {
                self.outcome = WaveOutcome::Succeeded;
                log::info!("Wave {} complete!", self.wave_number);
                events.push(GameEvent::WaveSucceeded {
                    wave: self.wave_number,
                });
            } else {
                self.outcome = WaveOutcome::Cleared;
                log::info!(
                    "Game complete! Survived all {} waves",
                    self.waves.total_waves
                );
                events.push(GameEvent::AllWavesCleared {
                    waves: self.waves.total_waves,
                });
            }
        }
    }

    /// Move from a succeeded wave to the next one
    pub fn continue_wave(&mut self, now: Millis, events: &mut Vec<GameEvent>) -> bool {
        if self.outcome != WaveOutcome::Succeeded {
            return false;
        }

        self.wave_number += 1;
        self.wave_size = wave_size(&self.waves, self.wave_number);
        self.time_budget_ms = time_budget_ms(&self.waves, self.wave_number);
        self.wave_started_at = now;
        self.spawned = false;
        self.outcome = WaveOutcome::Active;

        log::info!(
            "Wave {} starting: {} targets in {}ms",
            self.wave_number,
            self.wave_size,
            self.time_budget_ms
        );
        events.push(GameEvent::WaveStarted {
            wave: self.wave_number,
            size: self.wave_size,
            budget_ms: self.time_budget_ms,
        });
        true
    }

    /// Freeze the countdown; idempotent
    pub fn pause(&mut self, now: Millis) {
        if self.pause.is_none() {
            self.pause = Some(PauseMark {
                at: now,
                elapsed: elapsed_ms(now, self.wave_started_at),
            });
        }
    }

    /// Resume with the countdown exactly where it was paused
    pub fn resume(&mut self, now: Millis) {
        let Some(mark) = self.pause.take() else {
            return;
        };
        self.wave_started_at = now.saturating_sub(mark.elapsed);

        let paused_for = elapsed_ms(now, mark.at);
        self.timers.shift(paused_for);
        for target in &mut self.targets {
            target.shift_timers(paused_for);
        }
    }

    /// Back to wave 1 with no targets
    pub fn reset(&mut self, now: Millis) {
        self.destroy_all();
        self.wave_number = 1;
        self.wave_size = wave_size(&self.waves, 1);
        self.time_budget_ms = time_budget_ms(&self.waves, 1);
        self.wave_started_at = now;
        self.spawned = false;
        self.outcome = WaveOutcome::Active;
        self.pause = None;
    }

    /// Destroy every target and drop their timers
    pub fn destroy_all(&mut self) {
        for target in &mut self.targets {
            target.destroy();
        }
        self.targets.clear();
        self.timers.clear();
    }

    /// Route one shot; the hit target's re-target timer is cancelled
    pub fn fire(&mut self, point: Vec2, now: Millis) -> Option<TargetId> {
        let id = route_fire(&mut self.targets, point, now)?;
        self.timers.cancel_target(id);
        Some(id)
    }

    /// Hit a specific target; unknown or non-alive ids are a no-op
    pub fn hit_target(&mut self, id: TargetId, now: Millis) -> bool {
        let Some(target) = self.targets.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if !target.hit(now) {
            return false;
        }
        self.timers.cancel_target(id);
        true
    }

    /// Hit test against a specific target; unknown ids never hit
    pub fn check_hit(&self, id: TargetId, point: Vec2) -> bool {
        self.target(id).is_some_and(|t| t.check_hit(point))
    }

    pub fn target_views(&self, now: Millis) -> Vec<TargetView> {
        self.targets.iter().map(|t| t.view(now)).collect()
    }

    pub fn hud(&self, now: Millis) -> WaveHud {
        let remaining = self.time_remaining_ms(now);
        WaveHud {
            wave_number: self.wave_number,
            total_waves: self.waves.total_waves,
            wave_size: self.wave_size,
            alive: self.alive_count(),
            time_remaining_ms: remaining,
            progress: remaining as f32 / self.time_budget_ms as f32,
            urgency: TimerUrgency::from_remaining(remaining),
            outcome: self.outcome,
            awaiting_continue: self.outcome == WaveOutcome::Succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::animation::Animation;
    use crate::sim::target::Lifecycle;

    fn settings() -> Settings {
        Settings::default()
    }

    fn controller(settings: &Settings) -> WaveController {
        WaveController::new(settings, 0).expect("valid settings")
    }

    fn kill_all(wave: &mut WaveController, now: Millis) {
        let ids: Vec<_> = wave.targets().iter().map(|t| t.id).collect();
        for id in ids {
            wave.hit_target(id, now);
        }
    }

    #[test]
    fn test_rejects_single_wave_config() {
        let mut s = settings();
        s.waves.total_waves = 1;
        assert!(WaveController::new(&s, 0).is_err());
    }

    #[test]
    fn test_first_update_spawns_batch() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(16, &mut events);

        assert!(wave.spawned());
        assert_eq!(wave.targets().len(), 4);
        assert_eq!(wave.timers().len(), 4);
        assert!(events.contains(&GameEvent::WaveSpawned { wave: 1, count: 4 }));
    }

    #[test]
    fn test_spawn_fires_once_per_wave() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        assert_eq!(wave.spawn_wave(0, &mut events), 4);
        assert_eq!(wave.spawn_wave(0, &mut events), 0);
        assert_eq!(wave.targets().len(), 4);

        // Even once the batch is gone, the same wave never respawns
        wave.destroy_all();
        assert_eq!(wave.spawn_wave(0, &mut events), 0);
    }

    #[test]
    fn test_timeout_with_live_target_fails() {
        let mut s = settings();
        s.waves.base_size = 1;
        s.waves.max_budget_ms = 1000;
        s.waves.min_budget_ms = 1000;
        let mut wave = controller(&s);
        let mut events = Vec::new();

        wave.update(0, &mut events);
        assert_eq!(wave.targets().len(), 1);
        wave.update(999, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Active);

        wave.update(1000, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Failed);
        assert!(wave.targets().is_empty());
        assert!(wave.timers().is_empty());
        assert!(events.contains(&GameEvent::WaveFailed { wave: 1 }));
    }

    #[test]
    fn test_dying_target_still_fails_wave() {
        let mut s = settings();
        s.waves.base_size = 1;
        s.waves.max_budget_ms = 1000;
        s.waves.min_budget_ms = 1000;
        let mut wave = controller(&s);
        let mut events = Vec::new();

        wave.update(0, &mut events);
        kill_all(&mut wave, 500);
        wave.update(1000, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Failed);
    }

    #[test]
    fn test_last_target_removed_at_deadline_succeeds() {
        let mut s = settings();
        s.waves.base_size = 1;
        s.waves.max_budget_ms = 1000;
        s.waves.min_budget_ms = 1000;
        let mut wave = controller(&s);
        let mut events = Vec::new();

        wave.update(0, &mut events);
        kill_all(&mut wave, 0);
        // Removal lands in the same tick the budget runs out
        wave.update(1000, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Succeeded);
    }

    #[test]
    fn test_success_then_continue() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        kill_all(&mut wave, 100);

        wave.update(1099, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Active);
        wave.update(1100, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Succeeded);
        assert!(wave.hud(1100).awaiting_continue);

        // Nothing happens until continue
        wave.update(90_000, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Succeeded);

        assert!(wave.continue_wave(90_000, &mut events));
        assert_eq!(wave.wave_number(), 2);
        assert_eq!(wave.wave_size(), 8);
        assert_eq!(wave.time_budget_ms(), 57_895);
        assert_eq!(wave.time_remaining_ms(90_000), 57_895);
        assert!(!wave.spawned());

        wave.update(90_016, &mut events);
        assert_eq!(wave.targets().len(), 8);
    }

    #[test]
    fn test_continue_only_from_succeeded() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        assert!(!wave.continue_wave(0, &mut events));
        assert_eq!(wave.wave_number(), 1);
    }

    #[test]
    fn test_final_wave_clears() {
        let mut s = settings();
        s.waves.total_waves = 2;
        let mut wave = controller(&s);
        let mut events = Vec::new();

        for round in 0..2u64 {
            let t0 = round * 10_000;
            wave.update(t0, &mut events);
            kill_all(&mut wave, t0);
            wave.update(t0 + 1000, &mut events);
            wave.continue_wave(t0 + 2000, &mut events);
        }
        assert_eq!(wave.outcome(), WaveOutcome::Cleared);
        assert_eq!(wave.wave_number(), 2);
        assert!(events.contains(&GameEvent::AllWavesCleared { waves: 2 }));
    }

    #[test]
    fn test_pause_preserves_remaining_time() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        wave.update(12_345, &mut events);
        let before = wave.time_remaining_ms(12_345);

        wave.pause(12_345);
        assert_eq!(wave.time_remaining_ms(500_000), before);
        wave.update(500_000, &mut events);
        assert_eq!(wave.outcome(), WaveOutcome::Active);

        wave.resume(1_000_000);
        assert_eq!(wave.time_remaining_ms(1_000_000), before);
        assert_eq!(wave.wave_started_at(), 1_000_000 - 12_345);
    }

    #[test]
    fn test_pause_shifts_retarget_timers() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        let due = wave.timers().next_fire_at().expect("timers scheduled");

        wave.pause(1000);
        wave.resume(11_000);
        assert_eq!(wave.timers().next_fire_at(), Some(due + 10_000));
    }

    #[test]
    fn test_retarget_timer_reschedules() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        let first = wave.targets()[0].id;
        let interval = wave.targets()[0].retarget_interval();

        wave.update(interval, &mut events);
        assert!(wave.timers().is_scheduled(first));
        assert_eq!(wave.timers().len(), 4);
    }

    #[test]
    fn test_hit_cancels_timer_and_reaps() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        let id = wave.targets()[0].id;

        assert!(wave.hit_target(id, 100));
        assert!(!wave.timers().is_scheduled(id));
        assert!(!wave.hit_target(id, 200));
        assert_eq!(wave.alive_count(), 3);
        assert_eq!(wave.active_count(), 4);

        wave.update(1100, &mut events);
        assert!(wave.target(id).is_none());
        assert!(events.contains(&GameEvent::TargetRemoved(id)));
        assert!(!wave.hit_target(id, 1200));
        assert!(!wave.check_hit(id, Vec2::ZERO));
    }

    #[test]
    fn test_reset_returns_to_wave_one() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        kill_all(&mut wave, 0);
        wave.update(1000, &mut events);
        wave.continue_wave(1000, &mut events);
        wave.update(1016, &mut events);
        assert_eq!(wave.wave_number(), 2);

        wave.reset(5000);
        assert_eq!(wave.wave_number(), 1);
        assert_eq!(wave.wave_size(), 4);
        assert_eq!(wave.time_budget_ms(), 60_000);
        assert!(wave.targets().is_empty());
        assert!(wave.timers().is_empty());
        assert_eq!(wave.outcome(), WaveOutcome::Active);
        assert!(!wave.spawned());
    }

    #[test]
    fn test_oversized_growth_rejected_before_play() {
        let mut s = settings();
        s.waves.total_waves = 3;
        s.waves.size_increment = u32::MAX;
        assert!(matches!(
            WaveController::new(&s, 0),
            Err(ConfigError::WaveSizeOverflow { .. })
        ));

        let mut s = settings();
        s.targets.retarget_min_ms = u64::MAX;
        s.targets.retarget_max_ms = u64::MAX;
        assert!(matches!(
            WaveController::new(&s, 0),
            Err(ConfigError::InvalidRetargetInterval { .. })
        ));
    }

    #[test]
    fn test_large_valid_growth_continues() {
        let mut s = settings();
        s.waves.total_waves = 3;
        s.waves.base_size = 1;
        s.waves.size_increment = 1_000_000;
        let mut wave = controller(&s);
        let mut events = Vec::new();
        assert_eq!(wave.spawn_wave(0, &mut events), 1);
        kill_all(&mut wave, 0);
        wave.update(1000, &mut events);

        assert!(wave.continue_wave(1000, &mut events));
        assert_eq!(wave.wave_size(), 1_000_001);
    }

    #[test]
    fn test_timers_near_clock_end_saturate() {
        let start = Millis::MAX - 100;
        let mut wave = WaveController::new(&settings(), start).expect("valid settings");
        let mut events = Vec::new();
        wave.update(start, &mut events);
        assert_eq!(wave.targets().len(), 4);
        assert_eq!(wave.timers().next_fire_at(), Some(Millis::MAX));

        // Due timers reschedule at the clock end without re-firing this tick
        wave.update(Millis::MAX, &mut events);
        assert_eq!(wave.timers().len(), 4);
    }

    #[test]
    fn test_target_views_for_renderer() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        let id = wave.targets()[0].id;

        let views = wave.target_views(0);
        assert_eq!(views.len(), 4);
        let view = &views[0];
        assert_eq!(view.id, id);
        assert!((view.footprint - 60.0).abs() < 1e-4);
        assert_eq!(view.animation, Animation::Moving);
        assert_eq!(view.frame_index, 2);
        assert_eq!(view.alpha, 1.0);

        assert!(wave.hit_target(id, 100));
        let view = &wave.target_views(600)[0];
        assert_eq!(view.lifecycle, Lifecycle::Dying { since: 100 });
        assert_eq!(view.animation, Animation::Dying);
        assert_eq!(view.frame_index, 8);
        assert!((view.alpha - 0.5).abs() < 1e-6);

        // Fade bottoms out late in the dying window
        let view = &wave.target_views(1000)[0];
        assert!((view.alpha - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_hud_urgency_bands() {
        assert_eq!(TimerUrgency::from_remaining(25_000), TimerUrgency::Calm);
        assert_eq!(TimerUrgency::from_remaining(19_999), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_remaining(9_999), TimerUrgency::Critical);
    }

    #[test]
    fn test_hud_progress() {
        let mut wave = controller(&settings());
        let mut events = Vec::new();
        wave.update(0, &mut events);
        let hud = wave.hud(30_000);
        assert_eq!(hud.time_remaining_ms, 30_000);
        assert!((hud.progress - 0.5).abs() < 1e-6);
        assert_eq!(hud.alive, 4);
    }
}
