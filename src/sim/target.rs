//! Targets: the aliens the player shoots
//!
//! A target seeks a random goal inside the playfield, idles when it gets
//! there, and once hit spends exactly `DYING_DURATION_MS` dying before it is
//! removed. Lifecycle only moves forward: Alive → Dying → Removed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::animation::{Animation, Animator};
use super::collision::HitBox;
use crate::consts::{DYING_DURATION_MS, DYING_MIN_ALPHA};
use crate::settings::{Playfield, TargetSettings};
use crate::{Millis, elapsed_ms};

/// Opaque handle, unique for the life of a session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TargetId(pub u32);

/// Where a target is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    /// Hit at `since`; removed once `DYING_DURATION_MS` has passed
    Dying { since: Millis },
    /// Terminal; reaped at the end of the tick
    Removed,
}

impl Lifecycle {
    /// Counts toward the wave (alive or still dying)
    pub fn is_active(&self) -> bool {
        !matches!(self, Lifecycle::Removed)
    }
}

/// What the render layer needs to draw one target
#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub id: TargetId,
    pub pos: Vec2,
    pub footprint: f32,
    pub animation: Animation,
    pub frame_index: u32,
    pub lifecycle: Lifecycle,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub id: TargetId,
    /// Top-left corner of the footprint
    pub pos: Vec2,
    /// Motion goal
    pub goal: Vec2,
    lifecycle: Lifecycle,
    animator: Animator,
    tuning: TargetSettings,
    /// Largest allowed `pos` on each axis
    bounds: Vec2,
    /// Period of this target's re-target timer
    retarget_every: Millis,
}

impl Target {
    /// Place a new target at a random in-bounds point, seeking another
    pub fn spawn<R: Rng + ?Sized>(
        id: TargetId,
        tuning: &TargetSettings,
        playfield: &Playfield,
        rng: &mut R,
    ) -> Self {
        let bounds = playfield.max_position(tuning.footprint());
        let pos = random_point(rng, bounds);
        let goal = random_point(rng, bounds);
        let retarget_every = rng.random_range(tuning.retarget_min_ms..=tuning.retarget_max_ms);

        Self {
            id,
            pos,
            goal,
            lifecycle: Lifecycle::Alive,
            animator: Animator::new(Animation::Moving),
            tuning: *tuning,
            bounds,
            retarget_every,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Dying { .. })
    }

    pub fn is_removed(&self) -> bool {
        self.lifecycle == Lifecycle::Removed
    }

    pub fn animation(&self) -> Animation {
        self.animator.current()
    }

    pub fn frame_index(&self) -> u32 {
        self.animator.frame_index()
    }

    pub fn footprint(&self) -> f32 {
        self.tuning.footprint()
    }

    pub fn retarget_interval(&self) -> Millis {
        self.retarget_every
    }

    /// Advance one tick
    pub fn update(&mut self, now: Millis) {
        match self.lifecycle {
            Lifecycle::Removed => return,
            Lifecycle::Dying { since } => {
                if elapsed_ms(now, since) >= DYING_DURATION_MS {
                    self.lifecycle = Lifecycle::Removed;
                    return;
                }
            }
            Lifecycle::Alive => self.seek(),
        }

        self.pos = self.pos.clamp(Vec2::ZERO, self.bounds);
        self.animator.advance(self.tuning.animation_speed);
    }

    fn seek(&mut self) {
        let to_goal = self.goal - self.pos;
        let distance = to_goal.length();
        if distance > self.tuning.arrival_epsilon {
            self.pos += to_goal / distance * self.tuning.speed;
        } else {
            // Hold here until the next re-target timer
            self.animator.set(Animation::Idle);
        }
    }

    /// Periodic re-target; ignored unless alive
    pub fn request_new_goal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.goal = random_point(rng, self.bounds);
        self.animator.set(Animation::Moving);
        true
    }

    /// Hit-box: the square footprint grown by the margin on every side
    pub fn hit_box(&self) -> HitBox {
        HitBox::around(self.pos, self.footprint(), self.tuning.hit_margin)
    }

    /// Would a shot at `point` hit this target?
    pub fn check_hit(&self, point: Vec2) -> bool {
        self.is_alive() && self.hit_box().contains(point)
    }

    /// Start dying. Returns false (and does nothing) unless alive.
    pub fn hit(&mut self, now: Millis) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.lifecycle = Lifecycle::Dying { since: now };
        self.animator.set(Animation::Dying);
        true
    }

    /// Force removal; idempotent
    pub fn destroy(&mut self) {
        self.lifecycle = Lifecycle::Removed;
    }

    /// Delay the dying clock by a paused duration
    pub fn shift_timers(&mut self, delta: Millis) {
        if let Lifecycle::Dying { since } = &mut self.lifecycle {
            *since = since.saturating_add(delta);
        }
    }

    /// Fade hint for the renderer
    pub fn alpha(&self, now: Millis) -> f32 {
        match self.lifecycle {
            Lifecycle::Dying { since } => {
                let t = elapsed_ms(now, since) as f32 / DYING_DURATION_MS as f32;
                (1.0 - t).max(DYING_MIN_ALPHA)
            }
            _ => 1.0,
        }
    }

    pub fn view(&self, now: Millis) -> TargetView {
        TargetView {
            id: self.id,
            pos: self.pos,
            footprint: self.footprint(),
            animation: self.animation(),
            frame_index: self.frame_index(),
            lifecycle: self.lifecycle,
            alpha: self.alpha(now),
        }
    }
}

fn random_point<R: Rng + ?Sized>(rng: &mut R, bounds: Vec2) -> Vec2 {
    Vec2::new(
        rng.random_range(0.0..=bounds.x),
        rng.random_range(0.0..=bounds.y),
    )
}
