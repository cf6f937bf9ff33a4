//! Shot hit-testing and routing
//!
//! A shot lands on at most one target: live targets are tested in spawn
//! order and the first hit-box containing the point takes the hit, even
//! when several overlap.

use glam::Vec2;

use super::target::{Target, TargetId};
use crate::Millis;

/// Axis-aligned box, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl HitBox {
    /// Square of side `size` at `top_left`, padded by `margin` on all sides
    pub fn around(top_left: Vec2, size: f32, margin: f32) -> Self {
        Self {
            min: top_left - Vec2::splat(margin),
            max: top_left + Vec2::splat(size + margin),
        }
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Deliver one shot to the first target it hits
///
/// `targets` must be in spawn order. Returns the id of the target that
/// started dying, if any.
pub fn route_fire(targets: &mut [Target], point: Vec2, now: Millis) -> Option<TargetId> {
    let target = targets.iter_mut().find(|t| t.check_hit(point))?;
    target.hit(now);
    Some(target.id)
}
