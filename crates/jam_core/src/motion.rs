//! Travel-time models for passenger moves.
//!
//! The model is stored as a `Box<dyn MotionTiming>` resource so a
//! presentation layer can substitute its own animation curves while the core
//! keeps scheduling completions on the event clock.

use bevy_ecs::prelude::Resource;

use crate::clock::ONE_SEC_MS;
use crate::layout::WorldPoint;

pub trait MotionTiming: Send + Sync {
    /// Milliseconds needed to travel from `from` to `to` at `speed` world
    /// units per second.
    fn travel_ms(&self, from: WorldPoint, to: WorldPoint, speed: f64) -> u64;
}

/// Straight-line travel at constant speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantSpeedTiming;

impl MotionTiming for ConstantSpeedTiming {
    fn travel_ms(&self, from: WorldPoint, to: WorldPoint, speed: f64) -> u64 {
        let distance = from.distance(to);
        if distance <= 0.0 || speed <= 0.0 {
            return 0;
        }
        (distance / speed * ONE_SEC_MS as f64).round() as u64
    }
}

/// Every move takes the same time regardless of distance. Handy for tests
/// that reason about event order rather than geometry.
#[derive(Debug, Clone, Copy)]
pub struct FixedDurationTiming(pub u64);

impl MotionTiming for FixedDurationTiming {
    fn travel_ms(&self, _from: WorldPoint, _to: WorldPoint, _speed: f64) -> u64 {
        self.0
    }
}

#[derive(Resource)]
pub struct MotionTimingResource(pub Box<dyn MotionTiming>);

impl Default for MotionTimingResource {
    fn default() -> Self {
        Self(Box::new(ConstantSpeedTiming))
    }
}

/// Speed that covers `from` → `to` in exactly `duration_ms`.
pub fn speed_for(from: WorldPoint, to: WorldPoint, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    from.distance(to) / (duration_ms as f64 / ONE_SEC_MS as f64)
}
