use std::path::Path;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{LevelError, LevelResult};
use crate::layout::WorldPoint;

const DEFAULT_BUS_CAPACITY: usize = 3;
/// Buses materialized ahead of their turn.
const DEFAULT_LOOKAHEAD: usize = 3;
/// World units per second.
const DEFAULT_PASSENGER_SPEED: f64 = 4.0;
const DEFAULT_CELL_SIZE: f64 = 1.0;
const DEFAULT_BUS_OFFSET: f64 = -3.5;
const DEFAULT_BUS_SHIFT_MS: u64 = 500;
const DEFAULT_BUS_DEPART_MS: u64 = 1000;
const DEFAULT_BUS_DRIVE_OFF_DISTANCE: f64 = 20.0;

/// Tunables shared by every level of a session. Missing JSON fields fall
/// back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct SessionConfig {
    pub bus_capacity: usize,
    pub lookahead: usize,
    pub passenger_speed: f64,
    pub cell_size: f64,
    /// Spacing between queued buses along x; negative queues to the left.
    pub bus_offset: f64,
    pub bus_shift_ms: u64,
    pub bus_depart_ms: u64,
    pub bus_drive_off_distance: f64,
    pub grid_anchor: WorldPoint,
    pub waiting_anchor: WorldPoint,
    pub bus_anchor: WorldPoint,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bus_capacity: DEFAULT_BUS_CAPACITY,
            lookahead: DEFAULT_LOOKAHEAD,
            passenger_speed: DEFAULT_PASSENGER_SPEED,
            cell_size: DEFAULT_CELL_SIZE,
            bus_offset: DEFAULT_BUS_OFFSET,
            bus_shift_ms: DEFAULT_BUS_SHIFT_MS,
            bus_depart_ms: DEFAULT_BUS_DEPART_MS,
            bus_drive_off_distance: DEFAULT_BUS_DRIVE_OFF_DISTANCE,
            grid_anchor: WorldPoint::new(0.0, 0.0),
            waiting_anchor: WorldPoint::new(0.0, 2.0),
            bus_anchor: WorldPoint::new(0.0, 4.0),
        }
    }
}

impl SessionConfig {
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn from_json_str(json: &str) -> LevelResult<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> LevelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> LevelResult<()> {
        if self.bus_capacity < 1 {
            return Err(LevelError::invalid("bus capacity must be at least 1"));
        }
        if self.lookahead < 1 {
            return Err(LevelError::invalid("bus lookahead must be at least 1"));
        }
        if !self.passenger_speed.is_finite() || self.passenger_speed <= 0.0 {
            return Err(LevelError::invalid("passenger speed must be positive and finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "bus_capacity": 1 }"#).expect("config");
        assert_eq!(config.bus_capacity, 1);
        assert_eq!(config.lookahead, DEFAULT_LOOKAHEAD);
        assert_eq!(config.bus_shift_ms, DEFAULT_BUS_SHIFT_MS);
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(SessionConfig::from_json_str(r#"{ "bus_capacity": 0 }"#).is_err());
        assert!(SessionConfig::default().with_lookahead(0).validate().is_err());
    }

    #[test]
    fn rejects_non_positive_or_non_finite_speed() {
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SessionConfig {
                passenger_speed: speed,
                ..SessionConfig::default()
            };
            assert!(config.validate().is_err(), "speed {speed} accepted");
        }
    }
}
