//! Telemetry: click outcomes, boarding counts, waiting-area pressure and the
//! ordered departure log of a level instance.

use bevy_ecs::prelude::{Entity, Resource};
use serde::Serialize;

use crate::ecs::Color;
use crate::level::LevelOutcome;

/// One bus departure. `finished_at` is set once the bus has driven off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    /// 1-based departure order.
    pub order: usize,
    pub bus: Entity,
    pub color: Color,
    pub started_at: u64,
    pub finished_at: Option<u64>,
}

#[derive(Debug, Default, Resource)]
pub struct LevelTelemetry {
    pub clicks_accepted: u64,
    /// Clicks on a terminal level or on a passenger that already left the grid.
    pub clicks_ignored: u64,
    pub clicks_without_path: u64,
    pub passengers_boarded: u64,
    pub peak_waiting: usize,
    pub departures: Vec<DepartureRecord>,
}

impl LevelTelemetry {
    pub fn record_waiting_occupancy(&mut self, occupied: usize) {
        self.peak_waiting = self.peak_waiting.max(occupied);
    }

    pub fn record_departure_started(&mut self, bus: Entity, color: Color, now: u64) {
        let order = self.departures.len() + 1;
        self.departures.push(DepartureRecord {
            order,
            bus,
            color,
            started_at: now,
            finished_at: None,
        });
    }

    pub fn record_departure_finished(&mut self, bus: Entity, now: u64) {
        if let Some(record) = self
            .departures
            .iter_mut()
            .find(|record| record.bus == bus && record.finished_at.is_none())
        {
            record.finished_at = Some(now);
        }
    }

    pub fn departure_colors(&self) -> Vec<Color> {
        self.departures.iter().map(|record| record.color).collect()
    }
}

/// Aggregated counts at a point in time (simulation ms).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelSnapshot {
    pub timestamp_ms: u64,
    pub outcome: LevelOutcome,
    pub time_left: u32,
    pub passengers_on_grid: usize,
    pub passengers_en_route_to_exit: usize,
    pub passengers_in_arrival_queue: usize,
    pub passengers_en_route_to_waiting: usize,
    pub passengers_waiting: usize,
    pub passengers_en_route_to_bus: usize,
    pub waiting_free: usize,
    pub waiting_occupied: usize,
    pub buses_queued: usize,
    pub buses_upcoming: usize,
    pub front_bus: Option<FrontBusSnapshot>,
    pub departing: bool,
    pub pending_departures: usize,
    pub departures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrontBusSnapshot {
    pub color: Color,
    pub boarded: usize,
    pub reserved: usize,
    pub capacity: usize,
}
