//! World-space placement of grid cells, waiting slots and bus queue slots.
//!
//! Row 0 is the exit row nearest the waiting area; rows grow away from it
//! along negative `z`. Columns are centred on the grid anchor.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::grid::GridCoord;
use crate::level::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub z: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance(self, other: WorldPoint) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

#[derive(Debug, Clone, Resource)]
pub struct LevelLayout {
    cols: usize,
    waiting_slots: usize,
    cell_size: f64,
    bus_offset: f64,
    grid_anchor: WorldPoint,
    waiting_anchor: WorldPoint,
    bus_anchor: WorldPoint,
    drive_off_distance: f64,
}

impl LevelLayout {
    pub fn new(cols: usize, waiting_slots: usize, config: &SessionConfig) -> Self {
        Self {
            cols,
            waiting_slots,
            cell_size: config.cell_size,
            bus_offset: config.bus_offset,
            grid_anchor: config.grid_anchor,
            waiting_anchor: config.waiting_anchor,
            bus_anchor: config.bus_anchor,
            drive_off_distance: config.bus_drive_off_distance,
        }
    }

    pub fn cell_to_world(&self, cell: GridCoord) -> WorldPoint {
        let half = (self.cols as f64 - 1.0) / 2.0;
        WorldPoint::new(
            self.grid_anchor.x + (cell.col as f64 - half) * self.cell_size,
            self.grid_anchor.z - cell.row as f64 * self.cell_size,
        )
    }

    pub fn waiting_slot(&self, slot: usize) -> WorldPoint {
        let half = (self.waiting_slots as f64 - 1.0) / 2.0;
        WorldPoint::new(
            self.waiting_anchor.x + (slot as f64 - half) * self.cell_size,
            self.waiting_anchor.z,
        )
    }

    /// Boarding point: passengers walk to the front bus position.
    pub fn bus_anchor(&self) -> WorldPoint {
        self.bus_anchor
    }

    pub fn bus_slot(&self, queue_position: usize) -> WorldPoint {
        WorldPoint::new(
            self.bus_anchor.x + self.bus_offset * queue_position as f64,
            self.bus_anchor.z,
        )
    }

    pub fn drive_off_target(&self, from: WorldPoint) -> WorldPoint {
        WorldPoint::new(from.x + self.drive_off_distance, from.z)
    }
}
