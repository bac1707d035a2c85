use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::grid::GridCoord;
use crate::layout::WorldPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerState {
    OnGrid,
    EnRouteToExit,
    /// Reached the exit row; held in the arrival queue until routed.
    AtExit,
    EnRouteToWaiting { slot: usize },
    Waiting { slot: usize },
    EnRouteToBus { bus: Entity },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Passenger {
    pub color: Color,
    pub cell: GridCoord,
    pub state: PassengerState,
}

impl Passenger {
    pub fn on_grid(color: Color, cell: GridCoord) -> Self {
        Self {
            color,
            cell,
            state: PassengerState::OnGrid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Boarding,
    Full,
    Departing,
}

/// Presentation-facing mirror of a queued bus. Seat accounting lives in
/// [`crate::bus_queue::BusQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Bus {
    pub color: Color,
    pub queue_position: usize,
    pub state: BusState,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Position(pub WorldPoint);

/// Per-entity motion handle. Each started motion gets a fresh ticket; a
/// completion event is honored only when it carries the current ticket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct Motion {
    pub ticket: u64,
    pub target: Option<WorldPoint>,
}

impl Motion {
    pub fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    /// Starts a new motion, superseding any in-flight one. Returns the
    /// ticket of the superseded motion, if there was one.
    pub fn begin(&mut self, target: WorldPoint) -> (u64, Option<u64>) {
        let superseded = self.target.map(|_| self.ticket);
        self.ticket += 1;
        self.target = Some(target);
        (self.ticket, superseded)
    }

    /// Completes the motion if `ticket` is current, returning its target.
    pub fn complete(&mut self, ticket: u64) -> Option<WorldPoint> {
        if ticket != self.ticket {
            return None;
        }
        self.target.take()
    }
}

/// Remaining cells of a passenger's path toward the exit row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Component)]
pub struct PathPlayback {
    pub remaining: std::collections::VecDeque<GridCoord>,
}
