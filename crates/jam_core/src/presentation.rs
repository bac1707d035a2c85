//! Outbox of commands for the presentation layer.
//!
//! The core never renders or animates. It records what should be shown and
//! the presentation layer drains the outbox after each step; completions come
//! back as clock events.

use bevy_ecs::prelude::{Entity, Resource};

use crate::ecs::Color;
use crate::layout::WorldPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Passenger(Color),
    Bus(Color),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresentationCommand {
    Spawn {
        entity: Entity,
        kind: EntityKind,
        position: WorldPoint,
    },
    MoveTo {
        entity: Entity,
        target: WorldPoint,
        speed: f64,
        duration_ms: u64,
        ticket: u64,
    },
    /// Stop the move identified by `ticket`; a newer move follows.
    Cancel { entity: Entity, ticket: u64 },
    Destroy { entity: Entity },
    BusLoad {
        entity: Entity,
        boarded: usize,
        capacity: usize,
    },
}

impl PresentationCommand {
    pub fn entity(&self) -> Entity {
        match self {
            PresentationCommand::Spawn { entity, .. }
            | PresentationCommand::MoveTo { entity, .. }
            | PresentationCommand::Cancel { entity, .. }
            | PresentationCommand::Destroy { entity }
            | PresentationCommand::BusLoad { entity, .. } => *entity,
        }
    }
}

#[derive(Debug, Default, Resource)]
pub struct PresentationCommands {
    pending: Vec<PresentationCommand>,
}

impl PresentationCommands {
    pub fn push(&mut self, command: PresentationCommand) {
        self.pending.push(command);
    }

    pub fn drain(&mut self) -> Vec<PresentationCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[PresentationCommand] {
        &self.pending
    }
}
