use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};

/// Passengers that reached the exit row and are not yet routed to a bus or a
/// waiting slot, in arrival order.
#[derive(Debug, Default, Resource)]
pub struct ArrivalQueue(VecDeque<Entity>);

impl ArrivalQueue {
    pub fn push(&mut self, passenger: Entity) {
        debug_assert!(!self.contains(passenger), "passenger queued twice");
        self.0.push_back(passenger);
    }

    pub fn front(&self) -> Option<Entity> {
        self.0.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<Entity> {
        self.0.pop_front()
    }

    pub fn contains(&self, passenger: Entity) -> bool {
        self.0.contains(&passenger)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }
}
