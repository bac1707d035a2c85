//! Fixed-capacity waiting slots for passengers that reached the exit row but
//! could not board.

use bevy_ecs::prelude::{Entity, Resource};
use log::warn;

use crate::ecs::Color;
use crate::error::{LevelError, LevelResult};

const MIN_SLOTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOccupant {
    pub passenger: Entity,
    pub color: Color,
}

#[derive(Debug, Clone, Resource)]
pub struct WaitingArea {
    slots: Vec<Option<SlotOccupant>>,
}

impl WaitingArea {
    pub fn build(size: usize) -> LevelResult<Self> {
        if size < MIN_SLOTS {
            return Err(LevelError::invalid(format!(
                "waiting area needs at least {MIN_SLOTS} slots, got {size}"
            )));
        }
        Ok(Self {
            slots: vec![None; size],
        })
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.size() - self.free_count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn slot_of(&self, passenger: Entity) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(occupant) if occupant.passenger == passenger))
    }

    /// Assigns the lowest free slot. `None` means the area is full.
    pub fn allocate(&mut self, passenger: Entity, color: Color) -> Option<usize> {
        debug_assert!(
            self.slot_of(passenger).is_none(),
            "passenger already holds a waiting slot"
        );
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(SlotOccupant { passenger, color });
        Some(index)
    }

    /// Frees a slot. Releasing a free or unknown slot is logged and ignored.
    pub fn release(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => match entry.take() {
                Some(_) => true,
                None => {
                    warn!("waiting slot {slot} released while already free");
                    false
                }
            },
            None => {
                warn!(
                    "waiting slot {slot} out of range (size {})",
                    self.slots.len()
                );
                false
            }
        }
    }

    /// Removes up to `max` passengers of `color`, scanning in slot order.
    /// Selected slots are free as soon as this returns.
    pub fn take_matching(&mut self, color: Color, max: usize) -> Vec<(usize, Entity)> {
        let mut taken = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if taken.len() >= max {
                break;
            }
            if let Some(occupant) = *slot {
                if occupant.color == color {
                    taken.push((index, occupant.passenger));
                    *slot = None;
                }
            }
        }
        taken
    }

    pub fn occupants(&self) -> impl Iterator<Item = (usize, SlotOccupant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|occupant| (index, occupant)))
    }
}
