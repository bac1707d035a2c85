#![allow(dead_code)]

pub mod invariants;

use bevy_ecs::prelude::Entity;
use jam_core::ecs::{Passenger, PassengerState};
use jam_core::presentation::PresentationCommand;
use jam_core::LevelSession;

/// Upper bound on processed events for a single settle call.
pub const MAX_STEPS: usize = 10_000;

pub fn passenger(session: &LevelSession, entity: Entity) -> Option<Passenger> {
    session
        .world()
        .get_entity(entity)
        .and_then(|e| e.get::<Passenger>().copied())
}

pub fn passenger_state(session: &LevelSession, entity: Entity) -> Option<PassengerState> {
    passenger(session, entity).map(|p| p.state)
}

pub fn passenger_count(session: &mut LevelSession) -> usize {
    let world = session.world_mut();
    world.query::<&Passenger>().iter(world).count()
}

/// Clicks the passenger at (`row`, `col`).
///
/// # Panics
///
/// Panics if no on-grid passenger stands there.
pub fn click(session: &mut LevelSession, row: i32, col: i32) -> Entity {
    session
        .click_at(row, col)
        .unwrap_or_else(|| panic!("no passenger at ({row}, {col})"))
}

pub fn settle(session: &mut LevelSession) -> usize {
    let steps = session.run_until_settled(MAX_STEPS);
    assert!(steps < MAX_STEPS, "level did not settle");
    steps
}

pub fn cancels_for(commands: &[PresentationCommand], entity: Entity) -> usize {
    commands
        .iter()
        .filter(|c| c.entity() == entity && matches!(c, PresentationCommand::Cancel { .. }))
        .count()
}
