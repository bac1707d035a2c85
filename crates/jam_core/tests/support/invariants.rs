use bevy_ecs::prelude::Entity;
use jam_core::ecs::{Passenger, PassengerState};
use jam_core::grid::CellState;
use jam_core::level::LevelNotification;
use jam_core::LevelSession;

/// Checks the conservation and ownership properties that must hold between
/// any two events.
pub fn assert_invariants(session: &mut LevelSession) {
    let passengers: Vec<(Entity, Passenger)> = {
        let world = session.world_mut();
        world
            .query::<(Entity, &Passenger)>()
            .iter(world)
            .map(|(entity, p)| (entity, *p))
            .collect()
    };

    let waiting = session.waiting_area();
    assert_eq!(
        waiting.free_count() + waiting.occupied_count(),
        waiting.size(),
        "waiting slots not conserved"
    );

    let arrivals = session.arrival_queue();
    for (entity, p) in &passengers {
        let queued = arrivals.contains(*entity);
        let slot = waiting.slot_of(*entity);
        match p.state {
            PassengerState::OnGrid | PassengerState::EnRouteToExit => {
                assert!(!queued && slot.is_none(), "{entity:?} owned twice: {p:?}");
            }
            PassengerState::AtExit => {
                assert!(queued && slot.is_none(), "{entity:?} not queued: {p:?}");
            }
            PassengerState::EnRouteToWaiting { slot: expected }
            | PassengerState::Waiting { slot: expected } => {
                assert!(!queued, "{entity:?} queued while holding a slot");
                assert_eq!(slot, Some(expected), "{entity:?} slot mismatch");
            }
            PassengerState::EnRouteToBus { .. } => {
                assert!(!queued && slot.is_none(), "{entity:?} owned twice: {p:?}");
            }
        }
        if p.state == PassengerState::OnGrid {
            assert_eq!(
                session.grid().cell(p.cell),
                Some(CellState::Occupied),
                "{entity:?} stands on a free cell"
            );
        }
    }

    let on_grid = passengers
        .iter()
        .filter(|(_, p)| p.state == PassengerState::OnGrid)
        .count();
    assert_eq!(session.grid().count(CellState::Occupied), on_grid);

    for queued in arrivals.iter() {
        assert!(
            passengers.iter().any(|(entity, _)| *entity == queued),
            "arrival queue holds a removed passenger"
        );
    }
    for (_, occupant) in waiting.occupants() {
        assert!(
            passengers.iter().any(|(entity, _)| *entity == occupant.passenger),
            "waiting slot holds a removed passenger"
        );
    }

    let buses = session.bus_queue();
    for bus in buses.queued() {
        assert!(
            bus.boarded + bus.reserved <= bus.capacity,
            "bus over capacity: {bus:?}"
        );
    }
    assert!(buses.pending_departures() <= buses.queued_len());
}

/// Terminal notifications seen so far: at most one, never both kinds.
pub fn assert_single_terminal(notifications: &[LevelNotification]) {
    let terminal = notifications
        .iter()
        .filter(|n| !matches!(n, LevelNotification::Reset))
        .count();
    assert!(terminal <= 1, "terminal fired more than once: {notifications:?}");
}
