//! Level runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. Exactly one event system reacts per step.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::profiling::EventMetrics;
use crate::systems::{
    boarding::bus_reached_system,
    click::passenger_clicked_system,
    countdown::countdown_tick_system,
    departure::{bus_drive_off_finished_system, queue_shifted_system},
    path_step::path_step_system,
    waiting_arrival::waiting_slot_reached_system,
};

/// Run condition: the current event is of `kind`.
fn on_event(kind: EventKind) -> impl FnMut(Option<Res<CurrentEvent>>) -> bool + Clone {
    move |event: Option<Res<CurrentEvent>>| event.map(|e| e.0.kind == kind).unwrap_or(false)
}

/// Runs one step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `false` if the clock was empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));

    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind);
    }

    schedule.run(world);
    true
}

/// Runs steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs every event scheduled at or before `until_ms`.
pub fn run_until(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    let mut steps = 0;
    while world
        .resource::<SimulationClock>()
        .next_event_time()
        .is_some_and(|ts| ts <= until_ms)
    {
        if !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Runs steps until nothing but countdown ticks is left to process, i.e. every
/// move and bus transition has completed.
pub fn run_until_settled(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps
        && !world
            .resource::<SimulationClock>()
            .only_pending(EventKind::CountdownTick)
        && run_next_event(world, schedule)
    {
        steps += 1;
    }
    steps
}

/// Builds the level schedule: one system per event kind plus [apply_deferred]
/// so despawned passengers and spawned buses are applied before the next step.
pub fn level_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems(
        (
            (
                passenger_clicked_system.run_if(on_event(EventKind::PassengerClicked)),
                path_step_system.run_if(on_event(EventKind::PathStep)),
                waiting_slot_reached_system.run_if(on_event(EventKind::WaitingSlotReached)),
                bus_reached_system.run_if(on_event(EventKind::BusReached)),
                queue_shifted_system.run_if(on_event(EventKind::QueueShifted)),
                bus_drive_off_finished_system.run_if(on_event(EventKind::BusDriveOffFinished)),
                countdown_tick_system.run_if(on_event(EventKind::CountdownTick)),
            ),
            apply_deferred,
        )
            .chain(),
    );

    schedule
}
