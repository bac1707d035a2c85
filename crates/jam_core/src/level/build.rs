use bevy_ecs::prelude::World;
use log::info;

use crate::arrivals::ArrivalQueue;
use crate::bus_queue::BusQueue;
use crate::clock::SimulationClock;
use crate::ecs::{Bus, BusState, Motion, Passenger, PathPlayback, Position};
use crate::error::LevelResult;
use crate::grid::GridIndex;
use crate::layout::LevelLayout;
use crate::motion::MotionTimingResource;
use crate::presentation::{EntityKind, PresentationCommand, PresentationCommands};
use crate::profiling::EventMetrics;
use crate::telemetry::LevelTelemetry;
use crate::waiting_area::WaitingArea;

use super::{
    Countdown, LevelDefinition, LevelNotification, LevelNotifications, LevelStatus, SessionConfig,
};

/// Populates `world` with every resource and entity of a fresh level
/// instance. A motion timing model already present in `world` is kept.
pub fn build_level(
    world: &mut World,
    definition: &LevelDefinition,
    config: &SessionConfig,
) -> LevelResult<()> {
    definition.validate()?;
    config.validate()?;

    let grid = GridIndex::build(definition.rows, definition.cols, &definition.cells)?;
    let waiting = WaitingArea::build(definition.waiting_area_size)?;
    let layout = LevelLayout::new(definition.cols, definition.waiting_area_size, config);
    let mut outbox = PresentationCommands::default();

    for (cell, color) in definition.passengers() {
        let position = layout.cell_to_world(cell);
        let entity = world
            .spawn((
                Passenger::on_grid(color, cell),
                Position(position),
                Motion::default(),
                PathPlayback::default(),
            ))
            .id();
        outbox.push(PresentationCommand::Spawn {
            entity,
            kind: EntityKind::Passenger(color),
            position,
        });
    }

    let mut buses = BusQueue::default();
    buses.initialize(
        &definition.buses,
        config.bus_capacity,
        config.lookahead,
        |color, queue_position| {
            let position = layout.bus_slot(queue_position);
            let entity = world
                .spawn((
                    Bus {
                        color,
                        queue_position,
                        state: BusState::Boarding,
                    },
                    Position(position),
                    Motion::default(),
                ))
                .id();
            outbox.push(PresentationCommand::Spawn {
                entity,
                kind: EntityKind::Bus(color),
                position,
            });
            entity
        },
    );

    info!(
        "level built: {}x{} grid, {} passengers, {} buses, {} waiting slots, {}s limit",
        definition.rows,
        definition.cols,
        definition.passenger_count(),
        definition.buses.len(),
        definition.waiting_area_size,
        definition.time_limit_secs
    );

    let mut notifications = LevelNotifications::default();
    notifications.push(LevelNotification::Reset);

    world.insert_resource(grid);
    world.insert_resource(waiting);
    world.insert_resource(buses);
    world.insert_resource(layout);
    world.insert_resource(config.clone());
    world.insert_resource(ArrivalQueue::default());
    world.insert_resource(SimulationClock::default());
    world.insert_resource(LevelStatus::default());
    world.insert_resource(Countdown::new(definition.time_limit_secs));
    world.insert_resource(LevelTelemetry::default());
    world.insert_resource(EventMetrics::default());
    world.insert_resource(notifications);
    world.insert_resource(outbox);
    if !world.contains_resource::<MotionTimingResource>() {
        world.insert_resource(MotionTimingResource::default());
    }
    Ok(())
}
