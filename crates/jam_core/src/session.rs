//! Level session: owns one level instance and its schedule, and is the entry
//! point for clicks, time progression and presentation output.

use bevy_ecs::prelude::{Entity, Schedule, World};
use log::info;

use crate::arrivals::ArrivalQueue;
use crate::bus_queue::BusQueue;
use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::ecs::{Passenger, PassengerState};
use crate::error::LevelResult;
use crate::grid::{GridCoord, GridIndex};
use crate::level::{
    build_level, Countdown, LevelDefinition, LevelNotification, LevelNotifications, LevelOutcome,
    LevelStatus, SessionConfig,
};
use crate::motion::{MotionTiming, MotionTimingResource};
use crate::presentation::{PresentationCommand, PresentationCommands};
use crate::profiling::EventMetrics;
use crate::runner::{level_schedule, run_next_event, run_until, run_until_empty, run_until_settled};
use crate::telemetry::{FrontBusSnapshot, LevelSnapshot, LevelTelemetry};
use crate::waiting_area::WaitingArea;

pub struct LevelSession {
    definition: LevelDefinition,
    config: SessionConfig,
    world: World,
    schedule: Schedule,
}

impl LevelSession {
    pub fn new(definition: LevelDefinition, config: SessionConfig) -> LevelResult<Self> {
        let mut world = World::new();
        build_level(&mut world, &definition, &config)?;
        Ok(Self {
            definition,
            config,
            world,
            schedule: level_schedule(),
        })
    }

    /// Replaces the travel-time model. Survives [`LevelSession::reset`].
    pub fn with_motion_timing(mut self, timing: impl MotionTiming + 'static) -> Self {
        self.world
            .insert_resource(MotionTimingResource(Box::new(timing)));
        self
    }

    /// Rebuilds the level from its definition, dropping all pending events.
    pub fn reset(&mut self) -> LevelResult<()> {
        let mut world = World::new();
        if let Some(timing) = self.world.remove_resource::<MotionTimingResource>() {
            world.insert_resource(timing);
        }
        build_level(&mut world, &self.definition, &self.config)?;
        self.world = world;
        info!("level reset");
        Ok(())
    }

    pub fn definition(&self) -> &LevelDefinition {
        &self.definition
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    /// Queues a click on `passenger`, processed in order with other events.
    pub fn click(&mut self, passenger: Entity) {
        self.world.resource_mut::<SimulationClock>().schedule_in(
            0,
            EventKind::PassengerClicked,
            Some(EventSubject::Passenger(passenger)),
        );
    }

    /// Queues a click on `passenger` at `at_ms`, or now if that has passed.
    pub fn click_when(&mut self, passenger: Entity, at_ms: u64) {
        let mut clock = self.world.resource_mut::<SimulationClock>();
        let at_ms = at_ms.max(clock.now());
        clock.schedule_at(
            at_ms,
            EventKind::PassengerClicked,
            Some(EventSubject::Passenger(passenger)),
        );
    }

    /// Clicks the on-grid passenger standing at (`row`, `col`), if any.
    pub fn click_at(&mut self, row: i32, col: i32) -> Option<Entity> {
        let passenger = self.passenger_at(row, col)?;
        self.click(passenger);
        Some(passenger)
    }

    pub fn passenger_at(&mut self, row: i32, col: i32) -> Option<Entity> {
        let cell = GridCoord::new(row, col);
        self.world
            .query::<(Entity, &Passenger)>()
            .iter(&self.world)
            .find(|(_, p)| p.state == PassengerState::OnGrid && p.cell == cell)
            .map(|(entity, _)| entity)
    }

    /// On-grid passengers that currently have a path to the exit row, in
    /// row-major order.
    pub fn clickable_passengers(&mut self) -> Vec<Entity> {
        let mut on_grid: Vec<(GridCoord, Entity)> = self
            .world
            .query::<(Entity, &Passenger)>()
            .iter(&self.world)
            .filter(|(_, p)| p.state == PassengerState::OnGrid)
            .map(|(entity, p)| (p.cell, entity))
            .collect();
        on_grid.sort();
        let grid = self.world.resource::<GridIndex>();
        on_grid
            .into_iter()
            .filter(|(cell, _)| grid.find_path_to_exit_row(*cell).is_some())
            .map(|(_, entity)| entity)
            .collect()
    }

    /// Clickable passenger matching the front bus, otherwise the first
    /// clickable one as long as it would not take the last waiting slot.
    pub fn greedy_pick(&mut self) -> Option<Entity> {
        let clickable = self.clickable_passengers();
        let front = self.bus_queue().current_color();
        let matching = clickable.iter().copied().find(|&entity| {
            self.world
                .get::<Passenger>(entity)
                .is_some_and(|p| Some(p.color) == front)
        });
        if matching.is_some() {
            return matching;
        }
        if self.waiting_area().free_count() > 1 {
            clickable.first().copied()
        } else {
            None
        }
    }

    /// Plays the level until it concludes or `pick` has nothing left to
    /// click. Each click is issued once the previous moves have settled.
    /// Returns the number of processed events.
    pub fn autoplay<F>(&mut self, max_steps: usize, mut pick: F) -> usize
    where
        F: FnMut(&mut LevelSession) -> Option<Entity>,
    {
        let mut steps = 0;
        while steps < max_steps && !self.is_terminal() {
            steps += self.run_until_settled(max_steps - steps);
            if self.is_terminal() {
                break;
            }
            match pick(self) {
                Some(passenger) => self.click(passenger),
                None => break,
            }
        }
        steps + self.run_until_empty(max_steps.saturating_sub(steps))
    }

    pub fn step(&mut self) -> bool {
        run_next_event(&mut self.world, &mut self.schedule)
    }

    pub fn run_until(&mut self, until_ms: u64) -> usize {
        run_until(&mut self.world, &mut self.schedule, until_ms)
    }

    pub fn run_until_settled(&mut self, max_steps: usize) -> usize {
        run_until_settled(&mut self.world, &mut self.schedule, max_steps)
    }

    pub fn run_until_empty(&mut self, max_steps: usize) -> usize {
        run_until_empty(&mut self.world, &mut self.schedule, max_steps)
    }

    pub fn time_left(&self) -> u32 {
        self.world.resource::<Countdown>().time_left()
    }

    pub fn outcome(&self) -> LevelOutcome {
        self.world.resource::<LevelStatus>().outcome()
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_terminal()
    }

    pub fn drain_notifications(&mut self) -> Vec<LevelNotification> {
        self.world.resource_mut::<LevelNotifications>().drain()
    }

    pub fn drain_commands(&mut self) -> Vec<PresentationCommand> {
        self.world.resource_mut::<PresentationCommands>().drain()
    }

    pub fn telemetry(&self) -> &LevelTelemetry {
        self.world.resource::<LevelTelemetry>()
    }

    pub fn metrics(&self) -> &EventMetrics {
        self.world.resource::<EventMetrics>()
    }

    pub fn bus_queue(&self) -> &BusQueue {
        self.world.resource::<BusQueue>()
    }

    pub fn waiting_area(&self) -> &WaitingArea {
        self.world.resource::<WaitingArea>()
    }

    pub fn arrival_queue(&self) -> &ArrivalQueue {
        self.world.resource::<ArrivalQueue>()
    }

    pub fn grid(&self) -> &GridIndex {
        self.world.resource::<GridIndex>()
    }

    pub fn snapshot(&mut self) -> LevelSnapshot {
        let mut snapshot = LevelSnapshot {
            timestamp_ms: self.now(),
            outcome: self.outcome(),
            time_left: self.time_left(),
            ..LevelSnapshot::default()
        };
        for passenger in self.world.query::<&Passenger>().iter(&self.world) {
            match passenger.state {
                PassengerState::OnGrid => snapshot.passengers_on_grid += 1,
                PassengerState::EnRouteToExit => snapshot.passengers_en_route_to_exit += 1,
                PassengerState::AtExit => snapshot.passengers_in_arrival_queue += 1,
                PassengerState::EnRouteToWaiting { .. } => {
                    snapshot.passengers_en_route_to_waiting += 1
                }
                PassengerState::Waiting { .. } => snapshot.passengers_waiting += 1,
                PassengerState::EnRouteToBus { .. } => snapshot.passengers_en_route_to_bus += 1,
            }
        }
        let waiting = self.world.resource::<WaitingArea>();
        snapshot.waiting_free = waiting.free_count();
        snapshot.waiting_occupied = waiting.occupied_count();

        let buses = self.world.resource::<BusQueue>();
        snapshot.buses_queued = buses.queued_len();
        snapshot.buses_upcoming = buses.upcoming_len();
        snapshot.front_bus = buses.front().map(|bus| FrontBusSnapshot {
            color: bus.color,
            boarded: bus.boarded,
            reserved: bus.reserved,
            capacity: bus.capacity,
        });
        snapshot.departing = buses.is_departing();
        snapshot.pending_departures = buses.pending_departures();
        snapshot.departures = buses.departed_count();
        snapshot
    }
}
