//! Arrival dispatching shared by the event systems.
//!
//! [`Dispatch`] bundles every resource a routing decision touches. Each event
//! system runs one decision block through it, so decisions never interleave:
//! the bus queue, waiting area and arrival queue are only ever mutated here.

use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut, Without};
use bevy_ecs::system::SystemParam;
use log::{debug, error, info, trace, warn};

use crate::arrivals::ArrivalQueue;
use crate::bus_queue::BusQueue;
use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::ecs::{Bus, BusState, Color, Motion, Passenger, PassengerState, Position};
use crate::layout::{LevelLayout, WorldPoint};
use crate::level::{
    LevelNotification, LevelNotifications, LevelOutcome, LevelStatus, LossReason, SessionConfig,
};
use crate::motion::{speed_for, MotionTimingResource};
use crate::presentation::{EntityKind, PresentationCommand, PresentationCommands};
use crate::telemetry::LevelTelemetry;
use crate::waiting_area::WaitingArea;

#[derive(SystemParam)]
pub struct Dispatch<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub clock: ResMut<'w, SimulationClock>,
    pub config: Res<'w, SessionConfig>,
    pub layout: Res<'w, LevelLayout>,
    pub timing: Res<'w, MotionTimingResource>,
    pub arrivals: ResMut<'w, ArrivalQueue>,
    pub waiting: ResMut<'w, WaitingArea>,
    pub buses: ResMut<'w, BusQueue>,
    pub status: ResMut<'w, LevelStatus>,
    pub notifications: ResMut<'w, LevelNotifications>,
    pub outbox: ResMut<'w, PresentationCommands>,
    pub telemetry: ResMut<'w, LevelTelemetry>,
    pub passengers: Query<
        'w,
        's,
        (
            &'static mut Passenger,
            &'static mut Motion,
            &'static mut Position,
        ),
    >,
    pub bus_views: Query<
        'w,
        's,
        (&'static mut Bus, &'static mut Motion, &'static mut Position),
        Without<Passenger>,
    >,
}

impl Dispatch<'_, '_> {
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn passenger(&self, passenger: Entity) -> Option<Passenger> {
        self.passengers.get(passenger).ok().map(|(p, _, _)| *p)
    }

    /// Replaces a passenger's lifecycle state, returning the previous one.
    pub fn set_passenger_state(
        &mut self,
        passenger: Entity,
        state: PassengerState,
    ) -> Option<PassengerState> {
        let (mut p, _, _) = self.passengers.get_mut(passenger).ok()?;
        Some(std::mem::replace(&mut p.state, state))
    }

    /// Starts a passenger move toward `target`. An in-flight move is
    /// cancelled first; its completion event will carry a stale ticket.
    pub fn move_passenger(&mut self, passenger: Entity, target: WorldPoint, completion: EventKind) {
        let Ok((_, mut motion, position)) = self.passengers.get_mut(passenger) else {
            warn!("move requested for unknown passenger {passenger:?}");
            return;
        };
        let (ticket, superseded) = motion.begin(target);
        if let Some(stale) = superseded {
            trace!("passenger {passenger:?} move {stale} superseded by {ticket}");
            self.outbox.push(PresentationCommand::Cancel {
                entity: passenger,
                ticket: stale,
            });
        }
        let speed = self.config.passenger_speed;
        let duration_ms = self.timing.0.travel_ms(position.0, target, speed);
        self.outbox.push(PresentationCommand::MoveTo {
            entity: passenger,
            target,
            speed,
            duration_ms,
            ticket,
        });
        self.clock.schedule_motion_in(
            duration_ms,
            completion,
            EventSubject::Passenger(passenger),
            ticket,
        );
    }

    /// Settles the passenger at its move target when `ticket` is still the
    /// current move. Returns `false` for stale or unknown completions.
    pub fn finish_passenger_move(&mut self, passenger: Entity, ticket: u64) -> bool {
        let Ok((_, mut motion, mut position)) = self.passengers.get_mut(passenger) else {
            return false;
        };
        match motion.complete(ticket) {
            Some(target) => {
                position.0 = target;
                true
            }
            None => {
                trace!("dropping stale completion {ticket} for passenger {passenger:?}");
                false
            }
        }
    }

    /// Hands a passenger that reached the exit row to the arrival queue.
    /// While a departure runs the queue is held and drained once the shift
    /// completes.
    pub fn passenger_reached_exit(&mut self, passenger: Entity) {
        self.set_passenger_state(passenger, PassengerState::AtExit);
        self.arrivals.push(passenger);
        if self.buses.is_departing() {
            debug!(
                "passenger {passenger:?} held in arrival queue during departure ({} queued)",
                self.arrivals.len()
            );
            return;
        }
        self.drain_arrivals();
    }

    /// Routes queued arrivals front to back. The front passenger boards when
    /// the front bus matches and has a free seat, otherwise takes a waiting
    /// slot; when neither is possible draining stops so no later passenger
    /// overtakes it.
    pub fn drain_arrivals(&mut self) {
        if self.is_terminal() {
            return;
        }
        while let Some(passenger) = self.arrivals.front() {
            let Some(color) = self.passenger(passenger).map(|p| p.color) else {
                error!("arrival queue holds unknown passenger {passenger:?}");
                self.arrivals.pop_front();
                continue;
            };
            if self.buses.can_board(color) {
                self.arrivals.pop_front();
                self.board(passenger);
            } else if let Some(slot) = self.waiting.allocate(passenger, color) {
                self.arrivals.pop_front();
                self.send_to_waiting(passenger, slot);
            } else {
                debug!(
                    "arrival queue blocked by {passenger:?} ({color:?}), {} queued",
                    self.arrivals.len()
                );
                break;
            }
        }
    }

    /// Reserves a seat on the front bus and walks the passenger to it.
    pub fn board(&mut self, passenger: Entity) -> bool {
        let Some(bus) = self.buses.reserve_seat() else {
            error!("no seat to reserve for passenger {passenger:?}");
            return false;
        };
        if let Some(PassengerState::EnRouteToBus { bus: previous }) =
            self.set_passenger_state(passenger, PassengerState::EnRouteToBus { bus })
        {
            self.buses.cancel_reservation(previous);
        }
        debug!("passenger {passenger:?} boarding bus {bus:?}");
        let target = self.layout.bus_anchor();
        self.move_passenger(passenger, target, EventKind::BusReached);
        true
    }

    fn send_to_waiting(&mut self, passenger: Entity, slot: usize) {
        self.set_passenger_state(passenger, PassengerState::EnRouteToWaiting { slot });
        let occupied = self.waiting.occupied_count();
        self.telemetry.record_waiting_occupancy(occupied);
        debug!("passenger {passenger:?} sent to waiting slot {slot}");
        let target = self.layout.waiting_slot(slot);
        self.move_passenger(passenger, target, EventKind::WaitingSlotReached);
    }

    /// Boards waiting passengers matching the front bus, in slot order, up to
    /// its free seats. Passengers still walking to their slot are redirected.
    pub fn refill_front_bus(&mut self) {
        if self.is_terminal() {
            return;
        }
        let Some(color) = self.buses.current_color() else {
            return;
        };
        let seats = self.buses.available_seats();
        if seats == 0 {
            return;
        }
        for (slot, passenger) in self.waiting.take_matching(color, seats) {
            debug!("passenger {passenger:?} leaves waiting slot {slot} for the {color:?} bus");
            self.board(passenger);
        }
    }

    /// Commits a passenger's seat once it reached the bus.
    pub fn complete_boarding(&mut self, passenger: Entity, bus: Entity) {
        let Some(progress) = self.buses.complete_boarding(bus) else {
            return;
        };
        self.commands.entity(passenger).despawn();
        self.outbox
            .push(PresentationCommand::Destroy { entity: passenger });
        self.outbox.push(PresentationCommand::BusLoad {
            entity: bus,
            boarded: progress.boarded,
            capacity: progress.capacity,
        });
        self.telemetry.passengers_boarded += 1;
        debug!(
            "passenger {passenger:?} boarded bus {bus:?} ({}/{})",
            progress.boarded, progress.capacity
        );
        if progress.became_full {
            if let Ok((mut view, _, _)) = self.bus_views.get_mut(bus) {
                view.state = BusState::Full;
            }
            self.try_start_departure();
        }
    }

    /// Starts the next pending departure if none is running: the front bus
    /// drives off and the remaining buses move up one position.
    pub fn try_start_departure(&mut self) {
        if self.is_terminal() {
            return;
        }
        let Some(start) = self.buses.begin_departure() else {
            return;
        };
        let now = self.now();
        let departing = start.bus.entity;
        info!(
            "bus {departing:?} ({:?}) departs at {now}ms, {} pending",
            start.bus.color,
            self.buses.pending_departures()
        );
        self.telemetry
            .record_departure_started(departing, start.bus.color, now);

        let depart_ms = self.config.bus_depart_ms;
        match self.bus_views.get_mut(departing) {
            Ok((mut view, mut motion, position)) => {
                view.state = BusState::Departing;
                let target = self.layout.drive_off_target(position.0);
                let (ticket, _) = motion.begin(target);
                self.outbox.push(PresentationCommand::MoveTo {
                    entity: departing,
                    target,
                    speed: speed_for(position.0, target, depart_ms),
                    duration_ms: depart_ms,
                    ticket,
                });
                self.clock.schedule_motion_in(
                    depart_ms,
                    EventKind::BusDriveOffFinished,
                    EventSubject::Bus(departing),
                    ticket,
                );
            }
            Err(_) => error!("departing bus {departing:?} has no entity"),
        }

        let shift_ms = self.config.bus_shift_ms;
        for (entity, queue_position) in start.remaining {
            let Ok((mut view, mut motion, position)) = self.bus_views.get_mut(entity) else {
                continue;
            };
            view.queue_position = queue_position;
            let target = self.layout.bus_slot(queue_position);
            let (ticket, superseded) = motion.begin(target);
            if let Some(stale) = superseded {
                self.outbox.push(PresentationCommand::Cancel {
                    entity,
                    ticket: stale,
                });
            }
            self.outbox.push(PresentationCommand::MoveTo {
                entity,
                target,
                speed: speed_for(position.0, target, shift_ms),
                duration_ms: shift_ms,
                ticket,
            });
        }
        self.clock
            .schedule_in(shift_ms, EventKind::QueueShifted, None);

        if start.is_final {
            self.conclude(LevelOutcome::Won);
        }
    }

    /// Settles the shifted buses, spawns the next upcoming bus, reopens
    /// boarding, then refills from the waiting area, drains held arrivals and
    /// starts the next pending departure. Once the level is over only the
    /// departure flag is cleared.
    pub fn finish_queue_shift(&mut self) {
        let queued: Vec<Entity> = self.buses.queued().map(|bus| bus.entity).collect();
        for entity in queued {
            if let Ok((_, mut motion, mut position)) = self.bus_views.get_mut(entity) {
                let ticket = motion.ticket;
                if let Some(target) = motion.complete(ticket) {
                    position.0 = target;
                }
            }
        }

        if self.is_terminal() {
            self.buses.end_departure();
            return;
        }

        let Dispatch {
            commands,
            layout,
            outbox,
            buses,
            ..
        } = &mut *self;
        buses.finish_shift(|color, queue_position| {
            spawn_bus(commands, layout, outbox, color, queue_position)
        });

        self.refill_front_bus();
        self.drain_arrivals();
        self.try_start_departure();
        self.check_loss();
    }

    /// Loss: every waiting slot is taken and nothing in flight can free one.
    pub fn check_loss(&mut self) {
        if self.is_terminal() || !self.waiting.is_full() {
            return;
        }
        if self.buses.is_departing()
            || self.buses.pending_departures() > 0
            || self.buses.reserved_seats() > 0
        {
            return;
        }
        self.conclude(LevelOutcome::Lost(LossReason::WaitingAreaFull));
    }

    /// Sets the terminal outcome once and notifies the presentation layer.
    pub fn conclude(&mut self, outcome: LevelOutcome) -> bool {
        let now = self.now();
        if !self.status.conclude(outcome, now) {
            return false;
        }
        match outcome {
            LevelOutcome::Won => {
                info!("level won at {now}ms");
                self.notifications.push(LevelNotification::Won);
            }
            LevelOutcome::Lost(reason) => {
                info!("level lost at {now}ms: {reason:?}");
                self.notifications.push(LevelNotification::Lost(reason));
            }
            LevelOutcome::Running => {}
        }
        true
    }
}

fn spawn_bus(
    commands: &mut Commands,
    layout: &LevelLayout,
    outbox: &mut PresentationCommands,
    color: Color,
    queue_position: usize,
) -> Entity {
    let position = layout.bus_slot(queue_position);
    let entity = commands
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
}
