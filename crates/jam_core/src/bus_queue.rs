//! Bus queue: seat accounting for the front bus, the lookahead window of
//! materialized buses, and strictly serialized departures.
//!
//! Only the front bus accepts boarders. A seat is reserved when a passenger
//! starts walking to the bus and committed when it arrives, so concurrent
//! boarding moves can never over-commit a bus. A full bus becomes a pending
//! departure; departures run one at a time in the order they became pending.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use log::{debug, error};

use crate::ecs::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedBus {
    pub entity: Entity,
    pub color: Color,
    pub capacity: usize,
    pub boarded: usize,
    /// Seats promised to passengers still walking to the bus.
    pub reserved: usize,
}

impl QueuedBus {
    fn new(entity: Entity, color: Color, capacity: usize) -> Self {
        Self {
            entity,
            color,
            capacity,
            boarded: 0,
            reserved: 0,
        }
    }

    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.boarded + self.reserved)
    }

    pub fn has_space(&self) -> bool {
        self.available() > 0
    }

    pub fn is_full(&self) -> bool {
        self.boarded >= self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureStart {
    pub bus: QueuedBus,
    /// Buses still queued with their new positions, front first.
    pub remaining: Vec<(Entity, usize)>,
    /// No bus is left to serve after this one.
    pub is_final: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardingProgress {
    pub boarded: usize,
    pub capacity: usize,
    pub became_full: bool,
}

#[derive(Debug, Default, Resource)]
pub struct BusQueue {
    capacity: usize,
    lookahead: usize,
    queued: VecDeque<QueuedBus>,
    upcoming: VecDeque<Color>,
    departing: bool,
    pending_departures: usize,
    departed: usize,
}

impl BusQueue {
    /// Resets the queue to `colors` and materializes the lookahead window.
    /// `spawn` receives each bus color with its queue position.
    pub fn initialize<F>(&mut self, colors: &[Color], capacity: usize, lookahead: usize, spawn: F)
    where
        F: FnMut(Color, usize) -> Entity,
    {
        *self = Self {
            capacity,
            lookahead: lookahead.max(1),
            upcoming: colors.iter().copied().collect(),
            ..Self::default()
        };
        self.fill_window(spawn);
    }

    fn fill_window<F>(&mut self, mut spawn: F) -> Option<Entity>
    where
        F: FnMut(Color, usize) -> Entity,
    {
        let mut last = None;
        while self.queued.len() < self.lookahead {
            let Some(color) = self.upcoming.pop_front() else {
                break;
            };
            let position = self.queued.len();
            let entity = spawn(color, position);
            debug!("bus {entity:?} ({color:?}) spawned at queue position {position}");
            self.queued
                .push_back(QueuedBus::new(entity, color, self.capacity));
            last = Some(entity);
        }
        last
    }

    pub fn front(&self) -> Option<&QueuedBus> {
        self.queued.front()
    }

    pub fn current_color(&self) -> Option<Color> {
        self.front().map(|bus| bus.color)
    }

    pub fn has_space(&self) -> bool {
        self.front().is_some_and(QueuedBus::has_space)
    }

    pub fn can_board(&self, color: Color) -> bool {
        self.front()
            .is_some_and(|bus| bus.color == color && bus.has_space())
    }

    pub fn available_seats(&self) -> usize {
        self.front().map_or(0, QueuedBus::available)
    }

    pub fn reserved_seats(&self) -> usize {
        self.queued.iter().map(|bus| bus.reserved).sum()
    }

    /// Reserves a seat on the front bus, returning that bus.
    pub fn reserve_seat(&mut self) -> Option<Entity> {
        let bus = self.queued.front_mut().filter(|bus| bus.has_space())?;
        bus.reserved += 1;
        Some(bus.entity)
    }

    /// Commits a reserved seat once its passenger has arrived. A bus that
    /// fills up becomes a pending departure.
    pub fn complete_boarding(&mut self, bus: Entity) -> Option<BoardingProgress> {
        let Some(queued) = self.queued.iter_mut().find(|queued| queued.entity == bus) else {
            error!("boarding completed for bus {bus:?} which is no longer queued");
            return None;
        };
        if queued.reserved == 0 || queued.is_full() {
            error!(
                "boarding completed for bus {bus:?} without a reservation ({}/{} boarded)",
                queued.boarded, queued.capacity
            );
            debug_assert!(false, "boarding without a seat reservation");
            return None;
        }
        queued.reserved -= 1;
        queued.boarded += 1;
        let became_full = queued.is_full();
        let progress = BoardingProgress {
            boarded: queued.boarded,
            capacity: queued.capacity,
            became_full,
        };
        if became_full {
            self.pending_departures += 1;
        }
        Some(progress)
    }

    pub fn cancel_reservation(&mut self, bus: Entity) -> bool {
        match self
            .queued
            .iter_mut()
            .find(|queued| queued.entity == bus && queued.reserved > 0)
        {
            Some(queued) => {
                queued.reserved -= 1;
                true
            }
            None => false,
        }
    }

    /// Starts the next pending departure unless one is already running.
    pub fn begin_departure(&mut self) -> Option<DepartureStart> {
        if self.departing || self.pending_departures == 0 {
            return None;
        }
        let bus = self.queued.pop_front()?;
        debug_assert!(bus.is_full(), "departing bus is not full");
        self.pending_departures -= 1;
        self.departing = true;
        self.departed += 1;
        let remaining = self
            .queued
            .iter()
            .enumerate()
            .map(|(position, queued)| (queued.entity, position))
            .collect();
        Some(DepartureStart {
            bus,
            remaining,
            is_final: self.is_exhausted(),
        })
    }

    /// Completes the queue shift of the running departure: the next upcoming
    /// bus joins the back of the window and boarding reopens.
    pub fn finish_shift<F>(&mut self, spawn: F) -> Option<Entity>
    where
        F: FnMut(Color, usize) -> Entity,
    {
        if !self.departing {
            error!("queue shift finished with no departure in progress");
            debug_assert!(false, "queue shift without departure");
            return None;
        }
        let spawned = self.fill_window(spawn);
        self.departing = false;
        spawned
    }

    /// Ends the running departure without bringing in the next bus. Used once
    /// the level is over.
    pub fn end_departure(&mut self) {
        if !self.departing {
            error!("departure ended with no departure in progress");
            debug_assert!(false, "departure end without departure");
            return;
        }
        self.departing = false;
    }

    pub fn is_departing(&self) -> bool {
        self.departing
    }

    pub fn pending_departures(&self) -> usize {
        self.pending_departures
    }

    pub fn departed_count(&self) -> usize {
        self.departed
    }

    /// No bus is queued and no color is left to spawn.
    pub fn is_exhausted(&self) -> bool {
        self.queued.is_empty() && self.upcoming.is_empty()
    }

    pub fn queued(&self) -> impl Iterator<Item = &QueuedBus> {
        self.queued.iter()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn upcoming_len(&self) -> usize {
        self.upcoming.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spawner {
        next: u32,
        spawned: Vec<(Entity, Color, usize)>,
    }

    impl Spawner {
        fn new() -> Self {
            Self {
                next: 100,
                spawned: Vec::new(),
            }
        }

        fn spawn(&mut self, color: Color, position: usize) -> Entity {
            let entity = Entity::from_raw(self.next);
            self.next += 1;
            self.spawned.push((entity, color, position));
            entity
        }
    }

    fn queue(colors: &[Color], capacity: usize, spawner: &mut Spawner) -> BusQueue {
        let mut queue = BusQueue::default();
        queue.initialize(colors, capacity, 3, |color, position| {
            spawner.spawn(color, position)
        });
        queue
    }

    fn board_one(queue: &mut BusQueue) -> BoardingProgress {
        let bus = queue.reserve_seat().expect("seat");
        queue.complete_boarding(bus).expect("boarding")
    }

    #[test]
    fn initialize_materializes_lookahead_window() {
        let mut spawner = Spawner::new();
        let colors = [Color::Red, Color::Blue, Color::Green, Color::Yellow, Color::Red];
        let queue = queue(&colors, 3, &mut spawner);
        assert_eq!(queue.queued_len(), 3);
        assert_eq!(queue.upcoming_len(), 2);
        assert_eq!(queue.current_color(), Some(Color::Red));
        let positions: Vec<_> = spawner.spawned.iter().map(|(_, c, p)| (*c, *p)).collect();
        assert_eq!(
            positions,
            vec![(Color::Red, 0), (Color::Blue, 1), (Color::Green, 2)]
        );
    }

    #[test]
    fn reservations_count_against_capacity() {
        let mut spawner = Spawner::new();
        let mut queue = queue(&[Color::Red], 2, &mut spawner);
        assert!(queue.can_board(Color::Red));
        assert!(!queue.can_board(Color::Blue));

        let bus = queue.reserve_seat().expect("first seat");
        queue.reserve_seat().expect("second seat");
        assert!(!queue.has_space());
        assert!(!queue.can_board(Color::Red));
        assert_eq!(queue.reserve_seat(), None);
        assert_eq!(queue.reserved_seats(), 2);

        assert!(queue.cancel_reservation(bus));
        assert!(queue.has_space());
        assert_eq!(queue.available_seats(), 1);
    }

    #[test]
    fn full_bus_becomes_pending_and_departs() {
        let mut spawner = Spawner::new();
        let mut queue = queue(&[Color::Red, Color::Blue], 2, &mut spawner);
        assert!(!board_one(&mut queue).became_full);
        let progress = board_one(&mut queue);
        assert!(progress.became_full);
        assert_eq!(progress.boarded, 2);
        assert_eq!(queue.pending_departures(), 1);

        let start = queue.begin_departure().expect("departure");
        assert_eq!(start.bus.color, Color::Red);
        assert!(!start.is_final);
        assert_eq!(start.remaining.len(), 1);
        assert_eq!(start.remaining[0].1, 0);
        assert!(queue.is_departing());
        assert_eq!(queue.pending_departures(), 0);
        assert_eq!(queue.begin_departure(), None);

        assert_eq!(queue.finish_shift(|c, p| spawner.spawn(c, p)), None);
        assert!(!queue.is_departing());
        assert_eq!(queue.current_color(), Some(Color::Blue));
    }

    #[test]
    fn last_departure_is_final() {
        let mut spawner = Spawner::new();
        let mut queue = queue(&[Color::Green], 1, &mut spawner);
        board_one(&mut queue);
        let start = queue.begin_departure().expect("departure");
        assert!(start.is_final);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn shift_spawns_next_upcoming_bus_at_back_of_window() {
        let mut spawner = Spawner::new();
        let colors = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
        let mut queue = queue(&colors, 1, &mut spawner);
        board_one(&mut queue);
        queue.begin_departure().expect("departure");
        let spawned = queue
            .finish_shift(|c, p| spawner.spawn(c, p))
            .expect("spawned bus");
        assert_eq!(spawner.spawned.last(), Some(&(spawned, Color::Yellow, 2)));
        assert_eq!(queue.queued_len(), 3);
        assert_eq!(queue.upcoming_len(), 0);
    }

    #[test]
    fn departures_are_serialized_in_pending_order() {
        let mut spawner = Spawner::new();
        let colors = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
        let mut queue = queue(&colors, 1, &mut spawner);

        // Red fills and starts departing; Blue fills while Red is still on
        // its way out and has to wait its turn.
        board_one(&mut queue);
        let first = queue.begin_departure().expect("red departs");
        board_one(&mut queue);
        assert_eq!(queue.begin_departure(), None);
        assert_eq!(queue.pending_departures(), 1);

        let mut order = vec![first.bus.color];
        queue.finish_shift(|c, p| spawner.spawn(c, p));
        order.push(queue.begin_departure().expect("blue departs").bus.color);

        board_one(&mut queue);
        assert_eq!(queue.begin_departure(), None);
        queue.finish_shift(|c, p| spawner.spawn(c, p));
        order.push(queue.begin_departure().expect("green departs").bus.color);
        assert_eq!(order, vec![Color::Red, Color::Blue, Color::Green]);
        assert_eq!(queue.departed_count(), 3);
    }

    #[test]
    fn ending_departure_leaves_upcoming_buses_unspawned() {
        let mut spawner = Spawner::new();
        let colors = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
        let mut queue = queue(&colors, 1, &mut spawner);
        board_one(&mut queue);
        queue.begin_departure().expect("departure");
        let spawned_before = spawner.spawned.len();

        queue.end_departure();
        assert!(!queue.is_departing());
        assert_eq!(spawner.spawned.len(), spawned_before);
        assert_eq!(queue.queued_len(), 2);
        assert_eq!(queue.upcoming_len(), 1);
    }
}
