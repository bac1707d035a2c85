use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Player clicked a passenger on the grid.
    PassengerClicked,
    /// A passenger finished one cell of its path toward the exit row.
    PathStep,
    /// A passenger reached its allocated waiting slot.
    WaitingSlotReached,
    /// A passenger reached the front bus and takes its reserved seat.
    BusReached,
    /// Remaining buses finished moving up one position after a departure.
    QueueShifted,
    /// A departing bus finished driving off screen.
    BusDriveOffFinished,
    /// One second of the level countdown elapsed.
    CountdownTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Passenger(Entity),
    Bus(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    /// Scheduling order; breaks timestamp ties so same-instant events run FIFO.
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
    /// Motion ticket the event completes, when it completes a motion.
    pub ticket: Option<u64>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.push(timestamp, kind, subject, None);
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.push(self.now.saturating_add(delay_ms), kind, subject, None);
    }

    pub fn schedule_in_secs(
        &mut self,
        delay_secs: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) {
        self.schedule_in(delay_secs.saturating_mul(ONE_SEC_MS), kind, subject);
    }

    /// Schedules the completion of a motion identified by `ticket`.
    pub fn schedule_motion_in(
        &mut self,
        delay_ms: u64,
        kind: EventKind,
        subject: EventSubject,
        ticket: u64,
    ) {
        self.push(
            self.now.saturating_add(delay_ms),
            kind,
            Some(subject),
            Some(ticket),
        );
    }

    fn push(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
        ticket: Option<u64>,
    ) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp: timestamp.max(self.now),
            seq,
            kind,
            subject,
            ticket,
        });
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    /// True when every queued event is of `kind` (vacuously true when empty).
    pub fn only_pending(&self, kind: EventKind) -> bool {
        self.events.iter().all(|event| event.kind == kind)
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
