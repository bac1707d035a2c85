mod support;

use jam_core::clock::EventKind;
use jam_core::ecs::{Color, PassengerState};
use jam_core::grid::{CellState, GridCoord};
use jam_core::level::{LevelNotification, LevelOutcome, LossReason, SessionConfig};
use jam_core::presentation::{EntityKind, PresentationCommand};
use jam_core::test_helpers::{
    fixed_timing_session, level_from_ascii, overflow_level, session, single_red_passenger_level,
};
use jam_core::LevelSession;

use support::{click, passenger_count, passenger_state, settle, MAX_STEPS};

#[test]
fn single_passenger_walks_five_cells_and_boards() {
    let mut session = session(single_red_passenger_level(), SessionConfig::default());
    session.drain_commands();

    let passenger = click(&mut session, 5, 2);
    session.step();
    assert_eq!(
        passenger_state(&session, passenger),
        Some(PassengerState::EnRouteToExit)
    );
    assert_eq!(
        session.grid().cell(GridCoord::new(5, 2)),
        Some(CellState::Empty),
        "origin cell freed on departure"
    );

    settle(&mut session);

    assert_eq!(session.metrics().count(EventKind::PathStep), 5);
    assert_eq!(session.metrics().count(EventKind::BusReached), 1);
    assert_eq!(passenger_count(&mut session), 0, "boarded passenger removed");

    let front = *session.bus_queue().front().expect("red bus");
    assert_eq!(front.color, Color::Red);
    assert_eq!(front.boarded, 1);
    assert_eq!(front.reserved, 0);
    assert_eq!(session.bus_queue().pending_departures(), 0);
    assert!(!session.bus_queue().is_departing());
    assert_eq!(session.outcome(), LevelOutcome::Running);

    let commands = session.drain_commands();
    let moves = commands
        .iter()
        .filter(|c| matches!(c, PresentationCommand::MoveTo { entity, .. } if *entity == passenger))
        .count();
    assert_eq!(moves, 6, "five path cells plus the walk to the bus");
    assert!(commands.contains(&PresentationCommand::Destroy { entity: passenger }));
    assert!(commands.contains(&PresentationCommand::BusLoad {
        entity: front.entity,
        boarded: 1,
        capacity: 3,
    }));
}

#[test]
fn overflowing_waiting_area_loses_the_level() {
    let mut session = fixed_timing_session(overflow_level(), SessionConfig::default(), 200);

    let first = click(&mut session, 0, 0);
    let second = click(&mut session, 0, 1);
    let third = click(&mut session, 0, 2);
    session.run_until(0);

    assert_eq!(
        passenger_state(&session, first),
        Some(PassengerState::EnRouteToWaiting { slot: 0 })
    );
    assert_eq!(
        passenger_state(&session, second),
        Some(PassengerState::EnRouteToWaiting { slot: 1 })
    );
    assert_eq!(passenger_state(&session, third), Some(PassengerState::AtExit));
    assert_eq!(session.arrival_queue().front(), Some(third));
    assert_eq!(session.outcome(), LevelOutcome::Running, "no loss before arrival");

    settle(&mut session);

    assert_eq!(
        session.outcome(),
        LevelOutcome::Lost(LossReason::WaitingAreaFull)
    );
    assert_eq!(session.waiting_area().slot_of(first), Some(0));
    assert_eq!(session.waiting_area().slot_of(second), Some(1));
    assert_eq!(
        session.drain_notifications(),
        vec![
            LevelNotification::Reset,
            LevelNotification::Lost(LossReason::WaitingAreaFull)
        ]
    );
}

#[test]
fn departure_refills_from_waiting_area_before_held_arrivals() {
    let level = level_from_ascii(
        &["BRB."],
        3,
        60,
        &[Color::Red, Color::Blue, Color::Blue, Color::Green],
    );
    let config = SessionConfig::default().with_bus_capacity(1);
    let mut session = fixed_timing_session(level, config, 100);
    session.drain_commands();

    let waiting_blue = click(&mut session, 0, 0);
    settle(&mut session);
    assert_eq!(
        passenger_state(&session, waiting_blue),
        Some(PassengerState::Waiting { slot: 0 })
    );

    click(&mut session, 0, 1);
    session.run_until(250);
    assert!(session.bus_queue().is_departing(), "red bus full and leaving");
    assert_eq!(session.telemetry().departure_colors(), vec![Color::Red]);

    let held_blue = click(&mut session, 0, 2);
    session.run_until(250);
    assert_eq!(passenger_state(&session, held_blue), Some(PassengerState::AtExit));
    assert!(session.arrival_queue().contains(held_blue));
    assert_eq!(session.waiting_area().free_count(), 2, "held arrival takes no slot");

    // Shift completes 500ms after the departure started at 200ms.
    session.run_until(700);
    assert!(!session.bus_queue().is_departing());
    assert_eq!(session.bus_queue().current_color(), Some(Color::Blue));
    assert_eq!(session.bus_queue().queued_len(), 3);
    assert_eq!(session.bus_queue().upcoming_len(), 0);

    let front = *session.bus_queue().front().expect("blue bus");
    assert_eq!(
        passenger_state(&session, waiting_blue),
        Some(PassengerState::EnRouteToBus { bus: front.entity }),
        "waiting passenger takes the seat first"
    );
    assert_eq!(
        passenger_state(&session, held_blue),
        Some(PassengerState::EnRouteToWaiting { slot: 0 })
    );
    assert!(session.arrival_queue().is_empty());

    let spawned_green = session.drain_commands().into_iter().any(|c| {
        matches!(
            c,
            PresentationCommand::Spawn {
                kind: EntityKind::Bus(Color::Green),
                ..
            }
        )
    });
    assert!(spawned_green, "next upcoming bus spawned at the back");
}

#[test]
fn last_departure_wins_and_stops_the_countdown() {
    let level = level_from_ascii(&["RR", ".."], 2, 30, &[Color::Red]);
    let config = SessionConfig::default().with_bus_capacity(2);
    let mut session = fixed_timing_session(level, config, 100);
    session.drain_commands();

    click(&mut session, 0, 0);
    click(&mut session, 0, 1);
    let steps = session.run_until_empty(MAX_STEPS);
    assert!(steps < MAX_STEPS);

    assert_eq!(session.outcome(), LevelOutcome::Won);
    assert_eq!(
        session.drain_notifications(),
        vec![LevelNotification::Reset, LevelNotification::Won]
    );
    assert!(session.bus_queue().is_exhausted());
    assert_eq!(session.telemetry().passengers_boarded, 2);

    let record = session.telemetry().departures[0].clone();
    assert_eq!(record.started_at, 100);
    assert_eq!(record.finished_at, Some(1100));
    assert_eq!(session.time_left(), 30, "ticks after the win are ignored");

    let destroyed_bus = session
        .drain_commands()
        .contains(&PresentationCommand::Destroy { entity: record.bus });
    assert!(destroyed_bus);
}

#[test]
fn countdown_expiry_loses_and_ignores_later_clicks() {
    let level = level_from_ascii(&["#.", "R#"], 2, 3, &[Color::Red]);
    let mut session = session(level, SessionConfig::default());

    let stuck = click(&mut session, 1, 0);
    session.step();
    assert_eq!(session.telemetry().clicks_without_path, 1);
    assert_eq!(passenger_state(&session, stuck), Some(PassengerState::OnGrid));
    assert_eq!(session.time_left(), 3, "countdown started but not ticked");

    session.run_until(2000);
    assert_eq!(session.time_left(), 1);
    assert_eq!(session.outcome(), LevelOutcome::Running);

    session.run_until(3000);
    assert_eq!(session.time_left(), 0);
    assert_eq!(session.outcome(), LevelOutcome::Lost(LossReason::TimeExpired));

    session.click(stuck);
    session.run_until_empty(MAX_STEPS);
    assert_eq!(session.telemetry().clicks_ignored, 1);
    assert_eq!(session.time_left(), 0);
    assert_eq!(
        session.drain_notifications(),
        vec![
            LevelNotification::Reset,
            LevelNotification::Lost(LossReason::TimeExpired)
        ]
    );
}

#[test]
fn reset_rebuilds_the_level() {
    let mut session = session(single_red_passenger_level(), SessionConfig::default());
    click(&mut session, 5, 2);
    settle(&mut session);
    assert_eq!(passenger_count(&mut session), 0);
    session.drain_notifications();

    session.reset().expect("reset");
    assert_eq!(passenger_count(&mut session), 1);
    assert_eq!(session.now(), 0);
    assert_eq!(session.time_left(), 60);
    assert_eq!(session.outcome(), LevelOutcome::Running);
    assert_eq!(session.drain_notifications(), vec![LevelNotification::Reset]);
    assert!(session.passenger_at(5, 2).is_some());
}

#[test]
fn greedy_autoplay_clears_a_balanced_level() {
    let level = level_from_ascii(&["RRB", "B.."], 2, 60, &[Color::Red, Color::Blue]);
    let config = SessionConfig::default().with_bus_capacity(2);
    let mut session = fixed_timing_session(level, config, 100);

    let steps = session.autoplay(MAX_STEPS, LevelSession::greedy_pick);

    assert!(steps < MAX_STEPS);
    assert_eq!(session.outcome(), LevelOutcome::Won);
    assert_eq!(
        session.telemetry().departure_colors(),
        vec![Color::Red, Color::Blue]
    );
    assert_eq!(session.telemetry().clicks_accepted, 4);
    assert_eq!(session.telemetry().peak_waiting, 0);
}
