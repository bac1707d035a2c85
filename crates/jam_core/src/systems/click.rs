use bevy_ecs::prelude::{Query, Res, ResMut};
use log::{debug, error, info};

use crate::clock::{CurrentEvent, EventKind, EventSubject, ONE_SEC_MS};
use crate::ecs::{PassengerState, PathPlayback};
use crate::grid::GridIndex;
use crate::level::Countdown;
use crate::systems::dispatch::Dispatch;

/// Handles a click on a passenger: starts the countdown on the first click,
/// searches a path to the exit row and, if one exists, frees the origin cell
/// and starts walking.
pub fn passenger_clicked_system(
    event: Res<CurrentEvent>,
    mut ctx: Dispatch,
    mut grid: ResMut<GridIndex>,
    mut countdown: ResMut<Countdown>,
    mut playbacks: Query<&mut PathPlayback>,
) {
    if event.0.kind != EventKind::PassengerClicked {
        return;
    }
    let Some(EventSubject::Passenger(passenger)) = event.0.subject else {
        return;
    };

    if ctx.is_terminal() {
        ctx.telemetry.clicks_ignored += 1;
        debug!("click on {passenger:?} ignored: level is over");
        return;
    }
    let Some(clicked) = ctx
        .passenger(passenger)
        .filter(|p| p.state == PassengerState::OnGrid)
    else {
        ctx.telemetry.clicks_ignored += 1;
        debug!("click on {passenger:?} ignored: not on the grid");
        return;
    };

    if countdown.start() {
        info!("countdown started with {}s left", countdown.time_left());
        ctx.clock
            .schedule_in(ONE_SEC_MS, EventKind::CountdownTick, None);
    }

    let Some(path) = grid.find_path_to_exit_row(clicked.cell) else {
        ctx.telemetry.clicks_without_path += 1;
        debug!(
            "no path to the exit row for {passenger:?} at ({}, {})",
            clicked.cell.row, clicked.cell.col
        );
        return;
    };
    if let Err(err) = grid.mark_empty(clicked.cell) {
        error!("failed to free cell of {passenger:?}: {err}");
    }
    ctx.telemetry.clicks_accepted += 1;

    let Some(&first) = path.first() else {
        ctx.passenger_reached_exit(passenger);
        return;
    };
    debug!(
        "passenger {passenger:?} walks {} cells to the exit row",
        path.len()
    );
    ctx.set_passenger_state(passenger, PassengerState::EnRouteToExit);
    if let Ok(mut playback) = playbacks.get_mut(passenger) {
        playback.remaining = path.into();
    }
    let target = ctx.layout.cell_to_world(first);
    ctx.move_passenger(passenger, target, EventKind::PathStep);
}
