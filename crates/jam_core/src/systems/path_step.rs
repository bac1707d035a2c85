use bevy_ecs::prelude::{Query, Res};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::ecs::PathPlayback;
use crate::systems::dispatch::Dispatch;

/// Advances a walking passenger by one cell; the last cell hands it to the
/// arrival queue.
pub fn path_step_system(
    event: Res<CurrentEvent>,
    mut ctx: Dispatch,
    mut playbacks: Query<&mut PathPlayback>,
) {
    if event.0.kind != EventKind::PathStep {
        return;
    }
    let (Some(EventSubject::Passenger(passenger)), Some(ticket)) =
        (event.0.subject, event.0.ticket)
    else {
        return;
    };
    if !ctx.finish_passenger_move(passenger, ticket) {
        return;
    }
    let Ok(mut playback) = playbacks.get_mut(passenger) else {
        return;
    };
    let Some(reached) = playback.remaining.pop_front() else {
        return;
    };
    if let Ok((mut p, _, _)) = ctx.passengers.get_mut(passenger) {
        p.cell = reached;
    }

    match playback.remaining.front().copied() {
        Some(next) => {
            let target = ctx.layout.cell_to_world(next);
            ctx.move_passenger(passenger, target, EventKind::PathStep);
        }
        None => ctx.passenger_reached_exit(passenger),
    }
}
