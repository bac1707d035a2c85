use bevy_ecs::prelude::Res;

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::ecs::PassengerState;
use crate::systems::dispatch::Dispatch;

pub fn bus_reached_system(event: Res<CurrentEvent>, mut ctx: Dispatch) {
    if event.0.kind != EventKind::BusReached {
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
    let Some(PassengerState::EnRouteToBus { bus }) = ctx.passenger(passenger).map(|p| p.state)
    else {
        return;
    };
    ctx.complete_boarding(passenger, bus);
    ctx.check_loss();
}
