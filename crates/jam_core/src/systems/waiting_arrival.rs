use bevy_ecs::prelude::Res;
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::ecs::PassengerState;
use crate::systems::dispatch::Dispatch;

pub fn waiting_slot_reached_system(event: Res<CurrentEvent>, mut ctx: Dispatch) {
    if event.0.kind != EventKind::WaitingSlotReached {
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
    let Some(PassengerState::EnRouteToWaiting { slot }) =
        ctx.passenger(passenger).map(|p| p.state)
    else {
        return;
    };
    ctx.set_passenger_state(passenger, PassengerState::Waiting { slot });
    debug!(
        "passenger {passenger:?} waiting in slot {slot} ({} free)",
        ctx.waiting.free_count()
    );
    ctx.check_loss();
}
