use bevy_ecs::prelude::Res;
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::presentation::PresentationCommand;
use crate::systems::dispatch::Dispatch;

/// The remaining buses finished moving up after a departure.
pub fn queue_shifted_system(event: Res<CurrentEvent>, mut ctx: Dispatch) {
    if event.0.kind != EventKind::QueueShifted {
        return;
    }
    ctx.finish_queue_shift();
}

/// A departed bus left the screen; it is gone for good.
pub fn bus_drive_off_finished_system(event: Res<CurrentEvent>, mut ctx: Dispatch) {
    if event.0.kind != EventKind::BusDriveOffFinished {
        return;
    }
    let (Some(EventSubject::Bus(bus)), Some(ticket)) = (event.0.subject, event.0.ticket) else {
        return;
    };
    let Ok((_, mut motion, mut position)) = ctx.bus_views.get_mut(bus) else {
        return;
    };
    let Some(target) = motion.complete(ticket) else {
        return;
    };
    position.0 = target;

    ctx.commands.entity(bus).despawn();
    ctx.outbox.push(PresentationCommand::Destroy { entity: bus });
    let now = ctx.now();
    ctx.telemetry.record_departure_finished(bus, now);
    debug!("bus {bus:?} drove off at {now}ms");
}
