use bevy_ecs::prelude::{Res, ResMut};
use log::trace;

use crate::clock::{CurrentEvent, EventKind, ONE_SEC_MS};
use crate::level::{Countdown, LevelOutcome, LossReason};
use crate::systems::dispatch::Dispatch;

/// One second of the level countdown. Ticking stops once the level is over.
pub fn countdown_tick_system(
    event: Res<CurrentEvent>,
    mut ctx: Dispatch,
    mut countdown: ResMut<Countdown>,
) {
    if event.0.kind != EventKind::CountdownTick || ctx.is_terminal() {
        return;
    }
    if countdown.tick() {
        ctx.conclude(LevelOutcome::Lost(LossReason::TimeExpired));
        return;
    }
    trace!("{}s left", countdown.time_left());
    ctx.clock
        .schedule_in(ONE_SEC_MS, EventKind::CountdownTick, None);
}
