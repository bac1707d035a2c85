//! Drives a [`LevelSession`] from a click script or an autoplay strategy.

use jam_core::LevelSession;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::script::ScriptedClick;

/// Upper bound on processed events per play.
pub const MAX_EVENTS: usize = 1_000_000;

/// How clicks are chosen when no script is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autoplay {
    /// Front-bus color first, never spending the last waiting slot.
    Greedy,
    /// Uniformly random among clickable passengers.
    Random { seed: u64 },
}

/// Replays `clicks` in time order and runs the level until its clock is
/// empty. Clicks on cells without an on-grid passenger are skipped.
pub fn replay(session: &mut LevelSession, clicks: &[ScriptedClick]) -> usize {
    let mut events = 0;
    for click in clicks {
        events += session.run_until(click.at_ms);
        match session.passenger_at(click.row, click.col) {
            Some(passenger) => {
                debug!(
                    "scripted click on ({}, {}) at {}ms",
                    click.row, click.col, click.at_ms
                );
                session.click_when(passenger, click.at_ms);
            }
            None => warn!(
                "scripted click at {}ms hits no passenger at ({}, {})",
                click.at_ms, click.row, click.col
            ),
        }
    }
    events + session.run_until_empty(MAX_EVENTS.saturating_sub(events))
}

pub fn autoplay(session: &mut LevelSession, strategy: Autoplay) -> usize {
    match strategy {
        Autoplay::Greedy => session.autoplay(MAX_EVENTS, LevelSession::greedy_pick),
        Autoplay::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            session.autoplay(MAX_EVENTS, |session| {
                session.clickable_passengers().choose(&mut rng).copied()
            })
        }
    }
}
