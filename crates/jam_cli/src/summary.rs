//! JSON report of a finished play.

use jam_core::ecs::Color;
use jam_core::level::{LevelOutcome, LevelStatus, LevelWarning};
use jam_core::telemetry::LevelSnapshot;
use jam_core::LevelSession;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureSummary {
    pub order: usize,
    pub color: Color,
    pub started_at: u64,
    pub finished_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaySummary {
    pub outcome: LevelOutcome,
    pub concluded_at: Option<u64>,
    pub events: usize,
    pub clicks_accepted: u64,
    pub clicks_ignored: u64,
    pub clicks_without_path: u64,
    pub passengers_boarded: u64,
    pub peak_waiting: usize,
    pub departures: Vec<DepartureSummary>,
    pub events_by_kind: Vec<(String, u64)>,
    pub snapshot: LevelSnapshot,
}

impl PlaySummary {
    pub fn collect(session: &mut LevelSession, events: usize) -> Self {
        let snapshot = session.snapshot();
        let telemetry = session.telemetry();
        let departures = telemetry
            .departures
            .iter()
            .map(|record| DepartureSummary {
                order: record.order,
                color: record.color,
                started_at: record.started_at,
                finished_at: record.finished_at,
            })
            .collect();
        Self {
            outcome: session.outcome(),
            concluded_at: session.world().resource::<LevelStatus>().concluded_at(),
            events,
            clicks_accepted: telemetry.clicks_accepted,
            clicks_ignored: telemetry.clicks_ignored,
            clicks_without_path: telemetry.clicks_without_path,
            passengers_boarded: telemetry.passengers_boarded,
            peak_waiting: telemetry.peak_waiting,
            departures,
            events_by_kind: session
                .metrics()
                .sorted_counts()
                .into_iter()
                .map(|(kind, count)| (format!("{kind:?}"), count))
                .collect(),
            snapshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintReport {
    pub passengers: usize,
    pub buses: usize,
    pub warnings: Vec<LevelWarning>,
}
