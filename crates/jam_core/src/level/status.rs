use bevy_ecs::prelude::Resource;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    WaitingAreaFull,
    TimeExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelOutcome {
    #[default]
    Running,
    Won,
    Lost(LossReason),
}

impl LevelOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LevelOutcome::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelNotification {
    Reset,
    Won,
    Lost(LossReason),
}

/// Terminal flag of a level instance. Set at most once; later attempts are
/// ignored so win and loss stay mutually exclusive.
#[derive(Debug, Default, Resource)]
pub struct LevelStatus {
    outcome: LevelOutcome,
    concluded_at: Option<u64>,
}

impl LevelStatus {
    pub fn outcome(&self) -> LevelOutcome {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn concluded_at(&self) -> Option<u64> {
        self.concluded_at
    }

    /// Records the terminal outcome. Returns `false` if the level had
    /// already ended.
    pub fn conclude(&mut self, outcome: LevelOutcome, now: u64) -> bool {
        if self.is_terminal() || !outcome.is_terminal() {
            return false;
        }
        self.outcome = outcome;
        self.concluded_at = Some(now);
        true
    }
}

/// Level countdown. Starts on the first click and ticks once per second.
#[derive(Debug, Resource)]
pub struct Countdown {
    time_left: u32,
    started: bool,
}

impl Countdown {
    pub fn new(time_limit_secs: u32) -> Self {
        Self {
            time_left: time_limit_secs,
            started: false,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Returns `true` only for the call that actually starts the countdown.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    /// Consumes one second; returns `true` when time has run out.
    pub fn tick(&mut self) -> bool {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }
}

/// Notifications for the presentation layer, drained by the session owner.
#[derive(Debug, Default, Resource)]
pub struct LevelNotifications {
    pending: Vec<LevelNotification>,
}

impl LevelNotifications {
    pub fn push(&mut self, notification: LevelNotification) {
        self.pending.push(notification);
    }

    pub fn drain(&mut self) -> Vec<LevelNotification> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[LevelNotification] {
        &self.pending
    }
}
