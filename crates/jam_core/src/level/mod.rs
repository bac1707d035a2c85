//! Level data, session tunables, terminal status and world construction.

mod build;
mod config;
mod definition;
mod status;

pub use build::build_level;
pub use config::SessionConfig;
pub use definition::{CellSpec, LevelDefinition, LevelWarning};
pub use status::{
    Countdown, LevelNotification, LevelNotifications, LevelOutcome, LevelStatus, LossReason,
};
