pub mod arrivals;
pub mod bus_queue;
pub mod clock;
pub mod ecs;
pub mod error;
pub mod grid;
pub mod layout;
pub mod level;
pub mod motion;
pub mod presentation;
pub mod profiling;
pub mod runner;
pub mod session;
pub mod systems;
pub mod telemetry;
pub mod waiting_area;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{GridError, LevelError, LevelResult};
pub use session::LevelSession;
