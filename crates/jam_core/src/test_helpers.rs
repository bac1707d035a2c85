//! Test helpers for common level setup.
//!
//! Levels are drawn as ASCII rows, row 0 (the exit row) first:
//! `.` empty, `#` void, `R`/`B`/`G`/`Y` a passenger of that color.

use crate::ecs::Color;
use crate::level::{CellSpec, LevelDefinition, SessionConfig};
use crate::motion::FixedDurationTiming;
use crate::session::LevelSession;

/// Parses one ASCII cell.
///
/// # Panics
///
/// Panics on characters outside the legend.
pub fn cell_from_char(c: char) -> CellSpec {
    match c {
        '.' => CellSpec::Empty,
        '#' => CellSpec::Void,
        'R' => CellSpec::Passenger(Color::Red),
        'B' => CellSpec::Passenger(Color::Blue),
        'G' => CellSpec::Passenger(Color::Green),
        'Y' => CellSpec::Passenger(Color::Yellow),
        other => panic!("unknown level cell {other:?}"),
    }
}

/// Builds a level definition from ASCII rows.
///
/// # Panics
///
/// Panics if rows are empty or ragged.
pub fn level_from_ascii(
    rows: &[&str],
    waiting_area_size: usize,
    time_limit_secs: u32,
    buses: &[Color],
) -> LevelDefinition {
    let cols = rows.first().map(|row| row.len()).expect("at least one row");
    assert!(
        rows.iter().all(|row| row.len() == cols),
        "ragged level rows"
    );
    LevelDefinition {
        rows: rows.len(),
        cols,
        cells: rows
            .iter()
            .flat_map(|row| row.chars())
            .map(cell_from_char)
            .collect(),
        waiting_area_size,
        time_limit_secs,
        buses: buses.to_vec(),
    }
}

/// 6x6 grid with a single red passenger at (5, 2) and one red bus.
pub fn single_red_passenger_level() -> LevelDefinition {
    level_from_ascii(
        &[
            "......", "......", "......", "......", "......", "..R...",
        ],
        3,
        60,
        &[Color::Red],
    )
}

/// Three passengers on the exit row whose colors match no bus, two waiting
/// slots.
pub fn overflow_level() -> LevelDefinition {
    level_from_ascii(&["BBG", "..."], 2, 60, &[Color::Red])
}

/// Builds a session, panicking on an invalid level.
pub fn session(definition: LevelDefinition, config: SessionConfig) -> LevelSession {
    LevelSession::new(definition, config).expect("valid level")
}

/// Session where every move takes `move_ms`, so event order does not depend
/// on geometry.
pub fn fixed_timing_session(
    definition: LevelDefinition,
    config: SessionConfig,
    move_ms: u64,
) -> LevelSession {
    session(definition, config).with_motion_timing(FixedDurationTiming(move_ms))
}
