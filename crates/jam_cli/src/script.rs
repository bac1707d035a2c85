//! Click scripts: a JSON array of timed clicks on grid cells.
//!
//! ```json
//! [ { "at_ms": 0, "row": 5, "col": 2 }, { "at_ms": 1200, "row": 4, "col": 2 } ]
//! ```

use std::path::Path;

use jam_core::LevelResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedClick {
    /// Simulation time of the click.
    #[serde(default)]
    pub at_ms: u64,
    pub row: i32,
    pub col: i32,
}

/// Parses a script, ordering clicks by time. Clicks at the same instant keep
/// their file order.
pub fn parse_script(json: &str) -> LevelResult<Vec<ScriptedClick>> {
    let mut clicks: Vec<ScriptedClick> = serde_json::from_str(json)?;
    clicks.sort_by_key(|click| click.at_ms);
    Ok(clicks)
}

pub fn load_script(path: impl AsRef<Path>) -> LevelResult<Vec<ScriptedClick>> {
    let json = std::fs::read_to_string(path)?;
    parse_script(&json)
}
