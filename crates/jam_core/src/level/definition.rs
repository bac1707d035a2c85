use std::collections::BTreeMap;
use std::path::Path;

use pathfinding::prelude::bfs;
use serde::{Deserialize, Serialize};

use crate::ecs::Color;
use crate::error::{LevelError, LevelResult};
use crate::grid::GridCoord;

const MIN_WAITING_AREA_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSpec {
    Empty,
    Void,
    Passenger(Color),
}

/// Pure data description of a level, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub rows: usize,
    pub cols: usize,
    /// Row-major, `rows * cols` entries.
    pub cells: Vec<CellSpec>,
    pub waiting_area_size: usize,
    pub time_limit_secs: u32,
    /// Bus colors in serving order, front first.
    pub buses: Vec<Color>,
}

/// Non-fatal design issues reported by [`LevelDefinition::lint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LevelWarning {
    /// Passengers of a color do not exactly fill the seats offered for it.
    ColorImbalance {
        color: Color,
        passengers: usize,
        seats: usize,
    },
    /// Void cells seal this passenger off from the exit row for good.
    SealedPassenger { cell: GridCoord },
}

impl LevelDefinition {
    pub fn from_json_str(json: &str) -> LevelResult<Self> {
        let definition: LevelDefinition = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn load(path: impl AsRef<Path>) -> LevelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> LevelResult<()> {
        if self.rows < 1 || self.cols < 1 {
            return Err(LevelError::invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        let expected = self.rows.checked_mul(self.cols).ok_or_else(|| {
            LevelError::invalid(format!("grid {}x{} is too large", self.rows, self.cols))
        })?;
        if self.cells.len() != expected {
            return Err(LevelError::invalid(format!(
                "expected {expected} cells, got {}",
                self.cells.len()
            )));
        }
        if self.waiting_area_size < MIN_WAITING_AREA_SIZE {
            return Err(LevelError::invalid(format!(
                "waiting area needs at least {MIN_WAITING_AREA_SIZE} slots, got {}",
                self.waiting_area_size
            )));
        }
        if self.time_limit_secs < 1 {
            return Err(LevelError::invalid("time limit must be at least 1 second"));
        }
        if self.buses.is_empty() {
            return Err(LevelError::invalid("bus sequence is empty"));
        }
        Ok(())
    }

    pub fn cell(&self, coord: GridCoord) -> Option<CellSpec> {
        if coord.row < 0 || coord.col < 0 {
            return None;
        }
        let (row, col) = (coord.row as usize, coord.col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Passenger cells in row-major order.
    pub fn passengers(&self) -> impl Iterator<Item = (GridCoord, Color)> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().filter_map(move |(i, spec)| match spec {
            CellSpec::Passenger(color) => Some((
                GridCoord::new((i / cols) as i32, (i % cols) as i32),
                *color,
            )),
            _ => None,
        })
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers().count()
    }

    /// Design checks the runtime does not enforce: every color's passengers
    /// should exactly fill its buses, and no passenger should be walled in by
    /// void cells.
    pub fn lint(&self, bus_capacity: usize) -> Vec<LevelWarning> {
        let mut passengers: BTreeMap<Color, usize> = BTreeMap::new();
        for (_, color) in self.passengers() {
            *passengers.entry(color).or_insert(0) += 1;
        }
        let mut seats: BTreeMap<Color, usize> = BTreeMap::new();
        for color in &self.buses {
            *seats.entry(*color).or_insert(0) += bus_capacity;
        }

        let mut warnings: Vec<LevelWarning> = Color::ALL
            .iter()
            .filter_map(|color| {
                let passengers = passengers.get(color).copied().unwrap_or(0);
                let seats = seats.get(color).copied().unwrap_or(0);
                (passengers != seats).then_some(LevelWarning::ColorImbalance {
                    color: *color,
                    passengers,
                    seats,
                })
            })
            .collect();

        for (cell, _) in self.passengers() {
            if !self.can_ever_exit(cell) {
                warnings.push(LevelWarning::SealedPassenger { cell });
            }
        }
        warnings
    }

    /// Reachability of row 0 once every other passenger has moved away.
    fn can_ever_exit(&self, from: GridCoord) -> bool {
        bfs(
            &from,
            |coord| {
                [(1, 0), (-1, 0), (0, 1), (0, -1)]
                    .iter()
                    .map(|(dr, dc)| GridCoord::new(coord.row + dr, coord.col + dc))
                    .filter(|next| matches!(self.cell(*next), Some(spec) if spec != CellSpec::Void))
                    .collect::<Vec<_>>()
            },
            |coord| coord.is_exit_row(),
        )
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> LevelDefinition {
        LevelDefinition {
            rows: 2,
            cols: 2,
            cells: vec![
                CellSpec::Empty,
                CellSpec::Empty,
                CellSpec::Passenger(Color::Red),
                CellSpec::Void,
            ],
            waiting_area_size: 2,
            time_limit_secs: 30,
            buses: vec![Color::Red],
        }
    }

    #[test]
    fn parses_json_level() {
        let json = r#"{
            "rows": 1, "cols": 3,
            "cells": ["empty", "void", {"passenger": "blue"}],
            "waiting_area_size": 3,
            "time_limit_secs": 20,
            "buses": ["blue", "red"]
        }"#;
        let level = LevelDefinition::from_json_str(json).expect("level");
        assert_eq!(level.cells[2], CellSpec::Passenger(Color::Blue));
        assert_eq!(level.buses, vec![Color::Blue, Color::Red]);
        assert_eq!(
            level.passengers().collect::<Vec<_>>(),
            vec![(GridCoord::new(0, 2), Color::Blue)]
        );
    }

    #[test]
    fn rejects_invalid_definitions() {
        let mut level = two_by_two();
        level.cells.pop();
        assert!(matches!(
            level.validate(),
            Err(LevelError::InvalidLevelDefinition { .. })
        ));

        let mut level = two_by_two();
        level.waiting_area_size = 1;
        assert!(level.validate().is_err());

        let mut level = two_by_two();
        level.rows = 0;
        level.cells.clear();
        assert!(level.validate().is_err());

        let mut level = two_by_two();
        level.time_limit_secs = 0;
        assert!(level.validate().is_err());

        let mut level = two_by_two();
        level.buses.clear();
        assert!(level.validate().is_err());

        assert!(two_by_two().validate().is_ok());
    }

    #[test]
    fn oversized_dimensions_are_invalid_not_a_panic() {
        let json = r#"{
            "rows": 18446744073709551615, "cols": 2,
            "cells": ["empty", "empty"],
            "waiting_area_size": 2,
            "time_limit_secs": 10,
            "buses": ["red"]
        }"#;
        assert!(matches!(
            LevelDefinition::from_json_str(json),
            Err(LevelError::InvalidLevelDefinition { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LevelDefinition::from_json_str("{ \"rows\": 2 ").unwrap_err();
        assert!(matches!(err, LevelError::Parse(_)));
    }

    #[test]
    fn lint_reports_seat_imbalance_and_sealed_passengers() {
        let level = LevelDefinition {
            rows: 3,
            cols: 3,
            cells: vec![
                CellSpec::Empty,
                CellSpec::Empty,
                CellSpec::Empty,
                CellSpec::Void,
                CellSpec::Passenger(Color::Red),
                CellSpec::Void,
                CellSpec::Passenger(Color::Red),
                CellSpec::Void,
                CellSpec::Empty,
            ],
            waiting_area_size: 2,
            time_limit_secs: 10,
            buses: vec![Color::Red],
        };
        let warnings = level.lint(3);
        assert!(warnings.contains(&LevelWarning::ColorImbalance {
            color: Color::Red,
            passengers: 2,
            seats: 3,
        }));
        assert!(warnings.contains(&LevelWarning::SealedPassenger {
            cell: GridCoord::new(2, 0)
        }));
        assert!(!warnings.contains(&LevelWarning::SealedPassenger {
            cell: GridCoord::new(1, 1)
        }));
    }

    #[test]
    fn balanced_level_lints_clean() {
        let level = two_by_two();
        assert_eq!(level.lint(1), vec![]);
    }
}
