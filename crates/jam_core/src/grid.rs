//! Grid occupancy and exit-row pathfinding.
//!
//! The grid is a row-major table of [`CellState`]. Passengers start on
//! `Occupied` cells and must reach row 0 through `Empty` cells only; `Void`
//! cells never change. Paths are searched breadth-first with a fixed
//! neighbour order (down, up, right, left) so results are reproducible, and
//! are never cached: occupancy changes every time a passenger leaves its cell.

use bevy_ecs::prelude::Resource;
use pathfinding::prelude::bfs;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, LevelError, LevelResult};
use crate::level::CellSpec;

/// Neighbour exploration order: down, up, right, left.
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Void,
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub row: i32,
    pub col: i32,
}

impl GridCoord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_exit_row(&self) -> bool {
        self.row == 0
    }
}

#[derive(Debug, Clone, Resource)]
pub struct GridIndex {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl GridIndex {
    pub fn build(rows: usize, cols: usize, specs: &[CellSpec]) -> LevelResult<Self> {
        if rows < 1 || cols < 1 {
            return Err(LevelError::invalid(format!(
                "grid must be at least 1x1, got {rows}x{cols}"
            )));
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| LevelError::invalid(format!("grid {rows}x{cols} is too large")))?;
        if specs.len() != expected {
            return Err(LevelError::invalid(format!(
                "expected {expected} cells for a {rows}x{cols} grid, got {}",
                specs.len()
            )));
        }
        let cells = specs
            .iter()
            .map(|spec| match spec {
                CellSpec::Empty => CellState::Empty,
                CellSpec::Void => CellState::Void,
                CellSpec::Passenger(_) => CellState::Occupied,
            })
            .collect();
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| coord.row as usize * self.cols + coord.col as usize)
    }

    pub fn cell(&self, coord: GridCoord) -> Option<CellState> {
        self.index(coord).map(|i| self.cells[i])
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|cell| **cell == state).count()
    }

    /// Shortest 4-connected path from `from` to the first reachable row-0
    /// cell, excluding `from` itself. `Some(vec![])` when `from` is already
    /// on the exit row; `None` when no chain of `Empty` cells reaches row 0.
    pub fn find_path_to_exit_row(&self, from: GridCoord) -> Option<Vec<GridCoord>> {
        if !self.in_bounds(from) {
            return None;
        }
        let mut path = bfs(
            &from,
            |coord| self.empty_neighbours(*coord),
            |coord| coord.is_exit_row(),
        )?;
        path.remove(0);
        Some(path)
    }

    fn empty_neighbours(&self, coord: GridCoord) -> Vec<GridCoord> {
        DIRECTIONS
            .iter()
            .map(|(dr, dc)| GridCoord::new(coord.row + dr, coord.col + dc))
            .filter(|next| self.cell(*next) == Some(CellState::Empty))
            .collect()
    }

    /// Frees a cell a passenger has left. Idempotent; `Void` stays `Void`.
    pub fn mark_empty(&mut self, coord: GridCoord) -> Result<(), GridError> {
        let index = self.index(coord).ok_or(GridError::OutOfBounds {
            row: coord.row,
            col: coord.col,
        })?;
        if self.cells[index] == CellState::Occupied {
            self.cells[index] = CellState::Empty;
        }
        Ok(())
    }
}
