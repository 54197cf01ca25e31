use crate::error::ArgumentError;
use crate::grid::{Bounds, Position};

use super::Movement;

/// Deterministic traversal driven by two movement vectors
///
/// Each step applies `primary`. If that leaves the grid, `secondary` is added
/// as a correction, then both coordinates wrap modulo the grid extent. The
/// default vectors `(0, 1)` / `(1, 0)` scan row-major and return to the start
/// after `rows * cols` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raster {
    start: Position,
    primary: (i64, i64),
    secondary: (i64, i64),
}

impl Raster {
    pub fn new(start: Position, primary: (i64, i64), secondary: (i64, i64)) -> Self {
        Self {
            start,
            primary,
            secondary,
        }
    }

    pub fn row_major(start: Position) -> Self {
        Self::new(start, (0, 1), (1, 0))
    }

    pub fn column_major(start: Position) -> Self {
        Self::new(start, (1, 0), (0, 1))
    }
}

fn inside(row: i64, col: i64, bounds: Bounds) -> bool {
    (0..bounds.rows as i64).contains(&row) && (0..bounds.cols as i64).contains(&col)
}

impl Movement for Raster {
    fn validate(&self, bounds: Bounds) -> Result<(), ArgumentError> {
        bounds.check(self.start).map(drop)
    }

    fn start(&mut self, _bounds: Bounds) -> Option<Position> {
        Some(self.start)
    }

    fn advance(&mut self, current: Position, bounds: Bounds) -> Option<Position> {
        let mut row = current.row as i64 + self.primary.0;
        let mut col = current.col as i64 + self.primary.1;

        if !inside(row, col, bounds) {
            row += self.secondary.0;
            col += self.secondary.1;
        }

        Some(Position::new(
            row.rem_euclid(bounds.rows as i64) as usize,
            col.rem_euclid(bounds.cols as i64) as usize,
        ))
    }
}
