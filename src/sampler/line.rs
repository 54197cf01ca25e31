use crate::error::ArgumentError;
use crate::grid::{Bounds, Position};

use super::Movement;

/// Straight path from `start` to `end` split into `steps` equal steps
///
/// Positions are the rounded real-valued coordinates along the path. The walk
/// ends after `steps` steps, or as soon as a rounded position lands on `end`,
/// whichever comes first. Both ends must lie inside the grid, which keeps
/// every point of the path inside it too.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    start: Position,
    end: Position,
    steps: usize,
    delta: (f64, f64),
    taken: usize,
}

impl Line {
    pub fn new(start: Position, end: Position, steps: usize) -> Result<Self, ArgumentError> {
        if steps == 0 {
            return Err(ArgumentError::ZeroSteps);
        }
        let delta = (
            (end.row as f64 - start.row as f64) / steps as f64,
            (end.col as f64 - start.col as f64) / steps as f64,
        );
        Ok(Self {
            start,
            end,
            steps,
            delta,
            taken: 0,
        })
    }
}

impl Movement for Line {
    fn validate(&self, bounds: Bounds) -> Result<(), ArgumentError> {
        bounds.check(self.start)?;
        bounds.check(self.end).map(drop)
    }

    fn start(&mut self, _bounds: Bounds) -> Option<Position> {
        self.taken = 0;
        Some(self.start)
    }

    fn advance(&mut self, current: Position, _bounds: Bounds) -> Option<Position> {
        if current == self.end || self.taken >= self.steps {
            return None;
        }
        self.taken += 1;

        let exact_row = self.start.row as f64 + self.delta.0 * self.taken as f64;
        let exact_col = self.start.col as f64 + self.delta.1 * self.taken as f64;
        Some(Position::new(
            exact_row.round_ties_even().max(0.0) as usize,
            exact_col.round_ties_even().max(0.0) as usize,
        ))
    }
}
