use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::boundary::{fit, BoundaryMode};
use crate::error::ArgumentError;
use crate::grid::{Bounds, Position};

use super::Movement;

/// Step sizes and edge handling for a [`Drunk`] walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrunkParams {
    /// Largest step per axis as `(rows, cols)`; steps are uniform in `[-w, w]`
    pub width: (u32, u32),
    /// Move both axes every step, otherwise one axis chosen at 50% odds
    pub movement_2d: bool,
    pub mode: BoundaryMode,
}

impl Default for DrunkParams {
    fn default() -> Self {
        Self {
            width: (1, 1),
            movement_2d: true,
            mode: BoundaryMode::Wrap,
        }
    }
}

/// Bounded random walk
pub struct Drunk<R> {
    start: Position,
    params: DrunkParams,
    rng: R,
}

impl<R: Rng> Drunk<R> {
    pub fn new(start: Position, params: DrunkParams, rng: R) -> Self {
        Self { start, params, rng }
    }

    fn deviation(&mut self, width: u32) -> i64 {
        let width = i64::from(width);
        self.rng.gen_range(-width..=width)
    }
}

impl<R: Rng> Movement for Drunk<R> {
    fn validate(&self, bounds: Bounds) -> Result<(), ArgumentError> {
        bounds.check(self.start).map(drop)
    }

    fn start(&mut self, _bounds: Bounds) -> Option<Position> {
        Some(self.start)
    }

    fn advance(&mut self, current: Position, bounds: Bounds) -> Option<Position> {
        let (row_width, col_width) = self.params.width;
        let mut row = current.row as i64;
        let mut col = current.col as i64;

        if self.params.movement_2d {
            row += self.deviation(row_width);
            col += self.deviation(col_width);
        } else if self.rng.gen_bool(0.5) {
            row += self.deviation(row_width);
        } else {
            col += self.deviation(col_width);
        }

        let mode = self.params.mode;
        Some(Position::new(
            fit(row, 0, bounds.rows as i64 - 1, mode) as usize,
            fit(col, 0, bounds.cols as i64 - 1, mode) as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::sampler::GridWalk;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_width_stands_still() {
        let grid = Grid::gradient(4, 4).unwrap();
        let params = DrunkParams {
            width: (0, 0),
            ..DrunkParams::default()
        };
        let movement = Drunk::new(Position::new(2, 1), params, StdRng::seed_from_u64(0));
        let mut walk = GridWalk::new(&grid, movement, Some(20)).unwrap();
        assert!(walk.all(|s| s.position == Position::new(2, 1)));
    }

    #[test]
    fn test_one_axis_at_a_time() {
        let grid = Grid::gradient(50, 50).unwrap();
        let params = DrunkParams {
            width: (1, 1),
            movement_2d: false,
            mode: BoundaryMode::Clamp,
        };
        let movement = Drunk::new(Position::new(25, 25), params, StdRng::seed_from_u64(11));
        let visited: Vec<Position> = GridWalk::new(&grid, movement, Some(200))
            .unwrap()
            .map(|s| s.position)
            .collect();
        for pair in visited.windows(2) {
            let moved_rows = pair[0].row != pair[1].row;
            let moved_cols = pair[0].col != pair[1].col;
            assert!(!(moved_rows && moved_cols), "both axes moved: {pair:?}");
        }
    }

    #[test]
    fn test_reflect_stays_inside() {
        let grid = Grid::gradient(3, 2).unwrap();
        let params = DrunkParams {
            width: (4, 5),
            movement_2d: true,
            mode: BoundaryMode::Reflect,
        };
        let movement = Drunk::new(Position::new(0, 0), params, StdRng::seed_from_u64(5));
        let mut walk = GridWalk::new(&grid, movement, Some(500)).unwrap();
        assert!(walk.all(|s| s.position.row < 3 && s.position.col < 2));
    }
}
