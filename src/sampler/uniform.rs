use rand::Rng;

use crate::grid::{Bounds, Position};

use super::Movement;

/// Every step picks row and column independently and uniformly
pub struct UniformRandom<R> {
    rng: R,
}

impl<R: Rng> UniformRandom<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn pick(&mut self, bounds: Bounds) -> Position {
        Position::new(
            self.rng.gen_range(0..bounds.rows),
            self.rng.gen_range(0..bounds.cols),
        )
    }
}

impl<R: Rng> Movement for UniformRandom<R> {
    fn start(&mut self, bounds: Bounds) -> Option<Position> {
        Some(self.pick(bounds))
    }

    fn advance(&mut self, _current: Position, bounds: Bounds) -> Option<Position> {
        Some(self.pick(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::sampler::GridWalk;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_covers_every_cell() {
        let grid = Grid::gradient(3, 4).unwrap();
        let movement = UniformRandom::new(StdRng::seed_from_u64(9));
        let seen: HashSet<Position> = GridWalk::new(&grid, movement, Some(2000))
            .unwrap()
            .map(|s| s.position)
            .collect();
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let grid = Grid::gradient(8, 8).unwrap();
        let run = |seed| -> Vec<Position> {
            GridWalk::new(&grid, UniformRandom::new(StdRng::seed_from_u64(seed)), Some(32))
                .unwrap()
                .map(|s| s.position)
                .collect()
        };
        assert_eq!(run(4), run(4));
        assert_ne!(run(4), run(5));
    }
}
