use crate::error::ArgumentError;
use crate::grid::{Bounds, Position};
use crate::random::{rescale, DistributionKind, Draw};

use super::Movement;

/// A random source for one axis, with the range its values are read in
///
/// Draws outside `[low, high]` are clamped before being rescaled onto the
/// grid, so the edges collect the tails of unbounded distributions.
pub struct AxisDistribution {
    draw: Draw,
    low: f64,
    high: f64,
}

impl AxisDistribution {
    pub fn new(draw: Draw, low: f64, high: f64) -> Result<Self, ArgumentError> {
        if !(low < high) {
            return Err(ArgumentError::EmptyRange { low, high });
        }
        Ok(Self { draw, low, high })
    }

    /// Use a named distribution over its natural range
    pub fn from_kind(kind: DistributionKind, seed: u64) -> Result<Self, ArgumentError> {
        let (low, high) = kind.natural_range();
        Self::new(kind.into_draw(seed), low, high)
    }

    /// Index in `0..extent` for the next draw
    pub fn index(&mut self, extent: usize) -> usize {
        let last = extent.saturating_sub(1);
        let raw = (self.draw)().clamp(self.low, self.high);
        let scaled = rescale(raw, self.low, self.high, 0.0, last as f64);
        (scaled.round_ties_even().max(0.0) as usize).min(last)
    }
}

/// Every step reads one index per axis from its own distribution
pub struct DistributionWalk {
    row: AxisDistribution,
    col: AxisDistribution,
}

impl DistributionWalk {
    pub fn new(row: AxisDistribution, col: AxisDistribution) -> Self {
        Self { row, col }
    }

    fn pick(&mut self, bounds: Bounds) -> Position {
        let row = self.row.index(bounds.rows);
        let col = self.col.index(bounds.cols);
        Position::new(row, col)
    }
}

impl Movement for DistributionWalk {
    fn start(&mut self, bounds: Bounds) -> Option<Position> {
        Some(self.pick(bounds))
    }

    fn advance(&mut self, _current: Position, bounds: Bounds) -> Option<Position> {
        Some(self.pick(bounds))
    }
}
