//! Lazy position/value generators over a [`Grid`]
//!
//! Every sampler is a [`GridWalk`] driven by a [`Movement`] rule:
//!
//! - [`Raster`] - deterministic scan with a correction vector at the edges
//! - [`Drunk`] - bounded random walk with a [`BoundaryMode`](crate::boundary::BoundaryMode)
//! - [`UniformRandom`] - independent uniform picks
//! - [`DistributionWalk`] - picks driven by caller-supplied distributions
//! - [`Line`] - linear interpolation between two points
//!
//! A walk yields [`Sample`]s until its `stop` count runs out (or forever when
//! `stop` is `None`; bound it with `take`). Walks cannot be rewound; build a
//! new one to start over. Visited positions can be recorded into a
//! caller-owned [`PositionLog`] for diagnostics.

mod distribution;
mod drunk;
mod line;
mod raster;
mod uniform;

pub use distribution::{AxisDistribution, DistributionWalk};
pub use drunk::{Drunk, DrunkParams};
pub use line::Line;
pub use raster::Raster;
pub use uniform::UniformRandom;

use rand::Rng;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ArgumentError;
use crate::grid::{Bounds, Grid, Position};

/// A movement rule: where a walk starts and how it moves on
pub trait Movement {
    /// Reject parameters that do not fit the grid
    fn validate(&self, _bounds: Bounds) -> Result<(), ArgumentError> {
        Ok(())
    }

    /// First position of the walk
    fn start(&mut self, bounds: Bounds) -> Option<Position>;

    /// Position following `current`; `None` ends the walk
    fn advance(&mut self, current: Position, bounds: Bounds) -> Option<Position>;
}

impl<M: Movement + ?Sized> Movement for Box<M> {
    fn validate(&self, bounds: Bounds) -> Result<(), ArgumentError> {
        (**self).validate(bounds)
    }

    fn start(&mut self, bounds: Bounds) -> Option<Position> {
        (**self).start(bounds)
    }

    fn advance(&mut self, current: Position, bounds: Bounds) -> Option<Position> {
        (**self).advance(current, bounds)
    }
}

/// One step of a walk: the cell value and where it was read
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub value: T,
    pub position: Position,
}

/// Append-only record of visited positions
///
/// Cloning shares the same record, so a log can outlive the walks writing to
/// it. Nothing in the walks reads it back.
#[derive(Debug, Clone, Default)]
pub struct PositionLog {
    entries: Arc<Mutex<Vec<Position>>>,
}

impl PositionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Position>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, position: Position) {
        self.entries().push(position);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Positions in the order they were visited
    pub fn snapshot(&self) -> Vec<Position> {
        self.entries().clone()
    }

    /// Visit counts as a text map: `.` unvisited, `1`-`9` visits, `#` for more
    pub fn render_ascii(&self, bounds: Bounds) -> String {
        let mut counts: HashMap<Position, usize> = HashMap::new();
        for position in self.entries().iter() {
            *counts.entry(*position).or_default() += 1;
        }

        let mut out = String::with_capacity(bounds.cells() + bounds.rows);
        for row in 0..bounds.rows {
            for col in 0..bounds.cols {
                let glyph = match counts.get(&Position::new(row, col)) {
                    None => '.',
                    Some(&n) if n <= 9 => char::from_digit(n as u32, 10).unwrap_or('#'),
                    Some(_) => '#',
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

/// A lazy walk over a grid
///
/// `G` is any shared handle to the grid (`&Grid<T>`, `Arc<Grid<T>>`, ...).
pub struct GridWalk<G, M> {
    grid: G,
    bounds: Bounds,
    movement: M,
    remaining: Option<usize>,
    current: Option<Position>,
    finished: bool,
    log: Option<PositionLog>,
}

impl<G, T, M> GridWalk<G, M>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
    M: Movement,
{
    /// Walk `grid` with `movement`, yielding at most `stop` samples
    pub fn new(grid: G, movement: M, stop: Option<usize>) -> Result<Self, ArgumentError> {
        let bounds = grid.bounds();
        movement.validate(bounds)?;
        Ok(Self {
            grid,
            bounds,
            movement,
            remaining: stop,
            current: None,
            finished: false,
            log: None,
        })
    }

    /// Record every emitted position into `log`
    pub fn with_log(mut self, log: PositionLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Attach a fresh log and hand it back alongside the walk
    pub fn logged(self) -> (Self, PositionLog) {
        let log = PositionLog::new();
        (self.with_log(log.clone()), log)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }
}

impl<G, T, M> Iterator for GridWalk<G, M>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
    M: Movement,
{
    type Item = Sample<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining == Some(0) {
            self.finished = true;
            return None;
        }

        let next = match self.current {
            None => self.movement.start(self.bounds),
            Some(current) => self.movement.advance(current, self.bounds),
        };
        let Some(position) = next else {
            self.finished = true;
            return None;
        };
        let Some(value) = self.grid.get(position).cloned() else {
            self.finished = true;
            return None;
        };

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        self.current = Some(position);
        if let Some(log) = &self.log {
            log.record(position);
        }

        Some(Sample { value, position })
    }
}

/// Raster scan from `start`, see [`Raster`]
pub fn raster<G, T>(
    grid: G,
    stop: Option<usize>,
    start: Position,
    primary: (i64, i64),
    secondary: (i64, i64),
) -> Result<GridWalk<G, Raster>, ArgumentError>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
{
    GridWalk::new(grid, Raster::new(start, primary, secondary), stop)
}

/// Bounded random walk from `start`, see [`Drunk`]
pub fn drunk<G, T, R>(
    grid: G,
    stop: Option<usize>,
    start: Position,
    params: DrunkParams,
    rng: R,
) -> Result<GridWalk<G, Drunk<R>>, ArgumentError>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
    R: Rng,
{
    GridWalk::new(grid, Drunk::new(start, params, rng), stop)
}

/// Independent uniform picks, see [`UniformRandom`]
pub fn uniform<G, T, R>(
    grid: G,
    stop: Option<usize>,
    rng: R,
) -> Result<GridWalk<G, UniformRandom<R>>, ArgumentError>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
    R: Rng,
{
    GridWalk::new(grid, UniformRandom::new(rng), stop)
}

/// Picks driven by one distribution per axis, see [`DistributionWalk`]
pub fn distribution<G, T>(
    grid: G,
    stop: Option<usize>,
    row: AxisDistribution,
    col: AxisDistribution,
) -> Result<GridWalk<G, DistributionWalk>, ArgumentError>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
{
    GridWalk::new(grid, DistributionWalk::new(row, col), stop)
}

/// Straight line from `start` to `end` in `steps` steps, see [`Line`]
pub fn line<G, T>(
    grid: G,
    stop: Option<usize>,
    start: Position,
    end: Position,
    steps: usize,
) -> Result<GridWalk<G, Line>, ArgumentError>
where
    G: Deref<Target = Grid<T>>,
    T: Clone,
{
    GridWalk::new(grid, Line::new(start, end, steps)?, stop)
}
