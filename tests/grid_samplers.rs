//! Grid sampler family
//!
//! Walks over small grids with every sampler and checks positions, values,
//! boundary handling, stop counts and the shared position log.

use pulsegrid::boundary::BoundaryMode;
use pulsegrid::grid::{Grid, Position};
use pulsegrid::random::DistributionKind;
use pulsegrid::sampler::{self, AxisDistribution, DrunkParams, GridWalk, PositionLog, Raster};
use pulsegrid::ArgumentError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;

fn numbered(rows: usize, cols: usize) -> Grid<usize> {
    Grid::from_fn(rows, cols, |p| p.row * cols + p.col).unwrap()
}

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

// ========== Raster ==========

#[test]
fn test_raster_row_major_reads_every_cell() {
    let grid = numbered(3, 3);
    let values: Vec<usize> = sampler::raster(&grid, Some(10), pos(0, 0), (0, 1), (1, 0))
        .unwrap()
        .map(|s| s.value)
        .collect();
    assert_eq!(values, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 0]);
}

#[test]
fn test_raster_from_the_middle() {
    let grid = numbered(2, 3);
    let values: Vec<usize> = sampler::raster(&grid, Some(5), pos(1, 1), (0, 1), (1, 0))
        .unwrap()
        .map(|s| s.value)
        .collect();
    // (1,2) then off the right edge: down a row and wrap to (0,0)
    assert_eq!(values, vec![4, 5, 0, 1, 2]);
}

#[test]
fn test_raster_start_out_of_bounds() {
    let grid = numbered(3, 3);
    let result = sampler::raster(&grid, None, pos(3, 0), (0, 1), (1, 0));
    assert!(matches!(result, Err(ArgumentError::OutOfBounds { .. })));
}

// ========== Drunk ==========

#[test]
fn test_drunk_stays_inside_for_every_mode() {
    let grid = numbered(5, 7);
    for mode in [BoundaryMode::Wrap, BoundaryMode::Reflect, BoundaryMode::Clamp] {
        let params = DrunkParams {
            width: (3, 3),
            movement_2d: true,
            mode,
        };
        let walk = sampler::drunk(&grid, Some(500), pos(2, 3), params, StdRng::seed_from_u64(5))
            .unwrap();
        let bounds = walk.bounds();
        for sample in walk {
            assert!(
                bounds.contains(sample.position),
                "{} left the grid with mode {}",
                sample.position,
                mode
            );
        }
    }
}

#[test]
fn test_wrapped_drunk_tracks_free_walk() {
    let (rows, cols) = (4i64, 6i64);
    let grid = numbered(rows as usize, cols as usize);
    let params = DrunkParams {
        width: (3, 2),
        movement_2d: true,
        mode: BoundaryMode::Wrap,
    };
    let walk = sampler::drunk(&grid, Some(300), pos(1, 2), params, StdRng::seed_from_u64(21))
        .unwrap();

    // Same seed, same draws, no edges
    let mut rng = StdRng::seed_from_u64(21);
    let (mut row, mut col) = (1i64, 2i64);
    for (i, sample) in walk.enumerate() {
        if i > 0 {
            row += rng.gen_range(-3i64..=3);
            col += rng.gen_range(-2i64..=2);
        }
        assert_eq!(
            sample.position,
            pos(row.rem_euclid(rows) as usize, col.rem_euclid(cols) as usize),
            "step {} drifted from the free walk at ({}, {})",
            i,
            row,
            col
        );
    }
}

#[test]
fn test_drunk_is_reproducible_from_seed() {
    let grid = numbered(6, 6);
    let run = |seed| -> Vec<Position> {
        sampler::drunk(&grid, Some(50), pos(0, 0), DrunkParams::default(), StdRng::seed_from_u64(seed))
            .unwrap()
            .map(|s| s.position)
            .collect()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn test_drunk_one_axis_moves() {
    let grid = numbered(9, 9);
    let params = DrunkParams {
        width: (1, 1),
        movement_2d: false,
        mode: BoundaryMode::Clamp,
    };
    let positions: Vec<Position> =
        sampler::drunk(&grid, Some(200), pos(4, 4), params, StdRng::seed_from_u64(9))
            .unwrap()
            .map(|s| s.position)
            .collect();

    for pair in positions.windows(2) {
        let row_moved = pair[0].row != pair[1].row;
        let col_moved = pair[0].col != pair[1].col;
        assert!(
            !(row_moved && col_moved),
            "one-axis walk moved diagonally from {} to {}",
            pair[0],
            pair[1]
        );
    }
}

// ========== Uniform ==========

#[test]
fn test_uniform_covers_grid() {
    let grid = numbered(3, 4);
    let seen: HashSet<Position> = sampler::uniform(&grid, Some(2000), StdRng::seed_from_u64(1))
        .unwrap()
        .map(|s| s.position)
        .collect();
    assert_eq!(seen.len(), 12, "uniform walk should reach every cell");
}

// ========== Distribution ==========

#[test]
fn test_gauss_walk_prefers_the_centre() {
    let grid = numbered(9, 9);
    let row = AxisDistribution::from_kind(DistributionKind::default(), 1).unwrap();
    let col = AxisDistribution::from_kind(DistributionKind::default(), 2).unwrap();

    let samples: Vec<Position> = sampler::distribution(&grid, Some(1000), row, col)
        .unwrap()
        .map(|s| s.position)
        .collect();
    let central = samples
        .iter()
        .filter(|p| (3..=5).contains(&p.row) && (3..=5).contains(&p.col))
        .count();
    assert!(
        central > 500,
        "a standard normal over [-4, 4] should land mostly in the middle, got {} of 1000",
        central
    );
}

#[test]
fn test_distribution_custom_draw() {
    let grid = numbered(4, 4);
    let row = AxisDistribution::new(Box::new(|| 1.0), 0.0, 1.0).unwrap();
    let col = AxisDistribution::new(Box::new(|| -5.0), 0.0, 1.0).unwrap();
    let positions: Vec<Position> = sampler::distribution(&grid, Some(3), row, col)
        .unwrap()
        .map(|s| s.position)
        .collect();
    assert_eq!(positions, vec![pos(3, 0); 3]);
}

#[test]
fn test_distribution_rejects_empty_range() {
    let result = AxisDistribution::new(Box::new(|| 0.0), 1.0, 1.0);
    assert!(matches!(result, Err(ArgumentError::EmptyRange { .. })));
}

// ========== Line ==========

#[test]
fn test_line_across_grid() {
    let grid = numbered(5, 5);
    let positions: Vec<Position> = sampler::line(&grid, None, pos(0, 0), pos(4, 4), 4)
        .unwrap()
        .map(|s| s.position)
        .collect();
    assert_eq!(positions, vec![pos(0, 0), pos(1, 1), pos(2, 2), pos(3, 3), pos(4, 4)]);
}

#[test]
fn test_line_end_outside_grid() {
    let grid = numbered(5, 5);
    let result = sampler::line(&grid, None, pos(0, 0), pos(5, 0), 4);
    assert!(matches!(result, Err(ArgumentError::OutOfBounds { .. })));
}

#[test]
fn test_line_zero_steps() {
    let grid = numbered(5, 5);
    let result = sampler::line(&grid, None, pos(0, 0), pos(4, 4), 0);
    assert_eq!(result.err(), Some(ArgumentError::ZeroSteps));
}

// ========== Stop counts and logging ==========

#[test]
fn test_stop_zero_yields_nothing() {
    let grid = numbered(3, 3);
    let mut walk = sampler::raster(&grid, Some(0), pos(0, 0), (0, 1), (1, 0)).unwrap();
    assert!(walk.next().is_none());
}

#[test]
fn test_shared_log_records_several_walks() {
    let grid = Arc::new(numbered(2, 2));
    let log = PositionLog::new();

    let first = GridWalk::new(Arc::clone(&grid), Raster::row_major(pos(0, 0)), Some(2))
        .unwrap()
        .with_log(log.clone());
    let second = GridWalk::new(Arc::clone(&grid), Raster::row_major(pos(0, 0)), Some(1))
        .unwrap()
        .with_log(log.clone());
    assert_eq!(first.count() + second.count(), 3);

    assert_eq!(log.snapshot(), vec![pos(0, 0), pos(0, 1), pos(0, 0)]);
    assert_eq!(log.render_ascii(grid.bounds()), "21\n..\n");

    log.clear();
    assert!(log.is_empty());
}

// ========== Grids ==========

#[test]
fn test_multichannel_cells() {
    let grid = Grid::from_shape(&[1, 2, 3], vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
    let cells: Vec<Vec<f64>> = sampler::raster(&grid, Some(2), pos(0, 0), (0, 1), (1, 0))
        .unwrap()
        .map(|s| s.value)
        .collect();
    assert_eq!(cells, vec![vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]]);
}

#[test]
fn test_shape_must_be_two_or_three_dimensional() {
    assert_eq!(
        Grid::<Vec<f64>>::from_shape(&[4], vec![0.0; 4]),
        Err(ArgumentError::NotTwoDimensional { dims: 1 })
    );
    assert_eq!(
        Grid::<Vec<f64>>::from_shape(&[1, 1, 1, 1], vec![0.0]),
        Err(ArgumentError::NotTwoDimensional { dims: 4 })
    );
}
