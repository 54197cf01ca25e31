//! Rectangular grids of cell values
//!
//! A [`Grid`] is read-only once built. Samplers walk it by [`Position`] and
//! hand back clones of the cells they land on.

use std::fmt;

use crate::error::ArgumentError;

/// A `(row, col)` index into a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Grid extent, `rows` and `cols` are both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub rows: usize,
    pub cols: usize,
}

impl Bounds {
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    pub fn check(&self, position: Position) -> Result<Position, ArgumentError> {
        if self.contains(position) {
            Ok(position)
        } else {
            Err(ArgumentError::OutOfBounds {
                position,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Row-major 2D storage
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Build from nested rows; every row must have the same non-zero length
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ArgumentError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(ArgumentError::EmptyGrid);
        }

        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * expected);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != expected {
                return Err(ArgumentError::RaggedGrid {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }

        Ok(Self {
            rows: row_count,
            cols: expected,
            cells,
        })
    }

    /// Build a grid by evaluating `f` at every position
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(Position) -> T,
    ) -> Result<Self, ArgumentError> {
        if rows == 0 || cols == 0 {
            return Err(ArgumentError::EmptyGrid);
        }
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(Position::new(row, col)));
            }
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn get(&self, position: Position) -> Option<&T> {
        if self.bounds().contains(position) {
            self.cells.get(position.row * self.cols + position.col)
        } else {
            None
        }
    }
}

impl<T: Clone> Grid<Vec<T>> {
    /// Build a multi-channel grid from a flat buffer and an array shape
    ///
    /// `[rows, cols]` gives single-channel cells, `[rows, cols, channels]`
    /// gives one `Vec` of `channels` values per cell (e.g. an RGB raster).
    pub fn from_shape(shape: &[usize], data: Vec<T>) -> Result<Self, ArgumentError> {
        let (rows, cols, channels) = match *shape {
            [rows, cols] => (rows, cols, 1),
            [rows, cols, channels] => (rows, cols, channels),
            _ => {
                return Err(ArgumentError::NotTwoDimensional { dims: shape.len() });
            }
        };
        if rows == 0 || cols == 0 || channels == 0 {
            return Err(ArgumentError::EmptyGrid);
        }

        let expected = rows * cols * channels;
        if data.len() != expected {
            return Err(ArgumentError::ShapeMismatch {
                shape: shape.to_vec(),
                expected,
                found: data.len(),
            });
        }

        let cells = data.chunks(channels).map(<[T]>::to_vec).collect();
        Ok(Self { rows, cols, cells })
    }
}

impl Grid<Vec<f64>> {
    /// Single-channel diagonal ramp from 0.0 at `(0, 0)` to 1.0 at the far corner
    pub fn gradient(rows: usize, cols: usize) -> Result<Self, ArgumentError> {
        let span = (rows + cols).saturating_sub(2).max(1) as f64;
        Self::from_fn(rows, cols, |p| vec![(p.row + p.col) as f64 / span])
    }
}
