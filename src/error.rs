//! Error types shared by the generators, the event buffer and the dispatcher

use std::path::PathBuf;
use thiserror::Error;

use crate::grid::Position;

/// Bad arguments, rejected synchronously at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    #[error("cannot distribute zero events")]
    ZeroEvents,

    #[error("{events} events cannot fit in {positions} positions")]
    EventsExceedPositions { events: usize, positions: usize },

    #[error("grid must have two dimensions (plus an optional channel axis), got {dims}")]
    NotTwoDimensional { dims: usize },

    #[error("grid has no cells")]
    EmptyGrid,

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid shape {shape:?} needs {expected} values, got {found}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        found: usize,
    },

    #[error("unsupported boundary mode '{0}' (expected wrap, reflect or clamp)")]
    UnsupportedBoundaryMode(String),

    #[error("position {position} is outside a {rows}x{cols} grid")]
    OutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },

    #[error("{name} must be a positive number of seconds, got {value}")]
    NonPositiveDuration { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    NegativeDuration { name: &'static str, value: f64 },

    #[error("distribution range [{low}, {high}] is empty")]
    EmptyRange { low: f64, high: f64 },

    #[error("line needs at least one step")]
    ZeroSteps,

    #[error("cannot choose from an empty list")]
    EmptyChoices,

    #[error("{length}s in steps of {grain}s is more steps than can be counted")]
    TooManySteps { length: f64, grain: f64 },
}

/// A single send that the transport could not complete
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode OSC packet: {0}")]
    Encode(#[from] rosc::OscError),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid target address '{0}'")]
    Address(String),

    #[error("transport closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("transport failure at event {index}: {source}")]
    Transport {
        index: usize,
        #[source]
        source: TransportError,
    },

    #[error("event {index} at {found}s is earlier than the previous event at {previous}s")]
    OutOfOrder {
        index: usize,
        previous: f64,
        found: f64,
    },

    #[error("event {index} has no finite timestamp ({time})")]
    NonFiniteTime { index: usize, time: f64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("dispatch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
