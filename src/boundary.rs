//! Boundary policies for coordinates that leave the grid

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ArgumentError;

/// What to do with a coordinate outside `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Modulo the inclusive range, so `max + 1` lands on `min`
    #[default]
    Wrap,
    /// Mirror at the edges without repeating them: `max + 1` lands on `max - 1`
    Reflect,
    /// Saturate at the nearest edge
    #[serde(alias = "limit")]
    Clamp,
}

impl FromStr for BoundaryMode {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" => Ok(BoundaryMode::Wrap),
            "reflect" => Ok(BoundaryMode::Reflect),
            "clamp" | "limit" => Ok(BoundaryMode::Clamp),
            _ => Err(ArgumentError::UnsupportedBoundaryMode(s.to_string())),
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryMode::Wrap => "wrap",
            BoundaryMode::Reflect => "reflect",
            BoundaryMode::Clamp => "clamp",
        };
        f.write_str(name)
    }
}

/// Fit `value` into the inclusive range `[min, max]`
///
/// Bounds given in the wrong order are swapped.
pub fn fit(value: i64, min: i64, max: i64, mode: BoundaryMode) -> i64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    if (min..=max).contains(&value) {
        return value;
    }

    match mode {
        BoundaryMode::Clamp => value.clamp(min, max),
        BoundaryMode::Wrap => min + (value - min).rem_euclid(max - min + 1),
        BoundaryMode::Reflect => {
            let span = max - min;
            if span == 0 {
                return min;
            }
            let period = 2 * span;
            let offset = (value - min).rem_euclid(period);
            if offset <= span {
                min + offset
            } else {
                min + period - offset
            }
        }
    }
}
