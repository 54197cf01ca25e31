//! TOML composition files
//!
//! A config names an OSC target and a list of voices:
//!
//! ```toml
//! [output]
//! target = "127.0.0.1:57120"
//! on_send_error = "retry"   # abort | skip | retry
//! retries = 2
//! seed = 7
//! length = 8.0
//!
//! [[voice]]
//! kind = "euclid"
//! address = "/kick"
//! key = 36
//! events = 3
//! positions = 8
//! cycle = 1.0
//!
//! [[voice]]
//! kind = "grid"
//! address = "/pixel"
//! rate = 0.125
//! source = { type = "gradient", rows = 4, cols = 4 }
//! walk = { type = "drunk", start = [1, 1], mode = "reflect" }
//!
//! [[voice]]
//! kind = "control"
//! address = "/cutoff"
//! rate = 0.25
//! distribution = { kind = "high" }
//! ```
//!
//! Every voice takes an optional `at` (seconds before it starts) and
//! `length` (defaults to `output.length`). Random voices are seeded from
//! `output.seed`, so a config always renders the same events.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rosc::OscMessage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::composer::{BoxedComposer, Scheduler};
use crate::dispatcher::SendPolicy;
use crate::error::{ArgumentError, Error, Result};
use crate::euclid::distribute;
use crate::event::SortedEvents;
use crate::grid::{Grid, Position};
use crate::random::DistributionKind;
use crate::sampler::{
    AxisDistribution, DistributionWalk, Drunk, DrunkParams, GridWalk, Line, Movement, Raster,
    UniformRandom,
};
use crate::trigger_player::TriggerPlayer;
use crate::voices::{
    AscendVoice, ChoiceVoice, ControlDistributionVoice, DrunkVoice, EuclidVoice, GridVoice,
    RampVoice, DEFAULT_AMP,
};

/// Absorbs float noise when turning a length into a sample count
const COUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "voice")]
    pub voices: Vec<VoiceConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnSendError {
    Abort,
    #[default]
    Skip,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// OSC destination as `host:port`
    pub target: String,
    pub on_send_error: OnSendError,
    /// Extra attempts per message when `on_send_error = "retry"`
    pub retries: u32,
    pub seed: u64,
    /// Default voice length in seconds
    pub length: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: "127.0.0.1:57120".to_string(),
            on_send_error: OnSendError::Skip,
            retries: 2,
            seed: 0,
            length: 8.0,
        }
    }
}

impl OutputConfig {
    pub fn send_policy(&self) -> SendPolicy {
        match self.on_send_error {
            OnSendError::Abort => SendPolicy::Abort,
            OnSendError::Skip => SendPolicy::Skip,
            OnSendError::Retry => SendPolicy::Retry {
                attempts: self.retries,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VoiceConfig {
    Euclid {
        address: String,
        key: i32,
        events: usize,
        positions: usize,
        /// Seconds for one pass of the pattern
        cycle: f64,
        #[serde(default)]
        rotation: i64,
        #[serde(default = "default_amp")]
        amp: f32,
        #[serde(flatten)]
        timing: Timing,
    },
    Grid {
        address: String,
        /// Seconds between samples
        rate: f64,
        source: GridSource,
        #[serde(default)]
        walk: WalkConfig,
        /// Upper bound on the number of samples
        #[serde(default)]
        stop: Option<usize>,
        #[serde(flatten)]
        timing: Timing,
    },
    Ramp {
        address: String,
        start: f64,
        end: f64,
        #[serde(default)]
        low: f64,
        #[serde(default = "default_high")]
        high: f64,
        #[serde(default = "default_grain")]
        grain: f64,
        #[serde(flatten)]
        timing: Timing,
    },
    Choice {
        address: String,
        choices: Vec<i32>,
        dur: f64,
        #[serde(default)]
        distribution: DistributionKind,
        /// Range the draws are read in, defaults to the distribution's own
        #[serde(default)]
        range: Option<(f64, f64)>,
        #[serde(default = "default_amp")]
        amp: f32,
        #[serde(flatten)]
        timing: Timing,
    },
    Drunk {
        address: String,
        choices: Vec<i32>,
        dur: f64,
        #[serde(default = "default_amp")]
        amp: f32,
        #[serde(flatten)]
        timing: Timing,
    },
    /// Control values drawn from a distribution
    Control {
        address: String,
        /// Seconds between values
        rate: f64,
        #[serde(default = "default_control_distribution")]
        distribution: DistributionKind,
        #[serde(default)]
        range: Option<(f64, f64)>,
        #[serde(flatten)]
        timing: Timing,
    },
    Ascend {
        address: String,
        choices: Vec<i32>,
        dur: f64,
        #[serde(default = "default_amp")]
        amp: f32,
        #[serde(flatten)]
        timing: Timing,
    },
}

/// When a voice starts and how long it runs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default)]
    pub at: f64,
    #[serde(default)]
    pub length: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GridSource {
    /// Flat row-major values with a `[rows, cols]` or `[rows, cols, channels]` shape
    Inline { shape: Vec<usize>, data: Vec<f64> },
    /// Values rising from 0 at the top left to 1 at the bottom right
    Gradient { rows: usize, cols: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WalkConfig {
    Raster {
        #[serde(default)]
        start: [usize; 2],
        #[serde(default = "default_primary")]
        primary: (i64, i64),
        #[serde(default = "default_secondary")]
        secondary: (i64, i64),
    },
    Drunk {
        #[serde(default)]
        start: [usize; 2],
        #[serde(flatten)]
        params: DrunkParams,
    },
    Random,
    Distribution {
        #[serde(default)]
        row: DistributionKind,
        #[serde(default)]
        col: DistributionKind,
    },
    Line {
        #[serde(default)]
        start: [usize; 2],
        end: [usize; 2],
        #[serde(default = "default_steps")]
        steps: usize,
    },
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig::Raster {
            start: [0, 0],
            primary: default_primary(),
            secondary: default_secondary(),
        }
    }
}

fn default_amp() -> f32 {
    DEFAULT_AMP
}

fn default_control_distribution() -> DistributionKind {
    DistributionKind::Uniform
}

fn default_high() -> f64 {
    1.0
}

fn default_grain() -> f64 {
    0.05
}

fn default_primary() -> (i64, i64) {
    (0, 1)
}

fn default_secondary() -> (i64, i64) {
    (1, 0)
}

fn default_steps() -> usize {
    10
}

fn position([row, col]: [usize; 2]) -> Position {
    Position::new(row, col)
}

impl Config {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Register every voice with a fresh scheduler
    ///
    /// Each voice gets its own seed drawn from `output.seed`.
    pub fn scheduler(&self) -> Result<Scheduler<OscMessage>> {
        let mut seeds = StdRng::seed_from_u64(self.output.seed);
        let mut scheduler = Scheduler::new();

        for voice in &self.voices {
            let seed = seeds.gen::<u64>();
            let composer = voice.build(self.output.length, seed)?;
            scheduler.compose_boxed(composer, voice.timing().at);
        }

        info!("Composed {} voices", self.voices.len());
        Ok(scheduler)
    }

    /// Run every voice to completion and sort the result
    pub fn render(&self) -> Result<SortedEvents<OscMessage>> {
        let mut scheduler = self.scheduler()?;
        let steps = scheduler.run(None);
        let events = scheduler.into_events()?;
        info!("Rendered {} events in {} steps", events.len(), steps);
        Ok(events)
    }
}

impl VoiceConfig {
    pub fn timing(&self) -> Timing {
        match self {
            VoiceConfig::Euclid { timing, .. }
            | VoiceConfig::Grid { timing, .. }
            | VoiceConfig::Ramp { timing, .. }
            | VoiceConfig::Choice { timing, .. }
            | VoiceConfig::Drunk { timing, .. }
            | VoiceConfig::Control { timing, .. }
            | VoiceConfig::Ascend { timing, .. } => *timing,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            VoiceConfig::Euclid { address, .. }
            | VoiceConfig::Grid { address, .. }
            | VoiceConfig::Ramp { address, .. }
            | VoiceConfig::Choice { address, .. }
            | VoiceConfig::Drunk { address, .. }
            | VoiceConfig::Control { address, .. }
            | VoiceConfig::Ascend { address, .. } => address,
        }
    }

    /// Build the composer, using `default_length` when the voice sets none
    pub fn build(
        &self,
        default_length: f64,
        seed: u64,
    ) -> std::result::Result<BoxedComposer<OscMessage>, ArgumentError> {
        let length = self.timing().length.unwrap_or(default_length);

        let composer: BoxedComposer<OscMessage> = match self {
            VoiceConfig::Euclid {
                address,
                key,
                events,
                positions,
                cycle,
                rotation,
                amp,
                ..
            } => {
                let sequence = distribute(*events, *positions)?;
                let player = TriggerPlayer::with_cycle(sequence, *rotation, *cycle, length)?;
                Box::new(EuclidVoice::new(address.as_str(), *key, player).with_amp(*amp))
            }
            VoiceConfig::Grid {
                address,
                rate,
                source,
                walk,
                stop,
                ..
            } => {
                if !(rate.is_finite() && *rate > 0.0) {
                    return Err(ArgumentError::NonPositiveDuration {
                        name: "rate",
                        value: *rate,
                    });
                }
                if !(length.is_finite() && length >= 0.0) {
                    return Err(ArgumentError::NegativeDuration {
                        name: "length",
                        value: length,
                    });
                }
                let by_length = (length / rate - COUNT_EPSILON).ceil().max(0.0) as usize;
                let stop = stop.map_or(by_length, |s| s.min(by_length));

                let grid = Arc::new(source.build()?);
                let walk = GridWalk::new(grid, walk.build(seed)?, Some(stop))?;
                Box::new(GridVoice::new(address.as_str(), walk, *rate)?)
            }
            VoiceConfig::Ramp {
                address,
                start,
                end,
                low,
                high,
                grain,
                ..
            } => Box::new(RampVoice::new(
                address.as_str(),
                (*start, *end),
                (*low, *high),
                length,
                *grain,
            )?),
            VoiceConfig::Choice {
                address,
                choices,
                dur,
                distribution,
                range,
                amp,
                ..
            } => {
                let (low, high) = range.unwrap_or_else(|| distribution.natural_range());
                let picker = AxisDistribution::new(distribution.into_draw(seed), low, high)?;
                Box::new(
                    ChoiceVoice::new(address.as_str(), choices.clone(), picker, *dur, length)?
                        .with_amp(*amp),
                )
            }
            VoiceConfig::Drunk {
                address,
                choices,
                dur,
                amp,
                ..
            } => Box::new(
                DrunkVoice::new(
                    address.as_str(),
                    choices.clone(),
                    *dur,
                    length,
                    StdRng::seed_from_u64(seed),
                )?
                .with_amp(*amp),
            ),
            VoiceConfig::Control {
                address,
                rate,
                distribution,
                range,
                ..
            } => Box::new(ControlDistributionVoice::new(
                address.as_str(),
                distribution.into_draw(seed),
                range.unwrap_or_else(|| distribution.natural_range()),
                *rate,
                length,
            )?),
            VoiceConfig::Ascend {
                address,
                choices,
                dur,
                amp,
                ..
            } => Box::new(
                AscendVoice::new(
                    address.as_str(),
                    choices.clone(),
                    *dur,
                    length,
                    StdRng::seed_from_u64(seed),
                )?
                .with_amp(*amp),
            ),
        };

        Ok(composer)
    }
}

impl GridSource {
    pub fn build(&self) -> std::result::Result<Grid<Vec<f64>>, ArgumentError> {
        match self {
            GridSource::Inline { shape, data } => Grid::from_shape(shape, data.clone()),
            GridSource::Gradient { rows, cols } => Grid::gradient(*rows, *cols),
        }
    }
}

impl WalkConfig {
    /// The movement this walk describes, seeded with `seed` where it is random
    pub fn build(
        &self,
        seed: u64,
    ) -> std::result::Result<Box<dyn Movement + Send>, ArgumentError> {
        let movement: Box<dyn Movement + Send> = match self {
            WalkConfig::Raster {
                start,
                primary,
                secondary,
            } => Box::new(Raster::new(position(*start), *primary, *secondary)),
            WalkConfig::Drunk { start, params } => Box::new(Drunk::new(
                position(*start),
                *params,
                StdRng::seed_from_u64(seed),
            )),
            WalkConfig::Random => Box::new(UniformRandom::new(StdRng::seed_from_u64(seed))),
            WalkConfig::Distribution { row, col } => Box::new(DistributionWalk::new(
                AxisDistribution::from_kind(*row, seed)?,
                AxisDistribution::from_kind(*col, seed.wrapping_add(1))?,
            )),
            WalkConfig::Line { start, end, steps } => {
                Box::new(Line::new(position(*start), position(*end), *steps)?)
            }
        };
        Ok(movement)
    }
}
