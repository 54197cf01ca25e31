//! Ready-made composers that turn the generators into OSC messages
//!
//! Each voice is a [`Composer`] over [`OscMessage`] payloads:
//!
//! | voice | emits | driven by |
//! |-------|-------|-----------|
//! | [`EuclidVoice`] | note on every fired slot | [`TriggerPlayer`] |
//! | [`GridVoice`] | one cell message per sample | [`GridWalk`] |
//! | [`RampVoice`] | linear control ramp in 0..=127 | fixed grain |
//! | [`ChoiceVoice`] | note picked by a distribution | [`AxisDistribution`] |
//! | [`DrunkVoice`] | note from a 1-D reflected walk | seeded RNG |
//! | [`ControlDistributionVoice`] | control value drawn from a distribution | [`Draw`] |
//! | [`AscendVoice`] | single notes and strums drifting upwards | seeded RNG |

use rand::seq::SliceRandom;
use rand::Rng;
use rosc::OscMessage;
use std::sync::Arc;

use crate::boundary::{fit, BoundaryMode};
use crate::composer::{Composer, EventSink};
use crate::error::ArgumentError;
use crate::grid::Grid;
use crate::message;
use crate::random::{self, odds, rescale, Draw};
use crate::sampler::{AxisDistribution, GridWalk, Movement};
use crate::trigger_player::TriggerPlayer;

pub const DEFAULT_AMP: f32 = 0.5;

/// Widest step a [`DrunkVoice`] takes in either direction
const DRUNK_WIDTH: i64 = 2;

/// Onset offsets of the [`AscendVoice`] strums, in fractions of `dur`
///
/// Repeated zeros stack notes into chords.
const STRUMS: [&[f64]; 6] = [
    &[0.0, 0.5],
    &[0.0, 0.25, 0.5, 0.75],
    &[0.0, 0.75],
    &[0.0, 0.0],
    &[0.0, 0.0, 0.5, 0.5],
    &[0.0, 0.0, 0.0],
];

/// Chance that an [`AscendVoice`] step is a single note rather than a strum
const SINGLE_NOTE_ODDS: f64 = 1.0 / 7.0;

fn positive(name: &'static str, value: f64) -> Result<f64, ArgumentError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ArgumentError::NonPositiveDuration { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, ArgumentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ArgumentError::NegativeDuration { name, value })
    }
}

/// Plays `key` on every slot of a Euclidean rhythm that fires
pub struct EuclidVoice {
    address: String,
    key: i32,
    amp: f32,
    player: TriggerPlayer,
}

impl EuclidVoice {
    pub fn new(address: impl Into<String>, key: i32, player: TriggerPlayer) -> Self {
        Self {
            address: address.into(),
            key,
            amp: DEFAULT_AMP,
            player,
        }
    }

    pub fn with_amp(mut self, amp: f32) -> Self {
        self.amp = amp;
        self
    }
}

impl Composer<OscMessage> for EuclidVoice {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        let step = self.player.next()?;
        if step.fires {
            out.add_event(
                message::note(&self.address, self.key, step.wait, self.amp),
                now,
            );
        }
        Some(step.wait)
    }
}

/// Sends every sample of a grid walk, one every `rate` seconds
pub struct GridVoice<M> {
    address: String,
    rate: f64,
    walk: GridWalk<Arc<Grid<Vec<f64>>>, M>,
}

impl<M: Movement> GridVoice<M> {
    pub fn new(
        address: impl Into<String>,
        walk: GridWalk<Arc<Grid<Vec<f64>>>, M>,
        rate: f64,
    ) -> Result<Self, ArgumentError> {
        Ok(Self {
            address: address.into(),
            rate: positive("rate", rate)?,
            walk,
        })
    }
}

impl<M: Movement> Composer<OscMessage> for GridVoice<M> {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        let sample = self.walk.next()?;
        out.add_event(
            message::cell(&self.address, sample.position, &sample.value),
            now,
        );
        Some(self.rate)
    }
}

/// Linear control ramp from `start` to `end` over `length` seconds
///
/// Both ends are read on the `[low, high]` scale and mapped onto 0..=127.
/// One value is sent every `grain` seconds, the last one landing on `end`.
pub struct RampVoice {
    address: String,
    from: f64,
    increment: f64,
    grain: f64,
    count: usize,
    sent: usize,
}

impl RampVoice {
    pub fn new(
        address: impl Into<String>,
        (start, end): (f64, f64),
        (low, high): (f64, f64),
        length: f64,
        grain: f64,
    ) -> Result<Self, ArgumentError> {
        if !(low < high) {
            return Err(ArgumentError::EmptyRange { low, high });
        }
        let grain = positive("grain", grain)?;
        let length = non_negative("length", length)?;

        let from = rescale(start, low, high, 0.0, 127.0);
        let to = rescale(end, low, high, 0.0, 127.0);
        let intervals = (length / grain).round();
        if intervals >= usize::MAX as f64 {
            return Err(ArgumentError::TooManySteps { length, grain });
        }
        let increment = if intervals > 0.0 {
            (to - from) / intervals
        } else {
            0.0
        };

        Ok(Self {
            address: address.into(),
            from,
            increment,
            grain,
            count: intervals as usize + 1,
            sent: 0,
        })
    }

    /// Values still to be sent
    pub fn remaining(&self) -> usize {
        self.count - self.sent
    }
}

impl Composer<OscMessage> for RampVoice {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        if self.sent >= self.count {
            return None;
        }
        let value = self.from + self.increment * self.sent as f64;
        self.sent += 1;
        let value = value.round_ties_even().clamp(0.0, 127.0) as i32;
        out.add_event(message::control(&self.address, value), now);
        Some(self.grain)
    }
}

/// Picks a key from `choices` every `dur` seconds for `length` seconds
///
/// The distribution's range is mapped onto the list indices.
pub struct ChoiceVoice {
    address: String,
    choices: Vec<i32>,
    picker: AxisDistribution,
    dur: f64,
    length: f64,
    amp: f32,
    started: Option<f64>,
}

impl ChoiceVoice {
    pub fn new(
        address: impl Into<String>,
        choices: Vec<i32>,
        picker: AxisDistribution,
        dur: f64,
        length: f64,
    ) -> Result<Self, ArgumentError> {
        if choices.is_empty() {
            return Err(ArgumentError::EmptyChoices);
        }
        Ok(Self {
            address: address.into(),
            choices,
            picker,
            dur: positive("dur", dur)?,
            length: non_negative("length", length)?,
            amp: DEFAULT_AMP,
            started: None,
        })
    }

    pub fn with_amp(mut self, amp: f32) -> Self {
        self.amp = amp;
        self
    }
}

impl Composer<OscMessage> for ChoiceVoice {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        let started = *self.started.get_or_insert(now);
        if now - started >= self.length {
            return None;
        }
        let key = self.choices[self.picker.index(self.choices.len())];
        out.add_event(message::note(&self.address, key, self.dur, self.amp), now);
        Some(self.dur)
    }
}

/// Wanders over `choices`, moving at most two places per note
///
/// The walk starts in the middle of the list and bounces off both ends.
/// Each note lasts `dur`, `dur / 2` or `dur / 4`, picked at random.
pub struct DrunkVoice<R> {
    address: String,
    choices: Vec<i32>,
    durations: [f64; 3],
    length: f64,
    amp: f32,
    index: i64,
    rng: R,
    started: Option<f64>,
}

impl<R: Rng> DrunkVoice<R> {
    pub fn new(
        address: impl Into<String>,
        choices: Vec<i32>,
        dur: f64,
        length: f64,
        rng: R,
    ) -> Result<Self, ArgumentError> {
        if choices.is_empty() {
            return Err(ArgumentError::EmptyChoices);
        }
        let dur = positive("dur", dur)?;
        Ok(Self {
            address: address.into(),
            index: (choices.len() / 2) as i64,
            choices,
            durations: [dur, dur / 2.0, dur / 4.0],
            length: non_negative("length", length)?,
            amp: DEFAULT_AMP,
            rng,
            started: None,
        })
    }

    pub fn with_amp(mut self, amp: f32) -> Self {
        self.amp = amp;
        self
    }
}

impl<R: Rng> Composer<OscMessage> for DrunkVoice<R> {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        let started = *self.started.get_or_insert(now);
        if now - started >= self.length {
            return None;
        }

        let dur = *self.durations.choose(&mut self.rng)?;
        let last = self.choices.len() as i64 - 1;
        let stride = self.rng.gen_range(-DRUNK_WIDTH..=DRUNK_WIDTH);
        self.index = fit(self.index + stride, 0, last, BoundaryMode::Reflect);

        let key = self.choices[self.index as usize];
        out.add_event(message::note(&self.address, key, dur, self.amp), now);
        Some(dur)
    }
}

/// Sends a control value drawn from a distribution every `rate` seconds
///
/// Draws are clamped to `[low, high]`, mapped onto 0..=127 and truncated.
pub struct ControlDistributionVoice {
    address: String,
    draw: Draw,
    low: f64,
    high: f64,
    rate: f64,
    length: f64,
    started: Option<f64>,
}

impl ControlDistributionVoice {
    pub fn new(
        address: impl Into<String>,
        draw: Draw,
        (low, high): (f64, f64),
        rate: f64,
        length: f64,
    ) -> Result<Self, ArgumentError> {
        if !(low < high) {
            return Err(ArgumentError::EmptyRange { low, high });
        }
        Ok(Self {
            address: address.into(),
            draw,
            low,
            high,
            rate: positive("rate", rate)?,
            length: non_negative("length", length)?,
            started: None,
        })
    }
}

impl Composer<OscMessage> for ControlDistributionVoice {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        let started = *self.started.get_or_insert(now);
        if now - started >= self.length {
            return None;
        }
        let raw = (self.draw)().clamp(self.low, self.high);
        let value = rescale(raw, self.low, self.high, 0.0, 127.0) as i32;
        out.add_event(message::control(&self.address, value), now);
        Some(self.rate)
    }
}

/// Random notes that favour the bottom of `choices` early and the top late
///
/// The first third of `length` draws indices skewed low, the second third
/// around the middle and the rest skewed high. Every `dur` seconds the voice
/// plays either one note or a strum of several notes at offsets within `dur`.
pub struct AscendVoice<R> {
    address: String,
    choices: Vec<i32>,
    dur: f64,
    length: f64,
    amp: f32,
    rng: R,
    started: Option<f64>,
}

impl<R: Rng> AscendVoice<R> {
    pub fn new(
        address: impl Into<String>,
        choices: Vec<i32>,
        dur: f64,
        length: f64,
        rng: R,
    ) -> Result<Self, ArgumentError> {
        if choices.is_empty() {
            return Err(ArgumentError::EmptyChoices);
        }
        Ok(Self {
            address: address.into(),
            choices,
            dur: positive("dur", dur)?,
            length: non_negative("length", length)?,
            amp: DEFAULT_AMP,
            rng,
            started: None,
        })
    }

    pub fn with_amp(mut self, amp: f32) -> Self {
        self.amp = amp;
        self
    }

    fn pick(&mut self, elapsed: f64) -> i32 {
        let draw = if elapsed < self.length * 0.33 {
            random::low(&mut self.rng)
        } else if elapsed < self.length * 0.66 {
            random::mid(&mut self.rng)
        } else {
            random::high(&mut self.rng)
        };
        let last = self.choices.len() - 1;
        let index = (draw * self.choices.len() as f64) as usize;
        self.choices[index.min(last)]
    }
}

impl<R: Rng> Composer<OscMessage> for AscendVoice<R> {
    fn step(&mut self, now: f64, out: &mut dyn EventSink<OscMessage>) -> Option<f64> {
        let started = *self.started.get_or_insert(now);
        let elapsed = now - started;
        if elapsed >= self.length {
            return None;
        }

        let offsets: &[f64] = if odds(&mut self.rng, SINGLE_NOTE_ODDS) {
            &[0.0]
        } else {
            *STRUMS.choose(&mut self.rng)?
        };
        for &offset in offsets {
            let key = self.pick(elapsed);
            out.add_event(
                message::note(&self.address, key, self.dur, self.amp),
                now + offset * self.dur,
            );
        }
        Some(self.dur)
    }
}
