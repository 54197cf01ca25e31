//! Cyclic playback of a [`Sequence`]
//!
//! A [`TriggerPlayer`] walks a sequence slot by slot, wrapping back to slot 0
//! after the last one, and reports for every slot whether it fires and how
//! much virtual time passes before the next slot.

use crate::error::ArgumentError;
use crate::euclid::Sequence;

/// Absorbs float noise so that e.g. 1.0 / 0.125 does not round up to 9 slots
const SLOT_EPSILON: f64 = 1e-9;

/// Decision for one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerStep {
    /// Slot index in `[0, positions)`
    pub slot: usize,
    pub fires: bool,
    /// Virtual seconds until the next slot
    pub wait: f64,
}

#[derive(Debug, Clone)]
pub struct TriggerPlayer {
    sequence: Sequence,
    cursor: usize,
    slot_duration: f64,
    remaining: usize,
}

impl TriggerPlayer {
    /// Play `sequence` for `length` seconds, one slot every `slot_duration`
    ///
    /// Playback starts at slot `rotation` (taken modulo the sequence length,
    /// negative values count back from the end) and covers
    /// `ceil(length / slot_duration)` slots.
    pub fn new(
        sequence: Sequence,
        rotation: i64,
        slot_duration: f64,
        length: f64,
    ) -> Result<Self, ArgumentError> {
        if !(slot_duration.is_finite() && slot_duration > 0.0) {
            return Err(ArgumentError::NonPositiveDuration {
                name: "slot duration",
                value: slot_duration,
            });
        }
        if !(length.is_finite() && length >= 0.0) {
            return Err(ArgumentError::NegativeDuration {
                name: "length",
                value: length,
            });
        }

        let cursor = rotation.rem_euclid(sequence.positions() as i64) as usize;
        let remaining = (length / slot_duration - SLOT_EPSILON).ceil().max(0.0) as usize;

        Ok(Self {
            sequence,
            cursor,
            slot_duration,
            remaining,
        })
    }

    /// Fit one pass of the sequence into `cycle_time` seconds
    pub fn with_cycle(
        sequence: Sequence,
        rotation: i64,
        cycle_time: f64,
        length: f64,
    ) -> Result<Self, ArgumentError> {
        let slot_duration = cycle_time / sequence.positions() as f64;
        Self::new(sequence, rotation, slot_duration, length)
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Slot the next step will play
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn slot_duration(&self) -> f64 {
        self.slot_duration
    }

    /// Steps left before playback ends
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for TriggerPlayer {
    type Item = TriggerStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.sequence.positions();

        Some(TriggerStep {
            slot,
            fires: self.sequence.is_event(slot),
            wait: self.slot_duration,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TriggerPlayer {}
