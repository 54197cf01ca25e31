//! Euclidean rhythm generation
//!
//! Spreads a number of events as evenly as possible across a fixed number of
//! positions using Bjorklund's bucket folding. The results match the rhythms
//! catalogued by Toussaint ("The Euclidean Algorithm Generates Traditional
//! Musical Rhythms"):
//! - E(3,8) -> x..x..x. (Cuban tresillo)
//! - E(5,8) -> x.xx.xx. (Cuban cinquillo)
//! - E(4,12) -> x..x..x..x..

use std::fmt;

use crate::error::ArgumentError;

/// A fixed-length pattern of events and rests
///
/// Always holds at least one event. Produced by [`distribute`] or validated
/// through [`Sequence::from_steps`], never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    steps: Vec<bool>,
}

impl Sequence {
    /// Wrap a hand-written pattern, rejecting ones without any event
    pub fn from_steps(steps: Vec<bool>) -> Result<Self, ArgumentError> {
        if !steps.iter().any(|&step| step) {
            return Err(ArgumentError::ZeroEvents);
        }
        Ok(Self { steps })
    }

    /// Total number of slots
    pub fn positions(&self) -> usize {
        self.steps.len()
    }

    /// Number of event markers
    pub fn events(&self) -> usize {
        self.steps.iter().filter(|&&step| step).count()
    }

    pub fn is_event(&self, slot: usize) -> bool {
        self.steps[slot % self.steps.len()]
    }

    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    /// Pattern as ones and zeros
    pub fn to_bits(&self) -> Vec<u8> {
        self.steps.iter().map(|&step| u8::from(step)).collect()
    }

    /// Start the pattern `offset` slots later (negative offsets rotate right)
    pub fn rotated(&self, offset: i64) -> Self {
        let mut steps = self.steps.clone();
        let shift = offset.rem_euclid(steps.len() as i64) as usize;
        steps.rotate_left(shift);
        Self { steps }
    }

    /// Slot indices that hold an event
    pub fn onsets(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(slot, &step)| step.then_some(slot))
            .collect()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &step in &self.steps {
            f.write_str(if step { "x" } else { "." })?;
        }
        Ok(())
    }
}

/// Distribute `events` onsets as evenly as possible across `positions` slots
///
/// Starts with one bucket per event and one per rest, then repeatedly deals
/// rest buckets onto event buckets. Whichever side has buckets left over
/// becomes the rest set for the next round. Folding stops once at most one
/// rest bucket is left; a further round would only rotate the result.
pub fn distribute(events: usize, positions: usize) -> Result<Sequence, ArgumentError> {
    if events == 0 {
        return Err(ArgumentError::ZeroEvents);
    }
    if events > positions {
        return Err(ArgumentError::EventsExceedPositions { events, positions });
    }

    let mut sequences: Vec<Vec<bool>> = vec![vec![true]; events];
    let mut remainder: Vec<Vec<bool>> = vec![vec![false]; positions - events];

    while remainder.len() > 1 {
        let paired = sequences.len().min(remainder.len());
        let leftover_events = sequences.len() > remainder.len();

        for bucket in sequences.iter_mut().take(paired) {
            if let Some(rest) = remainder.pop() {
                bucket.extend(rest);
            }
        }

        if leftover_events {
            remainder = sequences.split_off(paired);
        }
    }

    let steps = sequences.into_iter().chain(remainder).flatten().collect();
    Ok(Sequence { steps })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(events: usize, positions: usize) -> Vec<u8> {
        distribute(events, positions).unwrap().to_bits()
    }

    #[test]
    fn test_tresillo() {
        assert_eq!(bits(3, 8), vec![1, 0, 0, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_cinquillo() {
        assert_eq!(bits(5, 8), vec![1, 0, 1, 1, 0, 1, 1, 0]);
    }

    #[test]
    fn test_even_split() {
        assert_eq!(bits(4, 8), vec![1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(bits(1, 4), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_all_events() {
        assert_eq!(bits(5, 5), vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_single_rest() {
        assert_eq!(bits(7, 8), vec![1, 1, 1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_rejects_zero_events() {
        assert_eq!(distribute(0, 8), Err(ArgumentError::ZeroEvents));
    }

    #[test]
    fn test_rejects_too_many_events() {
        assert_eq!(
            distribute(9, 8),
            Err(ArgumentError::EventsExceedPositions {
                events: 9,
                positions: 8
            })
        );
    }

    #[test]
    fn test_display_and_rotation() {
        let tresillo = distribute(3, 8).unwrap();
        assert_eq!(tresillo.to_string(), "x..x..x.");
        assert_eq!(tresillo.rotated(1).to_string(), "..x..x.x");
        assert_eq!(tresillo.rotated(-1).to_string(), ".x..x..x");
        assert_eq!(tresillo.onsets(), vec![0, 3, 6]);
    }

    #[test]
    fn test_from_steps_requires_event() {
        assert!(Sequence::from_steps(vec![false, false]).is_err());
        let seq = Sequence::from_steps(vec![false, true]).unwrap();
        assert_eq!(seq.events(), 1);
        assert_eq!(seq.positions(), 2);
    }
}
