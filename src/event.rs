//! Timestamped messages and the buffers that carry them to the dispatcher
//!
//! Generators push [`TimedMessage`]s into a [`TimedEventBuffer`] in whatever
//! order they produce them. Before playback the buffer is turned into
//! [`SortedEvents`], the only form the dispatcher accepts, either by
//! [`TimedEventBuffer::finalize`] (stable sort) or by
//! [`SortedEvents::try_from_vec`] (validate, reject out-of-order input).
//! Both refuse timestamps that are NaN or infinite.

use crate::error::{Error, Result};

/// A payload due at `time` seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimedMessage<P> {
    pub time: f64,
    pub payload: P,
}

impl<P> TimedMessage<P> {
    pub fn new(time: f64, payload: P) -> Self {
        Self { time, payload }
    }
}

/// Append-only collection of messages, possibly unsorted
#[derive(Debug, Clone)]
pub struct TimedEventBuffer<P> {
    messages: Vec<TimedMessage<P>>,
}

impl<P> Default for TimedEventBuffer<P> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

impl<P> TimedEventBuffer<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: TimedMessage<P>) {
        self.messages.push(message);
    }

    pub fn add_event(&mut self, payload: P, time: f64) {
        self.push(TimedMessage::new(time, payload));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedMessage<P>> {
        self.messages.iter()
    }

    /// Sort by timestamp, keeping insertion order between equal timestamps
    ///
    /// Fails with [`Error::NonFiniteTime`] naming the first message, in
    /// insertion order, whose timestamp cannot be scheduled.
    pub fn finalize(mut self) -> Result<SortedEvents<P>> {
        check_finite(&self.messages)?;
        self.messages.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(SortedEvents {
            messages: self.messages,
        })
    }
}

impl<P> Extend<TimedMessage<P>> for TimedEventBuffer<P> {
    fn extend<I: IntoIterator<Item = TimedMessage<P>>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

/// Messages in non-decreasing time order
#[derive(Debug, Clone)]
pub struct SortedEvents<P> {
    messages: Vec<TimedMessage<P>>,
}

impl<P> Default for SortedEvents<P> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

impl<P> SortedEvents<P> {
    /// Accept `messages` only if they are already in time order
    pub fn try_from_vec(messages: Vec<TimedMessage<P>>) -> Result<Self> {
        check_finite(&messages)?;
        if let Some(index) = find_out_of_order(&messages) {
            return Err(Error::OutOfOrder {
                index,
                previous: messages[index - 1].time,
                found: messages[index].time,
            });
        }
        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedMessage<P>> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[TimedMessage<P>] {
        &self.messages
    }

    /// Timestamp of the last message
    pub fn duration(&self) -> f64 {
        self.messages.last().map_or(0.0, |m| m.time)
    }

    pub fn into_vec(self) -> Vec<TimedMessage<P>> {
        self.messages
    }
}

impl<P> IntoIterator for SortedEvents<P> {
    type Item = TimedMessage<P>;
    type IntoIter = std::vec::IntoIter<TimedMessage<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

fn check_finite<P>(messages: &[TimedMessage<P>]) -> Result<()> {
    match messages.iter().position(|m| !m.time.is_finite()) {
        Some(index) => Err(Error::NonFiniteTime {
            index,
            time: messages[index].time,
        }),
        None => Ok(()),
    }
}

/// Index of the first message earlier than its predecessor
fn find_out_of_order<P>(messages: &[TimedMessage<P>]) -> Option<usize> {
    messages
        .windows(2)
        .position(|pair| pair[1].time < pair[0].time)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_is_stable() {
        let mut buffer = TimedEventBuffer::new();
        buffer.add_event("c", 1.0);
        buffer.add_event("a", 0.0);
        buffer.add_event("d", 1.0);
        buffer.add_event("b", 0.0);

        let sorted: Vec<&str> = buffer
            .finalize()
            .unwrap()
            .into_iter()
            .map(|m| m.payload)
            .collect();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_try_from_vec_rejects_unsorted() {
        let messages = vec![
            TimedMessage::new(0.0, 'a'),
            TimedMessage::new(2.0, 'b'),
            TimedMessage::new(1.0, 'c'),
        ];
        match SortedEvents::try_from_vec(messages) {
            Err(Error::OutOfOrder {
                index,
                previous,
                found,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(previous, 2.0);
                assert_eq!(found, 1.0);
            }
            other => panic!("expected OutOfOrder, got {other:?}"),
        }
    }

    #[test]
    fn test_try_from_vec_accepts_ties() {
        let messages = vec![
            TimedMessage::new(0.0, 1),
            TimedMessage::new(0.0, 2),
            TimedMessage::new(0.5, 3),
        ];
        let sorted = SortedEvents::try_from_vec(messages).unwrap();
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted.duration(), 0.5);
    }

    #[test]
    fn test_finalize_rejects_nan_anywhere() {
        let mut buffer = TimedEventBuffer::new();
        buffer.add_event('a', 0.0);
        buffer.add_event('b', 5.0);
        buffer.add_event('c', -f64::NAN);

        match buffer.finalize() {
            Err(Error::NonFiniteTime { index, time }) => {
                assert_eq!(index, 2);
                assert!(time.is_nan());
            }
            other => panic!("expected NonFiniteTime, got {other:?}"),
        }
    }

    #[test]
    fn test_try_from_vec_rejects_leading_nan() {
        let messages = vec![
            TimedMessage::new(f64::NAN, 'a'),
            TimedMessage::new(0.0, 'b'),
            TimedMessage::new(5.0, 'c'),
        ];
        assert!(matches!(
            SortedEvents::try_from_vec(messages),
            Err(Error::NonFiniteTime { index: 0, .. })
        ));
    }

    #[test]
    fn test_try_from_vec_rejects_infinity() {
        let messages = vec![
            TimedMessage::new(0.0, 'a'),
            TimedMessage::new(f64::INFINITY, 'b'),
        ];
        assert!(matches!(
            SortedEvents::try_from_vec(messages),
            Err(Error::NonFiniteTime { index: 1, .. })
        ));
    }
}
