//! Cooperative composers and an offline scheduler to run them
//!
//! A [`Composer`] is an explicit state machine: each call to
//! [`Composer::step`] may emit messages at the current virtual time and
//! reports how long to wait before it wants to run again, or `None` once it
//! is finished. Any scheduler can drive composers; [`Scheduler`] is a simple
//! offline one that interleaves them by virtual time into a
//! [`TimedEventBuffer`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

use crate::error::Result;
use crate::event::{SortedEvents, TimedEventBuffer};

/// Where composers put their output
pub trait EventSink<P> {
    fn add_event(&mut self, payload: P, time: f64);
}

impl<P> EventSink<P> for TimedEventBuffer<P> {
    fn add_event(&mut self, payload: P, time: f64) {
        TimedEventBuffer::add_event(self, payload, time);
    }
}

pub trait Composer<P> {
    /// Run one step at virtual time `now`
    ///
    /// Returns the virtual seconds until the next step, or `None` when done.
    fn step(&mut self, now: f64, out: &mut dyn EventSink<P>) -> Option<f64>;
}

pub type BoxedComposer<P> = Box<dyn Composer<P> + Send>;

struct Entry<P> {
    time: f64,
    /// Registration order, breaks ties between composers due at the same time
    id: u64,
    composer: BoxedComposer<P>,
}

impl<P> PartialEq for Entry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P> Eq for Entry<P> {}

impl<P> PartialOrd for Entry<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Entry<P> {
    // Reversed so the BinaryHeap pops the earliest entry first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Offline virtual-time scheduler
///
/// Composers due at the same time run in the order they were added.
pub struct Scheduler<P> {
    queue: BinaryHeap<Entry<P>>,
    next_id: u64,
    now: f64,
    out: TimedEventBuffer<P>,
}

impl<P> Default for Scheduler<P> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_id: 0,
            now: 0.0,
            out: TimedEventBuffer::new(),
        }
    }
}

impl<P> Scheduler<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a composer that first runs `ahead` seconds after the current time
    pub fn compose<C>(&mut self, composer: C, ahead: f64)
    where
        C: Composer<P> + Send + 'static,
    {
        self.compose_boxed(Box::new(composer), ahead);
    }

    pub fn compose_boxed(&mut self, composer: BoxedComposer<P>, ahead: f64) {
        let id = self.next_id;
        self.next_id += 1;
        debug!("Composer {} scheduled at {:.3}s", id, self.now + ahead.max(0.0));
        self.queue.push(Entry {
            time: self.now + ahead.max(0.0),
            id,
            composer,
        });
    }

    /// Current virtual time
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run composers in time order until all are done, or until the next one
    /// is due after `until`. Returns the number of steps taken.
    pub fn run(&mut self, until: Option<f64>) -> usize {
        let mut steps = 0;

        while let Some(entry) = self.queue.peek() {
            if until.is_some_and(|limit| entry.time > limit) {
                break;
            }
            let Some(mut entry) = self.queue.pop() else {
                break;
            };

            self.now = entry.time;
            steps += 1;
            match entry.composer.step(self.now, &mut self.out) {
                Some(wait) => {
                    entry.time = self.now + wait.max(0.0);
                    self.queue.push(entry);
                }
                None => debug!("Composer {} finished at {:.3}s", entry.id, self.now),
            }
        }

        steps
    }

    /// Messages produced so far, unsorted
    pub fn output(&self) -> &TimedEventBuffer<P> {
        &self.out
    }

    /// Sort and hand over everything produced
    ///
    /// Fails if a composer wrote a NaN or infinite timestamp.
    pub fn into_events(self) -> Result<SortedEvents<P>> {
        self.out.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ticker {
        label: &'static str,
        every: f64,
        left: usize,
    }

    impl Composer<String> for Ticker {
        fn step(&mut self, now: f64, out: &mut dyn EventSink<String>) -> Option<f64> {
            if self.left == 0 {
                return None;
            }
            self.left -= 1;
            out.add_event(format!("{}@{now}", self.label), now);
            Some(self.every)
        }
    }

    fn ticker(label: &'static str, every: f64, left: usize) -> Ticker {
        Ticker { label, every, left }
    }

    #[test]
    fn test_interleaves_by_time() {
        let mut scheduler = Scheduler::new();
        scheduler.compose(ticker("a", 1.0, 3), 0.0);
        scheduler.compose(ticker("b", 1.5, 2), 0.0);
        scheduler.run(None);

        let labels: Vec<String> = scheduler
            .into_events()
            .unwrap()
            .into_iter()
            .map(|m| m.payload)
            .collect();
        assert_eq!(labels, vec!["a@0", "b@0", "a@1", "b@1.5", "a@2"]);
    }

    #[test]
    fn test_run_until_limit() {
        let mut scheduler = Scheduler::new();
        scheduler.compose(ticker("a", 1.0, 10), 0.5);
        scheduler.run(Some(3.0));
        assert_eq!(scheduler.output().len(), 3);
        assert_eq!(scheduler.now(), 2.5);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_finished_composers_leave_queue() {
        let mut scheduler = Scheduler::new();
        scheduler.compose(ticker("a", 0.25, 2), 0.0);
        // 2 emitting steps plus the step that reports completion
        assert_eq!(scheduler.run(None), 3);
        assert_eq!(scheduler.pending(), 0);
    }
}
