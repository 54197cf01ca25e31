//! Real-time playback of timestamped messages
//!
//! The [`RealtimeDispatcher`] replays messages against the wall clock: every
//! message sharing a timestamp goes out back to back, then the dispatcher
//! sleeps until the next distinct timestamp is due. Deadlines are measured
//! from the moment playback starts, so slow sends do not push later messages
//! further and further behind.
//!
//! # Handoff
//! - [`RealtimeDispatcher::play`] takes fully materialized [`SortedEvents`].
//! - [`RealtimeDispatcher::play_stream`] consumes a channel fed by a single
//!   producer and rejects any message earlier than the one before it.
//!
//! # Cancellation
//! A [`CancelToken`] is checked before every group of sends and raced
//! against every wait. A cancelled run ends with `cancelled: true` in its
//! [`DispatchReport`].
//!
//! # Send failures
//! [`SendPolicy`] decides what a failed send does: abort the run, skip the
//! message, or retry it a few times before skipping. Failures and retries are
//! counted in the report and logged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::event::{SortedEvents, TimedMessage};
use crate::transport::Transport;

/// Used when a deadline does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared stop signal for a dispatch run
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// What to do when the transport rejects a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendPolicy {
    /// Stop the run and return the transport error
    Abort,
    /// Log, count and move on
    #[default]
    Skip,
    /// Re-send immediately up to `attempts` more times, then skip
    Retry { attempts: u32 },
}

/// Outcome of a dispatch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub retried: usize,
    pub cancelled: bool,
}

pub struct RealtimeDispatcher<T> {
    transport: T,
    policy: SendPolicy,
    cancel: CancelToken,
}

impl<T> RealtimeDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: SendPolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: SendPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn policy(&self) -> SendPolicy {
        self.policy
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Replay `events` in real time, starting immediately with the first one
    pub async fn play<P>(&mut self, events: SortedEvents<P>) -> Result<DispatchReport>
    where
        T: Transport<P>,
    {
        let mut report = DispatchReport::default();
        let cancel = self.cancel.clone();
        let start = Instant::now();
        let mut clock: Option<(f64, f64)> = None;

        info!(
            "Dispatching {} events over {:.3}s",
            events.len(),
            events.duration() - events.as_slice().first().map_or(0.0, |m| m.time)
        );

        for (index, message) in events.into_iter().enumerate() {
            let (origin, current) = *clock.get_or_insert((message.time, message.time));
            if message.time > current {
                debug!("Waiting {:.3}s", message.time - current);
                if !wait_until(&cancel, deadline(start, message.time - origin)).await {
                    return Ok(cancelled(report));
                }
                clock = Some((origin, message.time));
            }
            if cancel.is_cancelled() {
                return Ok(cancelled(report));
            }
            self.deliver(index, &message.payload, &mut report)?;
        }

        info!(
            "Dispatch finished: {} sent, {} failed",
            report.sent, report.failed
        );
        Ok(report)
    }

    /// Replay messages as they arrive on `rx`, timed relative to the first
    ///
    /// Ends when the sender side closes. A message earlier than its
    /// predecessor fails the run with [`Error::OutOfOrder`].
    pub async fn play_stream<P>(
        &mut self,
        mut rx: mpsc::Receiver<TimedMessage<P>>,
    ) -> Result<DispatchReport>
    where
        T: Transport<P>,
    {
        let mut report = DispatchReport::default();
        let cancel = self.cancel.clone();
        let mut clock: Option<(Instant, f64, f64)> = None;
        let mut index = 0;

        info!("Dispatching from stream");

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(cancelled(report)),
                next = rx.recv() => next,
            };
            let Some(message) = next else {
                break;
            };
            if !message.time.is_finite() {
                error!("Event {} has no finite timestamp", index);
                return Err(Error::NonFiniteTime {
                    index,
                    time: message.time,
                });
            }

            match clock {
                None => clock = Some((Instant::now(), message.time, message.time)),
                Some((start, origin, current)) => {
                    if !(message.time >= current) {
                        error!(
                            "Event {} at {}s arrived after an event at {}s",
                            index, message.time, current
                        );
                        return Err(Error::OutOfOrder {
                            index,
                            previous: current,
                            found: message.time,
                        });
                    }
                    if message.time > current {
                        debug!("Waiting {:.3}s", message.time - current);
                        if !wait_until(&cancel, deadline(start, message.time - origin)).await {
                            return Ok(cancelled(report));
                        }
                        clock = Some((start, origin, message.time));
                    }
                }
            }

            if cancel.is_cancelled() {
                return Ok(cancelled(report));
            }
            self.deliver(index, &message.payload, &mut report)?;
            index += 1;
        }

        info!(
            "Stream dispatch finished: {} sent, {} failed",
            report.sent, report.failed
        );
        Ok(report)
    }

    fn deliver<P>(&mut self, index: usize, payload: &P, report: &mut DispatchReport) -> Result<()>
    where
        T: Transport<P>,
    {
        let retries = match self.policy {
            SendPolicy::Retry { attempts } => attempts,
            _ => 0,
        };
        let mut attempt = 0;

        loop {
            match self.transport.send(payload) {
                Ok(()) => {
                    report.sent += 1;
                    return Ok(());
                }
                Err(e) if attempt < retries => {
                    attempt += 1;
                    report.retried += 1;
                    debug!("Retrying event {} ({}/{}): {}", index, attempt, retries, e);
                }
                Err(e) => {
                    if self.policy == SendPolicy::Abort {
                        error!("Aborting dispatch at event {}: {}", index, e);
                        return Err(Error::Transport { index, source: e });
                    }
                    warn!("Dropped event {}: {}", index, e);
                    report.failed += 1;
                    return Ok(());
                }
            }
        }
    }
}

impl<T: Send + 'static> RealtimeDispatcher<T> {
    /// Run [`play`](Self::play) on its own task
    pub fn spawn<P>(mut self, events: SortedEvents<P>) -> DispatchHandle
    where
        T: Transport<P>,
        P: Send + 'static,
    {
        let cancel = self.cancel_token();
        let task = tokio::spawn(async move { self.play(events).await });
        DispatchHandle { cancel, task }
    }

    /// Run [`play_stream`](Self::play_stream) on its own task
    pub fn spawn_stream<P>(mut self, rx: mpsc::Receiver<TimedMessage<P>>) -> DispatchHandle
    where
        T: Transport<P>,
        P: Send + 'static,
    {
        let cancel = self.cancel_token();
        let task = tokio::spawn(async move { self.play_stream(rx).await });
        DispatchHandle { cancel, task }
    }
}

/// A dispatch running in the background
pub struct DispatchHandle {
    cancel: CancelToken,
    task: JoinHandle<Result<DispatchReport>>,
}

impl DispatchHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end
    pub async fn join(self) -> Result<DispatchReport> {
        self.task.await?
    }
}

fn cancelled(mut report: DispatchReport) -> DispatchReport {
    info!("Dispatch cancelled after {} sends", report.sent);
    report.cancelled = true;
    report
}

fn deadline(start: Instant, offset: f64) -> Instant {
    Duration::try_from_secs_f64(offset.max(0.0))
        .ok()
        .and_then(|d| start.checked_add(d))
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Sleep until `deadline`; false if cancelled first
async fn wait_until(cancel: &CancelToken, deadline: Instant) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep_until(deadline) => true,
    }
}
