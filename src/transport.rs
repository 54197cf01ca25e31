//! Message transports used by the dispatcher
//!
//! - [`OscTransport`] sends OSC packets over UDP
//! - [`MemoryTransport`] records what it is given, with arrival times

use rosc::{OscMessage, OscPacket};
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use tracing::info;

use crate::error::TransportError;

/// A sink for outgoing payloads
pub trait Transport<P> {
    fn send(&mut self, payload: &P) -> Result<(), TransportError>;
}

impl<P, T: Transport<P> + ?Sized> Transport<P> for Box<T> {
    fn send(&mut self, payload: &P) -> Result<(), TransportError> {
        (**self).send(payload)
    }
}

impl<P, T: Transport<P> + ?Sized> Transport<P> for &mut T {
    fn send(&mut self, payload: &P) -> Result<(), TransportError> {
        (**self).send(payload)
    }
}

/// OSC over UDP, one packet per message
pub struct OscTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl OscTransport {
    /// Bind an ephemeral local port and send to `target` ("host:port")
    pub fn connect(target: &str) -> Result<Self, TransportError> {
        let target: SocketAddr = target
            .parse()
            .map_err(|_| TransportError::Address(target.to_string()))?;
        let bind_addr = if target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(bind_addr)?;
        info!("OSC transport sending to {}", target);
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport<OscMessage> for OscTransport {
    fn send(&mut self, payload: &OscMessage) -> Result<(), TransportError> {
        let buf = rosc::encoder::encode(&OscPacket::Message(payload.clone()))?;
        self.socket.send_to(&buf, self.target)?;
        Ok(())
    }
}

/// One payload as seen by a [`MemoryTransport`]
#[derive(Debug, Clone)]
pub struct Delivery<P> {
    pub at: Instant,
    pub payload: P,
}

#[derive(Debug)]
struct MemoryState<P> {
    deliveries: Vec<Delivery<P>>,
    attempts: usize,
    fail_first: usize,
}

/// In-memory transport that records every delivery
///
/// Clones share the same record. `failing_first(n)` makes the first `n` send
/// attempts fail, for exercising send policies.
#[derive(Debug)]
pub struct MemoryTransport<P> {
    state: Arc<Mutex<MemoryState<P>>>,
}

impl<P> Clone for MemoryTransport<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<P> Default for MemoryTransport<P> {
    fn default() -> Self {
        Self::failing_first(0)
    }
}

impl<P> MemoryTransport<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                deliveries: Vec::new(),
                attempts: 0,
                fail_first: failures,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of send calls, failed ones included
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }
}

impl<P: Clone> MemoryTransport<P> {
    pub fn deliveries(&self) -> Vec<Delivery<P>> {
        self.state().deliveries.clone()
    }

    pub fn payloads(&self) -> Vec<P> {
        self.state()
            .deliveries
            .iter()
            .map(|d| d.payload.clone())
            .collect()
    }
}

impl<P: Clone> Transport<P> for MemoryTransport<P> {
    fn send(&mut self, payload: &P) -> Result<(), TransportError> {
        let mut state = self.state();
        state.attempts += 1;
        if state.attempts <= state.fail_first {
            return Err(TransportError::Closed);
        }
        state.deliveries.push(Delivery {
            at: Instant::now(),
            payload: payload.clone(),
        });
        Ok(())
    }
}
