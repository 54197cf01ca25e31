//! # Pulsegrid - Algorithmic Event Generation and Timed OSC Dispatch
//!
//! Pulsegrid generates musical control events from simple algorithms and
//! plays them out in real time. Generators run in virtual time and write
//! timestamped messages into a buffer; the buffer is sorted once and handed
//! to a dispatcher that sleeps between timestamps and sends each message over
//! a pluggable transport (OSC over UDP by default).
//!
//! ## Core Features
//!
//! - **Euclidean Rhythms**: Bjorklund distribution of `k` onsets over `n` slots
//! - **Trigger Playback**: cyclic, rotatable stepping through a rhythm for a fixed length
//! - **Grid Samplers**: raster, drunk, uniform, distribution-driven and linear walks over 2-D grids
//! - **Boundary Policies**: wrap, reflect or clamp coordinates that leave the grid
//! - **Seeded Randomness**: every stochastic generator is reproducible from its seed
//! - **Composers**: cooperative generators merged by virtual time
//! - **Real-Time Dispatch**: drift-free playback with cancellation and send-failure policies
//!
//! ## Quick Start
//!
//! ### Euclidean Rhythm
//!
//! ```rust
//! use pulsegrid::euclid::distribute;
//!
//! // 3 hits distributed over 8 steps (tresillo pattern)
//! let rhythm = distribute(3, 8).unwrap();
//! assert_eq!(rhythm.to_string(), "x..x..x.");
//! assert_eq!(rhythm.onsets(), vec![0, 3, 6]);
//! ```
//!
//! ### Walking a Grid
//!
//! ```rust
//! use pulsegrid::grid::{Grid, Position};
//! use pulsegrid::sampler;
//!
//! let grid = Grid::gradient(3, 3).unwrap();
//!
//! // Row-major scan, moving down a row at the right edge
//! let walk = sampler::raster(&grid, Some(4), Position::new(0, 0), (0, 1), (1, 0)).unwrap();
//! let visited: Vec<Position> = walk.map(|sample| sample.position).collect();
//! assert_eq!(visited[3], Position::new(1, 0));
//! ```
//!
//! ### Composing and Dispatching
//!
//! ```rust,no_run
//! use pulsegrid::composer::Scheduler;
//! use pulsegrid::dispatcher::RealtimeDispatcher;
//! use pulsegrid::euclid::distribute;
//! use pulsegrid::transport::OscTransport;
//! use pulsegrid::trigger_player::TriggerPlayer;
//! use pulsegrid::voices::EuclidVoice;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let player = TriggerPlayer::with_cycle(distribute(3, 8)?, 0, 1.0, 4.0)?;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.compose(EuclidVoice::new("/kick", 36, player), 0.0);
//! scheduler.run(None);
//!
//! let transport = OscTransport::connect("127.0.0.1:57120")?;
//! let report = RealtimeDispatcher::new(transport)
//!     .play(scheduler.into_events()?)
//!     .await?;
//! println!("sent {} messages", report.sent);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Generators** (`euclid`, `trigger_player`, `sampler`) are lazy and own their state
//! 2. **Composers** (`voices`) turn generator output into payloads at virtual times
//! 3. **Buffers** (`event`) collect payloads and sort them into `SortedEvents`
//! 4. **Dispatch** (`dispatcher`) replays sorted events against the wall clock
//! 5. **Transports** (`transport`) deliver each payload
//!
//! The `config` module describes a whole composition in TOML; the `pulsegrid`
//! binary renders or plays such files.

pub mod boundary;
pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod euclid;
pub mod event;
pub mod grid;
pub mod message;
pub mod random;
pub mod sampler;
pub mod transport;
pub mod trigger_player;
pub mod voices;

pub use error::{ArgumentError, Error, Result, TransportError};
