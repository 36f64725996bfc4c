//! # Weather Node
//!
//! Core of a battery/solar-powered remote weather station node: a
//! single-threaded cooperative scheduling loop that samples environmental
//! sensors, frames readings into compact schema-tagged binary packets, and
//! transmits them over a 9600-baud radio link.
//!
//! ## Features
//!
//! - **Cooperative scheduling**: one readiness sweep per tick, fixed priority
//!   order, at most one activity body per tick, no preemption
//! - **Binary packet framing**: fixed-layout little-endian frames, zero-padded
//!   to a declared payload size, dispatched by schema tag on the receiver
//! - **Operator command sessions**: line-delimited single-character verbs that
//!   own the loop until the exit verb, suspending all telemetry
//! - **Early-uptime heartbeats**: low-cost liveness frames on their own timer
//! - **Substitutable collaborators**: sensors, transport, clock, and address
//!   store are traits, so tests inject a manual clock and a mock link
//!
//! ## Quick Start
//!
//! ```rust
//! use weathernode::clock::ManualClock;
//! use weathernode::node::{TickOutcome, WeatherNode};
//! use weathernode::sensors::SimulatedSensors;
//! use weathernode::transport::MockTransport;
//!
//! let clock = ManualClock::new();
//! let mut node = WeatherNode::new(1, SimulatedSensors::new(), MockTransport::new(), &clock);
//!
//! // Nothing is ready at boot; the first sample fires after its interval.
//! assert_eq!(node.tick().unwrap(), TickOutcome::Idle);
//! clock.advance_ms(3000);
//! assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
//! ```
//!
//! ## Architecture
//!
//! - [`node`] - scheduler loop, node state, readiness predicates
//! - [`packet`] - wire records, encode/decode, frame dispatch
//! - [`shell`] - operator command-session state machine
//! - [`sensors`] - sensor bank trait and implementations
//! - [`selftest`] - advisory power-on self-test
//! - [`transport`] / [`clock`] / [`store`] - collaborator seams

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod clock;
pub mod node;
pub mod packet;
pub mod selftest;
pub mod sensors;
pub mod shell;
pub mod store;
pub mod transport;

// Re-export the main public types for convenience
pub use node::{NodeError, TickOutcome, WeatherNode};
pub use packet::{Frame, HeartbeatRecord, SampleRecord, PAYLOAD_LEN};
pub use sensors::SensorBank;
pub use transport::Transport;
