//! Deterministic simulation harness for Handlink.
//!
//! Turmoil-based [`Environment`](handlink_core::env::Environment) and server
//! wrappers, so whole client/server sessions run on a virtual clock over a
//! simulated network. Split writes, latency, late servers and stale
//! rotations all replay identically on every run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_env;
pub mod sim_server;

pub use sim_env::SimEnv;
pub use sim_server::{SimHub, SimServer, create_shared_hub};
