//! Module Exports
//!
//! The two ends of the command bus.
//!
//! # Modules
//! - `node`: the drivetrain slave loop (receive, queue, execute, report).
//! - `client`: the brain-side master facade issuing commands and polling telemetry.
//! - `environment`: the environment slave (address holder and heartbeat, no sensors yet).

pub mod client;
pub mod environment;
pub mod node;

pub use client::DrivetrainClient;
pub use environment::EnvironmentNode;
pub use node::{DrivetrainNode, QUEUE_CAPACITY};
