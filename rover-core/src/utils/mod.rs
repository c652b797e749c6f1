//! Utility re-exports and the crate-wide error type.
//!
//! - `bus`: TWI driver, status interpretation and byte channels
//! - `protocol`: command/telemetry wire format and the command queue
//! - `controllers`: PID bank, motor output stage, drivetrain state and command executor
//! - `connection`: the drivetrain slave node and the brain-side client
//! - `time`: tick clock and busy-wait timer
//! - `status`: reset cause query
//! - `config`: node configuration

pub mod bus;
pub mod config;
pub mod connection;
pub mod controllers;
pub mod protocol;
pub mod status;
pub mod time;

pub use bus::{ByteChannel, Twi, TwiRegisters, TwiStatus};
pub use config::{ClientConfig, DrivetrainConfig, EnvironmentConfig};
pub use connection::{DrivetrainClient, DrivetrainNode, EnvironmentNode};
pub use protocol::{Command, CommandId, CommandQueue, Direction, Payload, Telemetry};
pub use time::{Clock, Duration, Instant, Monotonic, Timer};

use thiserror::Error;

/// Drivetrain bus address (SLA form, 7-bit address 0x52).
pub const DRIVETRAIN_ADDRESS: u8 = 0xA4;
/// Environment node bus address (SLA form, 7-bit address 0x53).
pub const ENVIRONMENT_ADDRESS: u8 = 0xA6;

/// Errors raised by the bus, codec and command layers.
///
/// None of these are fatal: the caller logs them and retries on its next control tick.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    /// A bus phase ended in a status other than the one expected.
    #[error("unexpected bus status {0:?}")]
    Protocol(TwiStatus),
    /// Fewer bytes moved than the frame needs; the partial data must be discarded.
    #[error("transfer moved {moved} of {expected} bytes")]
    IncompleteTransfer { moved: usize, expected: usize },
    #[error("unknown command id {0:#04x}")]
    UnknownCommand(u8),
    /// A payload field held a value no variant accepts.
    #[error("malformed command payload")]
    InvalidFormat,
    #[error("command queue is full")]
    QueueFull,
    /// The bus did not raise its interrupt flag within the spin limit.
    #[error("bus wait exceeded spin limit")]
    Timeout,
}
