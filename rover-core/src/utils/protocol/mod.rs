//! Command protocol spoken between the brain and the drivetrain.

pub mod command;
pub mod queue;
pub mod telemetry;

pub use command::{Command, CommandId, Direction, Payload, MAX_FRAME_LEN};
pub use queue::CommandQueue;
pub use telemetry::{Telemetry, TELEMETRY_LEN};
