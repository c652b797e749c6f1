//! Two-wire bus access.
//!
//! - `status`: classification of raw TWI status codes
//! - `twi`: the register-level driver for both master and slave roles
//! - `channel`: role-agnostic byte channels on top of the driver

pub mod channel;
pub mod status;
pub mod twi;

pub use channel::{ByteChannel, MasterChannel, SlaveChannel, SliceChannel};
pub use status::TwiStatus;
pub use twi::{TransferRole, Twi, TwiRegisters};
