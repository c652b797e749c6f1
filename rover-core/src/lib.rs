//! Command bus and drivetrain control core for a multi-node robot on no-std microcontrollers.
//!
//! A brain node drives a drivetrain node over a shared two-wire (TWI) bus. For a runnable
//! host simulation of both nodes, see the `mock-bus` crate.
#![cfg_attr(not(test), no_std)]

pub mod utils;

pub use utils::Error;
