//! Module Exports
//!
//! Control side of the drivetrain node.
//!
//! - `pid`: per-wheel proportional convergence toward target power.
//! - `drivetrain`: wheel speeds, side velocities and the PID bank.
//! - `executor`: the current-command state machine fed by the command queue.
//! - `motor`: H-bridge pin pairs driven with software PWM.

pub mod drivetrain;
pub mod executor;
pub mod motor;
pub mod pid;

pub use drivetrain::Drivetrain;
pub use executor::Executor;
pub use motor::{Motor, MotorState, PwmMotor, MAX_DUTY};
pub use pid::{PidBank, PidChannel, Wheel};
