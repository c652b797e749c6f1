//! Node configuration.
//!
//! Every struct deserializes with every field optional, so a host tool can load a partial JSON
//! file and fall back to the firmware defaults for the rest.

use serde::{Deserialize, Serialize};

use crate::utils::{time::Duration, DRIVETRAIN_ADDRESS, ENVIRONMENT_ADDRESS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    /// Own slave address, SLA form.
    pub address: u8,
    pub address_mask: u8,
    pub gain: f32,
    pub threshold: f32,
    /// Software PWM frequency in Hz.
    pub pwm_frequency: f32,
    pub left_velocity: f32,
    pub right_velocity: f32,
    pub turn_velocity: f32,
    pub loop_period_us: u64,
    pub spin_limit: Option<u32>,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            address: DRIVETRAIN_ADDRESS,
            address_mask: 0x00,
            gain: 8.0,
            threshold: 0.01,
            pwm_frequency: 50.0,
            left_velocity: 1.0,
            right_velocity: 1.0,
            turn_velocity: 1.0,
            loop_period_us: 20,
            spin_limit: None,
        }
    }
}

impl DrivetrainConfig {
    pub fn loop_period(&self) -> Duration {
        Duration::from_micros(self.loop_period_us)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Drivetrain address, SLA form.
    pub address: u8,
    pub bit_rate: u8,
    pub spin_limit: Option<u32>,
    /// Maximum telemetry polls in `wait_until_*` before giving up.
    pub poll_limit: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DRIVETRAIN_ADDRESS,
            bit_rate: 12,
            spin_limit: None,
            poll_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub address: u8,
    pub address_mask: u8,
    /// Heartbeat LED toggle period.
    pub blink_period_us: u64,
    pub loop_period_us: u64,
    pub spin_limit: Option<u32>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            address: ENVIRONMENT_ADDRESS,
            address_mask: 0x00,
            blink_period_us: 30_000,
            loop_period_us: 100,
            spin_limit: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn blink_period(&self) -> Duration {
        Duration::from_micros(self.blink_period_us)
    }

    pub fn loop_period(&self) -> Duration {
        Duration::from_micros(self.loop_period_us)
    }
}
