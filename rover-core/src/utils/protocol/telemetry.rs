//! Drivetrain telemetry frame (slave → master).
//!
//! Fixed layout, floats little-endian:
//! six wheel speeds (front-left, front-right, center-left, center-right, back-left,
//! back-right), current command id (1 byte), left and right target power, current angle.

use super::command::{f32_at, CommandId};
use crate::utils::Error;

pub const TELEMETRY_LEN: usize = 6 * 4 + 1 + 2 * 4 + 4;

const ID_OFFSET: usize = 24;
const TARGET_LEFT_OFFSET: usize = 25;
const TARGET_RIGHT_OFFSET: usize = 29;
const ANGLE_OFFSET: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub wheel_speeds: [f32; 6],
    pub command: CommandId,
    pub target_left: f32,
    pub target_right: f32,
    pub angle: f32,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            wheel_speeds: [0.0; 6],
            command: CommandId::None,
            target_left: 0.0,
            target_right: 0.0,
            angle: 0.0,
        }
    }
}

impl Telemetry {
    pub fn encode(&self) -> [u8; TELEMETRY_LEN] {
        let mut frame = [0u8; TELEMETRY_LEN];
        for (i, speed) in self.wheel_speeds.iter().enumerate() {
            frame[i * 4..i * 4 + 4].copy_from_slice(&speed.to_le_bytes());
        }
        frame[ID_OFFSET] = self.command as u8;
        frame[TARGET_LEFT_OFFSET..TARGET_LEFT_OFFSET + 4]
            .copy_from_slice(&self.target_left.to_le_bytes());
        frame[TARGET_RIGHT_OFFSET..TARGET_RIGHT_OFFSET + 4]
            .copy_from_slice(&self.target_right.to_le_bytes());
        frame[ANGLE_OFFSET..ANGLE_OFFSET + 4].copy_from_slice(&self.angle.to_le_bytes());
        frame
    }

    pub fn decode(frame: &[u8; TELEMETRY_LEN]) -> Result<Self, Error> {
        let mut wheel_speeds = [0.0f32; 6];
        for (i, speed) in wheel_speeds.iter_mut().enumerate() {
            *speed = f32_at(frame, i * 4);
        }
        Ok(Self {
            wheel_speeds,
            command: CommandId::try_from(frame[ID_OFFSET])?,
            target_left: f32_at(frame, TARGET_LEFT_OFFSET),
            target_right: f32_at(frame, TARGET_RIGHT_OFFSET),
            angle: f32_at(frame, ANGLE_OFFSET),
        })
    }

    /// True while the drivetrain is executing a command.
    pub fn is_busy(&self) -> bool {
        self.command != CommandId::None
    }
}
