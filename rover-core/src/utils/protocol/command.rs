//! Drivetrain commands and their wire encoding.
//!
//! A frame is one id byte followed by the payload fields. Floats travel as 4-byte
//! little-endian IEEE-754.
//!
//! | Command | id | Payload |
//! |---|---|---|
//! | Drive | 0x01 | 1 byte direction (1 forward, 2 backward) |
//! | Stop | 0x02 | none |
//! | Turn | 0x03 | angle |
//! | SetVelocity | 0x04 | left, right |
//! | SetTurnVelocity | 0x05 | velocity |
//! | Move | 0x06 | distance |

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::utils::{bus::channel::SliceChannel, time::Instant, ByteChannel, Error};

/// Longest encoded frame (SetVelocity).
pub const MAX_FRAME_LEN: usize = 9;

/// Command identifiers as they appear on the wire and in telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandId {
    None = 0x00,
    Drive = 0x01,
    Stop = 0x02,
    Turn = 0x03,
    SetVelocity = 0x04,
    SetTurnVelocity = 0x05,
    Move = 0x06,
}

impl TryFrom<u8> for CommandId {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Error> {
        Ok(match id {
            0x00 => Self::None,
            0x01 => Self::Drive,
            0x02 => Self::Stop,
            0x03 => Self::Turn,
            0x04 => Self::SetVelocity,
            0x05 => Self::SetTurnVelocity,
            0x06 => Self::Move,
            other => return Err(Error::UnknownCommand(other)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const fn wire(self) -> u8 {
        match self {
            Self::Forward => 1,
            Self::Backward => 2,
        }
    }

    pub const fn from_wire(byte: u8) -> Result<Self, Error> {
        match byte {
            1 => Ok(Self::Forward),
            2 => Ok(Self::Backward),
            _ => Err(Error::InvalidFormat),
        }
    }

    /// +1.0 forward, -1.0 backward.
    pub const fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Command variants with their fields.
///
/// Serialized as JSON with tag `"cmd"` by the host tools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Payload {
    Drive { direction: Direction },
    Stop,
    /// Placeholder: no angle sensing, completes immediately.
    Turn { angle: f32 },
    SetVelocity { left: f32, right: f32 },
    SetTurnVelocity { velocity: f32 },
    /// Placeholder: no distance sensing, completes immediately.
    Move { distance: f32 },
}

impl Payload {
    pub const fn id(&self) -> CommandId {
        match self {
            Self::Drive { .. } => CommandId::Drive,
            Self::Stop => CommandId::Stop,
            Self::Turn { .. } => CommandId::Turn,
            Self::SetVelocity { .. } => CommandId::SetVelocity,
            Self::SetTurnVelocity { .. } => CommandId::SetTurnVelocity,
            Self::Move { .. } => CommandId::Move,
        }
    }

    pub fn encode(&self) -> Vec<u8, MAX_FRAME_LEN> {
        let mut frame = Vec::new();
        // capacity covers every variant
        let _ = frame.push(self.id() as u8);
        match *self {
            Self::Drive { direction } => {
                let _ = frame.push(direction.wire());
            }
            Self::Stop => {}
            Self::Turn { angle: value }
            | Self::SetTurnVelocity { velocity: value }
            | Self::Move { distance: value } => {
                let _ = frame.extend_from_slice(&value.to_le_bytes());
            }
            Self::SetVelocity { left, right } => {
                let _ = frame.extend_from_slice(&left.to_le_bytes());
                let _ = frame.extend_from_slice(&right.to_le_bytes());
            }
        }
        frame
    }

    /// Read one frame from `channel`.
    ///
    /// Nothing is constructed unless every field arrived: unknown ids yield
    /// [`Error::UnknownCommand`], short frames [`Error::IncompleteTransfer`], NaN or infinite
    /// floats [`Error::InvalidFormat`].
    pub fn decode<C: ByteChannel + ?Sized>(channel: &mut C) -> Result<Self, Error> {
        let id = CommandId::try_from(channel.get(false)?)?;
        let payload = match id {
            CommandId::None => return Err(Error::UnknownCommand(0)),
            CommandId::Drive => Self::Drive {
                direction: Direction::from_wire(channel.get(true)?)?,
            },
            CommandId::Stop => Self::Stop,
            CommandId::Turn => Self::Turn {
                angle: read_f32(channel)?,
            },
            CommandId::SetVelocity => {
                let mut buf = [0u8; 8];
                channel.read_exact(&mut buf)?;
                Self::SetVelocity {
                    left: finite(f32_at(&buf, 0))?,
                    right: finite(f32_at(&buf, 4))?,
                }
            }
            CommandId::SetTurnVelocity => Self::SetTurnVelocity {
                velocity: read_f32(channel)?,
            },
            CommandId::Move => Self::Move {
                distance: read_f32(channel)?,
            },
        };
        Ok(payload)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode(&mut SliceChannel::new(bytes))
    }
}

/// A payload stamped with the tick it was issued or received at.
///
/// Two commands are the same logical command iff their `issued_at` match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub issued_at: Instant,
    pub payload: Payload,
}

impl Command {
    pub const fn new(payload: Payload, issued_at: Instant) -> Self {
        Self { issued_at, payload }
    }

    pub const fn id(&self) -> CommandId {
        self.payload.id()
    }

    pub fn is_same_as(&self, other: &Command) -> bool {
        self.issued_at == other.issued_at
    }
}

fn read_f32<C: ByteChannel + ?Sized>(channel: &mut C) -> Result<f32, Error> {
    let mut buf = [0u8; 4];
    channel.read_exact(&mut buf)?;
    finite(f32::from_le_bytes(buf))
}

fn finite(value: f32) -> Result<f32, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidFormat)
    }
}

pub(crate) fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(buf)
}
