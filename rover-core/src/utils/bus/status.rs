//! TWI status codes.
//!
//! Every bus phase ends with the peripheral raising its interrupt flag and publishing one of
//! these codes in the upper five bits of the status register.

/// Canonical two-wire protocol states, named after the AVR TWI status tables.
///
/// `Mt*` master transmitter, `Mr*` master receiver, `St*` slave transmitter, `Sr*` slave
/// receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwiStatus {
    /// START condition transmitted.
    Start,
    /// Repeated START condition transmitted.
    RepeatedStart,
    MtSlaAck,
    MtSlaNack,
    MtDataAck,
    MtDataNack,
    /// Arbitration lost in SLA+R/W or data (both master modes share the code).
    ArbitrationLost,
    MrSlaAck,
    MrSlaNack,
    MrDataAck,
    MrDataNack,
    /// Own SLA+R received, ACK returned.
    StSlaAck,
    StArbLostSlaAck,
    StDataAck,
    StDataNack,
    /// Last data byte transmitted, ACK received.
    StLastData,
    /// Own SLA+W received, ACK returned.
    SrSlaAck,
    SrArbLostSlaAck,
    SrGcallAck,
    SrArbLostGcallAck,
    SrDataAck,
    SrDataNack,
    SrGcallDataAck,
    SrGcallDataNack,
    /// STOP or repeated START received while addressed.
    Stop,
    /// No state information (interrupt flag low).
    NoInfo,
    /// Illegal START or STOP condition.
    BusError,
    Other(u8),
}

/// Mask selecting the status bits (the low bits hold the prescaler).
pub const STATUS_MASK: u8 = 0xF8;

impl TwiStatus {
    pub const fn from_raw(raw: u8) -> Self {
        match raw & STATUS_MASK {
            0x08 => Self::Start,
            0x10 => Self::RepeatedStart,
            0x18 => Self::MtSlaAck,
            0x20 => Self::MtSlaNack,
            0x28 => Self::MtDataAck,
            0x30 => Self::MtDataNack,
            0x38 => Self::ArbitrationLost,
            0x40 => Self::MrSlaAck,
            0x48 => Self::MrSlaNack,
            0x50 => Self::MrDataAck,
            0x58 => Self::MrDataNack,
            0xA8 => Self::StSlaAck,
            0xB0 => Self::StArbLostSlaAck,
            0xB8 => Self::StDataAck,
            0xC0 => Self::StDataNack,
            0xC8 => Self::StLastData,
            0x60 => Self::SrSlaAck,
            0x68 => Self::SrArbLostSlaAck,
            0x70 => Self::SrGcallAck,
            0x78 => Self::SrArbLostGcallAck,
            0x80 => Self::SrDataAck,
            0x88 => Self::SrDataNack,
            0x90 => Self::SrGcallDataAck,
            0x98 => Self::SrGcallDataNack,
            0xA0 => Self::Stop,
            0xF8 => Self::NoInfo,
            0x00 => Self::BusError,
            other => Self::Other(other),
        }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Self::Start => 0x08,
            Self::RepeatedStart => 0x10,
            Self::MtSlaAck => 0x18,
            Self::MtSlaNack => 0x20,
            Self::MtDataAck => 0x28,
            Self::MtDataNack => 0x30,
            Self::ArbitrationLost => 0x38,
            Self::MrSlaAck => 0x40,
            Self::MrSlaNack => 0x48,
            Self::MrDataAck => 0x50,
            Self::MrDataNack => 0x58,
            Self::StSlaAck => 0xA8,
            Self::StArbLostSlaAck => 0xB0,
            Self::StDataAck => 0xB8,
            Self::StDataNack => 0xC0,
            Self::StLastData => 0xC8,
            Self::SrSlaAck => 0x60,
            Self::SrArbLostSlaAck => 0x68,
            Self::SrGcallAck => 0x70,
            Self::SrArbLostGcallAck => 0x78,
            Self::SrDataAck => 0x80,
            Self::SrDataNack => 0x88,
            Self::SrGcallDataAck => 0x90,
            Self::SrGcallDataNack => 0x98,
            Self::Stop => 0xA0,
            Self::NoInfo => 0xF8,
            Self::BusError => 0x00,
            Self::Other(raw) => raw,
        }
    }

    /// Own address (or general call) received in write direction.
    pub const fn is_slave_write_select(self) -> bool {
        matches!(
            self,
            Self::SrSlaAck | Self::SrArbLostSlaAck | Self::SrGcallAck | Self::SrArbLostGcallAck
        )
    }

    /// Own address received in read direction.
    pub const fn is_slave_read_select(self) -> bool {
        matches!(self, Self::StSlaAck | Self::StArbLostSlaAck)
    }

    /// A byte arrived while addressed as slave receiver.
    pub const fn is_slave_data(self) -> bool {
        matches!(self, Self::SrDataAck | Self::SrGcallDataAck)
    }

    /// End of a slave-transmitter transfer (master NACKed or read past our last byte).
    pub const fn is_slave_transmit_end(self) -> bool {
        matches!(self, Self::StDataNack | Self::StLastData)
    }
}

impl From<u8> for TwiStatus {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}
