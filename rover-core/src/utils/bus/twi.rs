//! TWI (two-wire) bus driver.
//!
//! One peripheral serves both roles: the brain node uses the master primitives
//! (`send_to`, `request_from`, `end_transfer`), the drivetrain node the slave ones
//! (`is_data_requested`, `read_available`, `read_byte`, `write`). Every phase busy-waits on the
//! interrupt flag; the wait is unbounded unless a spin limit is configured.
//!
//! Failures abort the current call, are logged, and are never retried here.

use heapless::Vec;
use tracing::{debug, warn};

use super::status::TwiStatus;
use crate::utils::Error;

/// Interrupt flag; writing it as 1 clears it and starts the next bus action.
pub const TWINT: u8 = 1 << 7;
/// Enable acknowledge.
pub const TWEA: u8 = 1 << 6;
/// START condition.
pub const TWSTA: u8 = 1 << 5;
/// STOP condition.
pub const TWSTO: u8 = 1 << 4;
/// Write collision.
pub const TWWC: u8 = 1 << 3;
/// Peripheral enable.
pub const TWEN: u8 = 1 << 2;
/// Interrupt enable.
pub const TWIE: u8 = 1 << 0;

/// General call recognition bit of the own-address register.
pub const TWGCE: u8 = 1 << 0;

/// Read bit of an SLA byte.
pub const READ: u8 = 1;
/// Write bit of an SLA byte.
pub const WRITE: u8 = 0;

/// Maximum number of suppressed status codes.
pub const SUPPRESS_MAX_COUNT: usize = 16;

/// Register file of a TWI peripheral.
///
/// Semantics follow the AVR TWI block: writing the control register with `TWINT` set clears
/// the interrupt flag and performs the action selected by `TWSTA`/`TWSTO`/`TWEA`; the status
/// register is only meaningful while `TWINT` is set.
pub trait TwiRegisters {
    fn control(&self) -> u8;
    fn set_control(&mut self, value: u8);
    /// Status register; the prescaler bits may be present and are masked off by the driver.
    fn status(&self) -> u8;
    fn data(&self) -> u8;
    fn set_data(&mut self, value: u8);
    /// Own slave address (bits 7..1) and general call enable (bit 0).
    fn address(&self) -> u8;
    fn set_address(&mut self, value: u8);
    /// Address bits (7..1) ignored when matching the own address.
    fn set_address_mask(&mut self, value: u8);
    fn set_bit_rate(&mut self, value: u8);
}

/// What the driver believes the current transfer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRole {
    Idle,
    MasterWrite,
    MasterRead,
    SlaveAddressed,
}

pub struct Twi<R> {
    regs: R,
    enabled: bool,
    connected: bool,
    role: TransferRole,
    last_status: TwiStatus,
    suppressed: Vec<TwiStatus, SUPPRESS_MAX_COUNT>,
    spin_limit: Option<u32>,
}

impl<R: TwiRegisters> Twi<R> {
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            enabled: false,
            connected: false,
            role: TransferRole::Idle,
            last_status: TwiStatus::NoInfo,
            suppressed: Vec::new(),
            spin_limit: None,
        }
    }

    /// Bound every interrupt wait to `limit` polls; exceeding it yields [`Error::Timeout`].
    pub fn with_spin_limit(mut self, limit: Option<u32>) -> Self {
        self.spin_limit = limit;
        self
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn release(self) -> R {
        self.regs
    }

    pub fn role(&self) -> TransferRole {
        self.role
    }

    /// Last status observed by the driver.
    pub fn status(&self) -> TwiStatus {
        self.last_status
    }

    // ---- configuration ----

    pub fn enable(&mut self) {
        self.enabled = true;
        self.write_control(0);
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.role = TransferRole::Idle;
        self.write_control(0);
    }

    pub fn set_bit_rate(&mut self, value: u8) {
        self.regs.set_bit_rate(value);
    }

    /// Start acknowledging our own address.
    pub fn connect(&mut self) {
        self.connected = true;
        self.write_control(0);
    }

    /// Stop acknowledging our own address.
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.write_control(0);
    }

    /// Set the own slave address (SLA form, R/W bit ignored). Keeps the general call setting.
    pub fn set_address(&mut self, address: u8) {
        let gce = self.regs.address() & TWGCE;
        self.regs.set_address((address & !TWGCE) | gce);
    }

    pub fn enable_general_call(&mut self) {
        let address = self.regs.address();
        self.regs.set_address(address | TWGCE);
    }

    pub fn disable_general_call(&mut self) {
        let address = self.regs.address();
        self.regs.set_address(address & !TWGCE);
    }

    /// Address bits set in `mask` (SLA form) always match.
    pub fn set_address_mask(&mut self, mask: u8) {
        self.regs.set_address_mask(mask & !TWGCE);
    }

    /// Drop any pending START/STOP request so the peripheral waits to be addressed.
    pub fn set_slave(&mut self) {
        self.role = TransferRole::Idle;
        self.write_control(0);
    }

    /// Mark `status` as expected-and-harmless. Returns false if the set is full.
    pub fn suppress(&mut self, status: TwiStatus) -> bool {
        if self.suppressed.contains(&status) {
            return true;
        }
        self.suppressed.push(status).is_ok()
    }

    pub fn unsuppress(&mut self, status: TwiStatus) {
        self.suppressed.retain(|s| *s != status);
    }

    pub fn is_suppressed(&self, status: TwiStatus) -> bool {
        self.suppressed.contains(&status)
    }

    // ---- master role ----

    /// Address `address` for writing. Issues a repeated START if a transfer is open.
    ///
    /// On failure the transfer is left aborted; no STOP is sent.
    pub fn send_to(&mut self, address: u8) -> Result<(), Error> {
        self.send_start()?;
        self.send_address(address | WRITE, TwiStatus::MtSlaAck)?;
        self.role = TransferRole::MasterWrite;
        Ok(())
    }

    /// Address `address` for reading. Issues a repeated START if a transfer is open.
    pub fn request_from(&mut self, address: u8) -> Result<(), Error> {
        self.send_start()?;
        self.send_address(address | READ, TwiStatus::MrSlaAck)?;
        self.role = TransferRole::MasterRead;
        Ok(())
    }

    /// Send STOP and release the bus.
    pub fn end_transfer(&mut self) {
        self.write_control(TWINT | TWSTO);
        self.role = TransferRole::Idle;
    }

    /// Transmit one data byte in an open master write.
    pub fn write_data(&mut self, byte: u8) -> Result<(), Error> {
        self.regs.set_data(byte);
        self.write_control(TWINT);
        let status = self.wait_for_interrupt()?;
        self.check(status, &[TwiStatus::MtDataAck], "master transmit")?;
        Ok(())
    }

    /// Receive one data byte in an open master read, answering ACK or NACK.
    ///
    /// NACK tells the slave this is the final byte.
    pub fn read_data(&mut self, ack: bool) -> Result<u8, Error> {
        self.clear_interrupt_with_ack(ack);
        let status = self.wait_for_interrupt()?;
        let expected = if ack {
            TwiStatus::MrDataAck
        } else {
            TwiStatus::MrDataNack
        };
        self.check(status, &[expected], "master receive")?;
        Ok(self.regs.data())
    }

    fn send_start(&mut self) -> Result<(), Error> {
        self.write_control(TWINT | TWSTA);
        let status = self.wait_for_interrupt()?;
        if let Err(error) = self.check(
            status,
            &[TwiStatus::Start, TwiStatus::RepeatedStart],
            "start",
        ) {
            self.write_control(TWINT);
            self.role = TransferRole::Idle;
            return Err(error);
        }
        Ok(())
    }

    fn send_address(&mut self, sla: u8, expected: TwiStatus) -> Result<(), Error> {
        self.regs.set_data(sla);
        self.write_control(TWINT);
        let status = self.wait_for_interrupt()?;
        if let Err(error) = self.check(status, &[expected], "address") {
            self.role = TransferRole::Idle;
            return Err(error);
        }
        debug!(sla, "addressed slave");
        Ok(())
    }

    // ---- slave role ----

    /// True iff the pending bus event is our address in read direction.
    ///
    /// The event is left pending; the following [`Twi::write`] answers it.
    pub fn is_data_requested(&mut self) -> bool {
        if !self.interrupt_pending() {
            return false;
        }
        if self.read_status().is_slave_read_select() {
            self.role = TransferRole::SlaveAddressed;
            return true;
        }
        false
    }

    /// True iff the pending bus event is our address in write direction.
    ///
    /// The address event is acknowledged and consumed, so the next [`Twi::read_byte`] yields the
    /// first data byte. Any other pending event except a read request (STOP, the tail of a
    /// telemetry transfer, stray data) is consumed here as well.
    pub fn read_available(&mut self) -> bool {
        if !self.interrupt_pending() {
            return false;
        }
        let status = self.read_status();
        if status.is_slave_write_select() {
            self.role = TransferRole::SlaveAddressed;
            self.write_control(TWINT);
            return true;
        }
        if status.is_slave_read_select() {
            return false;
        }
        match status {
            TwiStatus::Stop => debug!("stop received"),
            TwiStatus::BusError => {
                warn!("bus error, releasing lines");
                self.role = TransferRole::Idle;
                self.write_control(TWINT | TWSTO);
                return false;
            }
            other if self.is_suppressed(other) => debug!(?other, "consumed suppressed status"),
            other => warn!(?other, "discarding unexpected TWI event"),
        }
        self.role = TransferRole::Idle;
        self.write_control(TWINT);
        false
    }

    /// Receive one byte as an addressed slave.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        let status = self.wait_for_interrupt()?;
        let data = self.regs.data();
        self.write_control(TWINT);
        if status.is_slave_data() {
            return Ok(data);
        }
        self.role = TransferRole::Idle;
        Err(self.report(status, "slave receive"))
    }

    /// Receive up to `output.len()` bytes; stops at the first failure.
    pub fn read(&mut self, output: &mut [u8]) -> usize {
        for (i, slot) in output.iter_mut().enumerate() {
            match self.read_byte() {
                Ok(byte) => *slot = byte,
                Err(_) => return i,
            }
        }
        output.len()
    }

    /// Transmit one byte as an addressed slave. `last` flags the terminal byte of the transfer.
    pub fn write_byte(&mut self, byte: u8, last: bool) -> Result<(), Error> {
        let status = self.wait_for_interrupt()?;
        match status {
            TwiStatus::StSlaAck | TwiStatus::StArbLostSlaAck | TwiStatus::StDataAck => {
                self.regs.set_data(byte);
                self.clear_interrupt_with_ack(!last);
                Ok(())
            }
            other => {
                self.role = TransferRole::Idle;
                self.write_control(TWINT);
                Err(self.report(other, "slave transmit"))
            }
        }
    }

    /// Transmit `data` as an addressed slave, flagging the final byte when `last` is set.
    /// Stops at the first failure and returns the number of bytes sent.
    pub fn write(&mut self, data: &[u8], last: bool) -> usize {
        let count = data.len();
        for (i, &byte) in data.iter().enumerate() {
            if self.write_byte(byte, last && i + 1 == count).is_err() {
                return i;
            }
        }
        count
    }

    /// Return to the unaddressed slave state, releasing both lines.
    pub fn reset_state(&mut self) {
        self.role = TransferRole::Idle;
        self.write_control(TWINT | TWSTO);
    }

    // ---- status plumbing ----

    /// Block until the next bus event and return its status.
    pub fn next_status(&mut self) -> Result<TwiStatus, Error> {
        self.wait_for_interrupt()
    }

    pub fn interrupt_pending(&self) -> bool {
        self.regs.control() & TWINT != 0
    }

    fn read_status(&mut self) -> TwiStatus {
        let status = TwiStatus::from_raw(self.regs.status());
        self.last_status = status;
        status
    }

    fn wait_for_interrupt(&mut self) -> Result<TwiStatus, Error> {
        let mut spins: u32 = 0;
        while !self.interrupt_pending() {
            if let Some(limit) = self.spin_limit {
                if spins >= limit {
                    warn!(limit, role = ?self.role, "TWI wait timed out");
                    return Err(Error::Timeout);
                }
                spins += 1;
            }
            core::hint::spin_loop();
        }
        Ok(self.read_status())
    }

    fn check(
        &self,
        status: TwiStatus,
        expected: &[TwiStatus],
        phase: &'static str,
    ) -> Result<TwiStatus, Error> {
        if expected.contains(&status) || self.is_suppressed(status) {
            Ok(status)
        } else {
            Err(self.report(status, phase))
        }
    }

    fn report(&self, status: TwiStatus, phase: &'static str) -> Error {
        if self.is_suppressed(status) {
            debug!(?status, phase, "suppressed TWI status");
        } else {
            warn!(?status, phase, "unexpected TWI status");
        }
        Error::Protocol(status)
    }

    /// Control word carrying the persistent enable/acknowledge bits plus `flags`.
    fn control_word(&self, flags: u8) -> u8 {
        let mut word = flags;
        if self.enabled {
            word |= TWEN | TWIE;
        }
        if self.connected {
            word |= TWEA;
        }
        word
    }

    fn write_control(&mut self, flags: u8) {
        let word = self.control_word(flags);
        self.regs.set_control(word);
    }

    fn clear_interrupt_with_ack(&mut self, ack: bool) {
        let mut word = self.control_word(TWINT);
        if ack {
            word |= TWEA;
        } else {
            word &= !TWEA;
        }
        self.regs.set_control(word);
    }
}
