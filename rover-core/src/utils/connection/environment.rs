//! Environment slave node.
//!
//! Holds its bus address so the brain can address it. Blinks a heartbeat LED and carries no
//! sensors yet: command frames are drained and discarded, reads are answered with a single
//! zero byte.

use embedded_hal::digital::OutputPin;
use tracing::{debug, info, warn};

use crate::utils::{
    bus::{ByteChannel, SlaveChannel, Twi, TwiRegisters, TwiStatus},
    config::EnvironmentConfig,
    time::{Monotonic, Timer},
};

/// Byte returned to a read request.
pub const NO_SENSORS: u8 = 0x00;

pub struct EnvironmentNode<'c, R, C: ?Sized, P> {
    twi: Twi<R>,
    clock: &'c C,
    heartbeat: Timer<'c, C>,
    led: P,
    led_on: bool,
    discarded: usize,
    config: EnvironmentConfig,
}

impl<'c, R, C, P> EnvironmentNode<'c, R, C, P>
where
    R: TwiRegisters,
    C: Monotonic + ?Sized,
    P: OutputPin,
{
    pub fn new(regs: R, clock: &'c C, led: P, config: EnvironmentConfig) -> Self {
        Self {
            twi: Twi::new(regs).with_spin_limit(config.spin_limit),
            clock,
            heartbeat: Timer::new(clock),
            led,
            led_on: false,
            discarded: 0,
            config,
        }
    }

    pub fn init(&mut self) {
        self.twi.enable();
        self.twi.connect();
        self.twi.disable_general_call();
        self.twi.set_address(self.config.address);
        self.twi.set_address_mask(self.config.address_mask);
        self.twi.set_slave();
        self.twi.suppress(TwiStatus::StDataNack);
        self.twi.suppress(TwiStatus::StLastData);
        if let Err(error) = self.led.set_low() {
            warn!(?error, "heartbeat LED write failed");
        }
        self.heartbeat.restart();
        info!(address = self.config.address, "environment listening");
    }

    pub fn tick(&mut self) {
        if self.heartbeat.has_elapsed(self.config.blink_period()) {
            self.heartbeat.restart();
            self.led_on = !self.led_on;
            let written = if self.led_on {
                self.led.set_high()
            } else {
                self.led.set_low()
            };
            if let Err(error) = written {
                warn!(?error, "heartbeat LED write failed");
            }
        }
        self.service_bus();
    }

    pub fn run(&mut self) -> ! {
        let period = self.config.loop_period();
        let mut timer = Timer::new(self.clock);
        loop {
            self.tick();
            timer.spin_wait(period);
        }
    }

    pub fn service_bus(&mut self) {
        if self.twi.is_data_requested() {
            if let Err(error) = SlaveChannel::new(&mut self.twi).write_all(&[NO_SENSORS], true) {
                warn!(?error, "read request aborted");
            }
        } else if self.twi.read_available() {
            // drain until the master's STOP
            let mut count = 0;
            while self.twi.read_byte().is_ok() {
                count += 1;
            }
            self.discarded += count;
            debug!(count, "discarded frame");
        }
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Bytes received and dropped since start.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn twi(&self) -> &Twi<R> {
        &self.twi
    }

    pub fn release(self) -> (R, P) {
        (self.twi.release(), self.led)
    }
}
