//! Brain-side facade over the drivetrain node.
//!
//! Every motion call is one master write transfer carrying one encoded command.
//! [`DrivetrainClient::request_update`] is the only read path: one master read of a full
//! telemetry frame. The cached telemetry is replaced only when the whole frame arrived and
//! decoded; any failure leaves the previous values in place.

use tracing::{debug, info, warn};

use crate::utils::{
    bus::{ByteChannel, MasterChannel, Twi, TwiRegisters},
    config::ClientConfig,
    protocol::{CommandId, Direction, Payload, Telemetry, TELEMETRY_LEN},
    Error,
};

pub struct DrivetrainClient<R> {
    twi: Twi<R>,
    config: ClientConfig,
    telemetry: Telemetry,
}

impl<R: TwiRegisters> DrivetrainClient<R> {
    pub fn new(regs: R, config: ClientConfig) -> Self {
        Self {
            twi: Twi::new(regs).with_spin_limit(config.spin_limit),
            config,
            telemetry: Telemetry::default(),
        }
    }

    pub fn enable(&mut self) {
        self.twi.set_bit_rate(self.config.bit_rate);
        self.twi.enable();
    }

    pub fn disable(&mut self) {
        self.twi.disable();
    }

    pub fn drive(&mut self, direction: Direction) -> Result<(), Error> {
        self.send(&Payload::Drive { direction })
    }

    pub fn stop(&mut self) -> Result<(), Error> {
        self.send(&Payload::Stop)
    }

    pub fn turn(&mut self, angle: f32) -> Result<(), Error> {
        self.send(&Payload::Turn { angle })
    }

    pub fn move_by(&mut self, distance: f32) -> Result<(), Error> {
        self.send(&Payload::Move { distance })
    }

    pub fn set_velocity(&mut self, left: f32, right: f32) -> Result<(), Error> {
        self.send(&Payload::SetVelocity { left, right })
    }

    pub fn set_turn_velocity(&mut self, velocity: f32) -> Result<(), Error> {
        self.send(&Payload::SetTurnVelocity { velocity })
    }

    /// Send one command frame.
    ///
    /// If addressing fails the transfer is left open; the caller decides whether to retry or
    /// call [`DrivetrainClient::release_bus`]. Once addressed, the transfer is always closed.
    pub fn send(&mut self, payload: &Payload) -> Result<(), Error> {
        let frame = payload.encode();
        self.twi.send_to(self.config.address)?;
        let written = MasterChannel::new(&mut self.twi).write_all(&frame, true);
        self.twi.end_transfer();
        written?;
        info!(?payload, "command sent");
        Ok(())
    }

    /// Fetch one telemetry frame and cache it.
    pub fn request_update(&mut self) -> Result<Telemetry, Error> {
        self.twi.request_from(self.config.address)?;
        let mut frame = [0u8; TELEMETRY_LEN];
        let read = MasterChannel::new(&mut self.twi).read_exact(&mut frame);
        self.twi.end_transfer();
        read?;
        self.telemetry = Telemetry::decode(&frame)?;
        Ok(self.telemetry)
    }

    pub fn log_telemetry(&self) {
        let t = &self.telemetry;
        info!(
            command = ?t.command,
            speeds = ?t.wheel_speeds,
            target_left = t.target_left,
            target_right = t.target_right,
            angle = t.angle,
            "drivetrain telemetry"
        );
    }

    /// Poll until the drivetrain reports a running command.
    pub fn wait_until_available(&mut self) -> Result<(), Error> {
        self.poll_until(Telemetry::is_busy)
    }

    /// Poll until the drivetrain reports no running command.
    pub fn wait_until_idle(&mut self) -> Result<(), Error> {
        self.poll_until(|t| !t.is_busy())
    }

    fn poll_until(&mut self, done: impl Fn(&Telemetry) -> bool) -> Result<(), Error> {
        let mut polls: u32 = 0;
        loop {
            if let Some(limit) = self.config.poll_limit {
                if polls >= limit {
                    warn!(limit, "drivetrain did not reach the awaited state");
                    return Err(Error::Timeout);
                }
            }
            polls = polls.saturating_add(1);
            match self.request_update() {
                Ok(telemetry) => {
                    self.log_telemetry();
                    if done(&telemetry) {
                        return Ok(());
                    }
                }
                Err(error) => debug!(?error, "telemetry poll failed"),
            }
        }
    }

    /// Send STOP, abandoning whatever transfer is open.
    pub fn release_bus(&mut self) {
        self.twi.end_transfer();
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn wheel_speeds(&self) -> &[f32; 6] {
        &self.telemetry.wheel_speeds
    }

    pub fn current_command(&self) -> CommandId {
        self.telemetry.command
    }

    pub fn is_busy(&self) -> bool {
        self.telemetry.is_busy()
    }

    pub fn target_left(&self) -> f32 {
        self.telemetry.target_left
    }

    pub fn target_right(&self) -> f32 {
        self.telemetry.target_right
    }

    pub fn angle(&self) -> f32 {
        self.telemetry.angle
    }

    pub fn twi(&self) -> &Twi<R> {
        &self.twi
    }

    pub fn twi_mut(&mut self) -> &mut Twi<R> {
        &mut self.twi
    }
}
