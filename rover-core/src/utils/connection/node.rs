//! Drivetrain slave node.
//!
//! Owns the slave-side bus, the command queue, the executor and the six wheel motors. The
//! firmware main calls [`DrivetrainNode::init`] once and then [`DrivetrainNode::run`]; tests and
//! simulators drive [`DrivetrainNode::tick`] directly.

use embedded_hal::digital::OutputPin;
use tracing::{debug, info, warn};

use crate::utils::{
    bus::{ByteChannel, SlaveChannel, Twi, TwiRegisters, TwiStatus},
    config::DrivetrainConfig,
    controllers::{Drivetrain, Executor, Motor, PwmMotor, Wheel},
    protocol::{Command, CommandQueue, Payload, Telemetry},
    time::{Instant, Monotonic, Timer, TICKS_PER_SECOND},
};

/// Default queue depth for firmware builds.
pub const QUEUE_CAPACITY: usize = 8;

pub struct DrivetrainNode<'c, R, C: ?Sized, P, const N: usize = QUEUE_CAPACITY> {
    twi: Twi<R>,
    clock: &'c C,
    queue: CommandQueue<N>,
    executor: Executor,
    drivetrain: Drivetrain,
    motors: [PwmMotor<P>; 6],
    config: DrivetrainConfig,
}

impl<'c, R, C, P, const N: usize> DrivetrainNode<'c, R, C, P, N>
where
    R: TwiRegisters,
    C: Monotonic + ?Sized,
    P: OutputPin,
{
    /// `motors` are in wheel order (front, center, back; left before right).
    pub fn new(regs: R, clock: &'c C, motors: [Motor<P>; 6], config: DrivetrainConfig) -> Self {
        Self {
            twi: Twi::new(regs).with_spin_limit(config.spin_limit),
            clock,
            queue: CommandQueue::new(),
            executor: Executor::new(),
            drivetrain: Drivetrain::new(&config),
            motors: motors.map(|motor| PwmMotor::new(motor, config.pwm_frequency)),
            config,
        }
    }

    /// Configure the bus peripheral as an addressable slave.
    pub fn init(&mut self) {
        self.twi.enable();
        self.twi.set_address(self.config.address);
        self.twi.set_address_mask(self.config.address_mask);
        self.twi.disable_general_call();
        self.twi.connect();
        self.twi.set_slave();
        // trailing events of a telemetry transfer
        self.twi.suppress(TwiStatus::StDataNack);
        self.twi.suppress(TwiStatus::StLastData);
        info!(address = self.config.address, "drivetrain listening");
    }

    /// One control loop iteration.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.executor
            .tick(now, &mut self.queue, &mut self.drivetrain);
        self.update_motors(now);
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

    /// Answer a pending telemetry request or receive a pending command.
    pub fn service_bus(&mut self) {
        if self.twi.is_data_requested() {
            let frame = self.telemetry().encode();
            match SlaveChannel::new(&mut self.twi).write_all(&frame, true) {
                Ok(()) => debug!("telemetry sent"),
                Err(error) => warn!(?error, "telemetry request aborted"),
            }
        } else if self.twi.read_available() {
            let decoded = Payload::decode(&mut SlaveChannel::new(&mut self.twi));
            match decoded {
                Ok(payload) => self.accept(payload),
                Err(error) => warn!(?error, "dropping command frame"),
            }
        }
    }

    fn accept(&mut self, payload: Payload) {
        let command = Command::new(payload, self.clock.now());
        match self.queue.enqueue(command) {
            Ok(()) => info!(?payload, issued_at = command.issued_at.ticks(), "command queued"),
            Err(error) => warn!(?error, ?payload, "command rejected"),
        }
    }

    fn update_motors(&mut self, now: Instant) {
        // wrap at whole seconds to keep f32 resolution
        let timestamp = (now.ticks() % TICKS_PER_SECOND) as f32 / TICKS_PER_SECOND as f32;
        for (motor, &speed) in self.motors.iter_mut().zip(self.drivetrain.speeds().iter()) {
            motor.set(speed);
            if let Err(error) = motor.update(timestamp) {
                warn!(?error, "motor pin write failed");
            }
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        self.drivetrain.telemetry(self.executor.current_id())
    }

    pub fn queue(&self) -> &CommandQueue<N> {
        &self.queue
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn drivetrain(&self) -> &Drivetrain {
        &self.drivetrain
    }

    pub fn motor(&self, wheel: Wheel) -> &PwmMotor<P> {
        &self.motors[wheel.index()]
    }

    pub fn twi(&self) -> &Twi<R> {
        &self.twi
    }

    pub fn twi_mut(&mut self) -> &mut Twi<R> {
        &mut self.twi
    }

    pub fn config(&self) -> &DrivetrainConfig {
        &self.config
    }
}
