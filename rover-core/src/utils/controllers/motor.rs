//! H-bridge motor outputs.
//!
//! A [`Motor`] is a pin pair: A high turns clockwise, B high counterclockwise, both low brakes.
//! The pins are never driven high together; the opposing pin is always lowered first.
//! [`PwmMotor`] adds software PWM: each tick it checks where the timestamp falls inside the
//! current PWM cycle and either drives in the commanded direction or brakes.

use embedded_hal::digital::OutputPin;

/// Full-scale PWM duty.
pub const MAX_DUTY: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Brake,
    Clockwise,
    Counterclockwise,
}

pub struct Motor<P> {
    pin_a: P,
    pin_b: P,
    state: MotorState,
}

impl<P: OutputPin> Motor<P> {
    /// Takes both pins and brakes.
    pub fn new(pin_a: P, pin_b: P) -> Result<Self, P::Error> {
        let mut motor = Self {
            pin_a,
            pin_b,
            state: MotorState::Brake,
        };
        motor.brake()?;
        Ok(motor)
    }

    pub fn clockwise(&mut self) -> Result<(), P::Error> {
        self.pin_b.set_low()?;
        self.pin_a.set_high()?;
        self.state = MotorState::Clockwise;
        Ok(())
    }

    pub fn counterclockwise(&mut self) -> Result<(), P::Error> {
        self.pin_a.set_low()?;
        self.pin_b.set_high()?;
        self.state = MotorState::Counterclockwise;
        Ok(())
    }

    pub fn brake(&mut self) -> Result<(), P::Error> {
        self.pin_a.set_low()?;
        self.pin_b.set_low()?;
        self.state = MotorState::Brake;
        Ok(())
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn release(self) -> (P, P) {
        (self.pin_a, self.pin_b)
    }
}

pub struct PwmMotor<P> {
    motor: Motor<P>,
    speed: f32,
    duty: u16,
    cycle_time: f32,
}

impl<P: OutputPin> PwmMotor<P> {
    /// `frequency` is the PWM cycle rate in Hz. A non-positive frequency disables modulation:
    /// any non-zero duty then drives continuously.
    pub fn new(motor: Motor<P>, frequency: f32) -> Self {
        let cycle_time = if frequency > 0.0 { 1.0 / frequency } else { 0.0 };
        Self {
            motor,
            speed: 0.0,
            duty: 0,
            cycle_time,
        }
    }

    /// Signed speed in [-1, 1]; magnitudes beyond 1 saturate. NaN brakes.
    pub fn set(&mut self, speed: f32) {
        let speed = if speed.is_nan() { 0.0 } else { speed };
        self.speed = speed;
        let magnitude = libm::fabsf(speed).min(1.0);
        self.duty = libm::floorf(magnitude * MAX_DUTY as f32) as u16;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn state(&self) -> MotorState {
        self.motor.state()
    }

    /// Drive or brake depending on where `timestamp` (seconds) falls in the PWM cycle.
    pub fn update(&mut self, timestamp: f32) -> Result<(), P::Error> {
        let phase = if self.cycle_time > 0.0 {
            let cycles = timestamp / self.cycle_time;
            libm::floorf((cycles - libm::floorf(cycles)) * MAX_DUTY as f32) as u16
        } else {
            0
        };
        if phase < self.duty {
            if self.speed > 0.0 {
                self.motor.clockwise()
            } else {
                self.motor.counterclockwise()
            }
        } else {
            self.motor.brake()
        }
    }

    pub fn release(self) -> (P, P) {
        self.motor.release()
    }
}
