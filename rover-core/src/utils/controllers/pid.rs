//! Proportional convergence of wheel power toward a set point.
//!
//! Each step moves the output by at most `dt * gain` (the error is clamped to ±1), and an output
//! within `threshold` of the target snaps onto it so completion is not stalled by dither.

use crate::utils::time::Instant;

/// Wheel positions, in telemetry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wheel {
    FrontLeft = 0,
    FrontRight = 1,
    CenterLeft = 2,
    CenterRight = 3,
    BackLeft = 4,
    BackRight = 5,
}

impl Wheel {
    pub const ALL: [Wheel; 6] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::CenterLeft,
        Wheel::CenterRight,
        Wheel::BackLeft,
        Wheel::BackRight,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_left(self) -> bool {
        matches!(self, Wheel::FrontLeft | Wheel::CenterLeft | Wheel::BackLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidChannel {
    target: f32,
    last_sample: Option<Instant>,
    gain: f32,
    threshold: f32,
}

impl PidChannel {
    /// A negative `threshold` is treated as zero.
    pub fn new(gain: f32, threshold: f32) -> Self {
        Self {
            target: 0.0,
            last_sample: None,
            gain,
            threshold: threshold.max(0.0),
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn at_target(&self, current: f32) -> bool {
        libm::fabsf(current - self.target) <= self.threshold
    }

    /// Next output for `current` after `dt` seconds.
    pub fn step(&self, current: f32, dt: f32) -> f32 {
        let error = (self.target - current).clamp(-1.0, 1.0);
        let output = current + error * dt * self.gain;
        if self.at_target(output) {
            self.target
        } else {
            output
        }
    }

    /// Like [`PidChannel::step`], with `dt` measured from the previous sample.
    ///
    /// The first sample after construction or [`PidChannel::reset`] uses `dt = 0`.
    pub fn update(&mut self, current: f32, now: Instant) -> f32 {
        let dt = match self.last_sample {
            Some(previous) => now.saturating_since(previous).as_secs_f32(),
            None => 0.0,
        };
        self.last_sample = Some(now);
        self.step(current, dt)
    }

    pub fn reset(&mut self) {
        self.last_sample = None;
    }
}

/// One channel per wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct PidBank {
    channels: [PidChannel; 6],
}

impl PidBank {
    pub fn new(gain: f32, threshold: f32) -> Self {
        Self {
            channels: [PidChannel::new(gain, threshold); 6],
        }
    }

    pub fn channel(&self, wheel: Wheel) -> &PidChannel {
        &self.channels[wheel.index()]
    }

    pub fn channel_mut(&mut self, wheel: Wheel) -> &mut PidChannel {
        &mut self.channels[wheel.index()]
    }

    pub fn set_side_targets(&mut self, left: f32, right: f32) {
        for wheel in Wheel::ALL {
            let target = if wheel.is_left() { left } else { right };
            self.channels[wheel.index()].set_target(target);
        }
    }

    pub fn set_all_targets(&mut self, target: f32) {
        self.set_side_targets(target, target);
    }

    /// Advance every wheel speed in `speeds` by one control step.
    pub fn update(&mut self, speeds: &mut [f32; 6], now: Instant) {
        for (channel, speed) in self.channels.iter_mut().zip(speeds.iter_mut()) {
            *speed = channel.update(*speed, now);
        }
    }

    pub fn all_at_target(&self, speeds: &[f32; 6]) -> bool {
        self.channels
            .iter()
            .zip(speeds.iter())
            .all(|(channel, &speed)| channel.at_target(speed))
    }
}
