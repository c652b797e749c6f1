//! Wheel speed state of the six-wheel drivetrain.

use tracing::debug;

use super::pid::{PidBank, Wheel};
use crate::utils::{
    config::DrivetrainConfig,
    protocol::{CommandId, Direction, Telemetry},
    time::Instant,
};

pub struct Drivetrain {
    speeds: [f32; 6],
    pid: PidBank,
    left_velocity: f32,
    right_velocity: f32,
    turn_velocity: f32,
    /// Direction of the last drive; `None` once stopped.
    heading: Option<Direction>,
    angle: f32,
}

impl Drivetrain {
    pub fn new(config: &DrivetrainConfig) -> Self {
        Self {
            speeds: [0.0; 6],
            pid: PidBank::new(config.gain, config.threshold),
            left_velocity: config.left_velocity,
            right_velocity: config.right_velocity,
            turn_velocity: config.turn_velocity,
            heading: None,
            angle: 0.0,
        }
    }

    pub fn drive(&mut self, direction: Direction) {
        self.heading = Some(direction);
        self.retarget();
    }

    pub fn stop(&mut self) {
        self.heading = None;
        self.retarget();
    }

    pub fn set_velocity(&mut self, left: f32, right: f32) {
        self.left_velocity = left;
        self.right_velocity = right;
        self.retarget();
    }

    pub fn set_turn_velocity(&mut self, velocity: f32) {
        self.turn_velocity = velocity;
    }

    fn retarget(&mut self) {
        let sign = self.heading.map_or(0.0, Direction::sign);
        self.pid
            .set_side_targets(sign * self.left_velocity, sign * self.right_velocity);
    }

    /// One control step for every wheel.
    pub fn update(&mut self, now: Instant) {
        self.pid.update(&mut self.speeds, now);
        debug!(speeds = ?self.speeds, "wheel speeds");
    }

    pub fn at_target(&self) -> bool {
        self.pid.all_at_target(&self.speeds)
    }

    pub fn speeds(&self) -> &[f32; 6] {
        &self.speeds
    }

    pub fn speed(&self, wheel: Wheel) -> f32 {
        self.speeds[wheel.index()]
    }

    pub fn target_left(&self) -> f32 {
        self.pid.channel(Wheel::FrontLeft).target()
    }

    pub fn target_right(&self) -> f32 {
        self.pid.channel(Wheel::FrontRight).target()
    }

    pub fn velocities(&self) -> (f32, f32) {
        (self.left_velocity, self.right_velocity)
    }

    pub fn turn_velocity(&self) -> f32 {
        self.turn_velocity
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn telemetry(&self, command: CommandId) -> Telemetry {
        Telemetry {
            wheel_speeds: self.speeds,
            command,
            target_left: self.target_left(),
            target_right: self.target_right(),
            angle: self.angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_targets_follow_side_velocities() {
        let mut drivetrain = Drivetrain::new(&DrivetrainConfig {
            left_velocity: 0.5,
            right_velocity: 0.75,
            ..Default::default()
        });
        drivetrain.drive(Direction::Backward);
        assert_eq!(drivetrain.target_left(), -0.5);
        assert_eq!(drivetrain.target_right(), -0.75);
        drivetrain.set_velocity(1.0, 1.0);
        assert_eq!(drivetrain.target_left(), -1.0);
        drivetrain.stop();
        assert_eq!(drivetrain.target_right(), 0.0);
        drivetrain.set_velocity(0.2, 0.2);
        assert_eq!(drivetrain.target_left(), 0.0);
        assert_eq!(drivetrain.velocities(), (0.2, 0.2));
    }

    #[test]
    fn telemetry_reflects_state() {
        let mut drivetrain = Drivetrain::new(&DrivetrainConfig::default());
        drivetrain.drive(Direction::Forward);
        let telemetry = drivetrain.telemetry(CommandId::Drive);
        assert_eq!(telemetry.command, CommandId::Drive);
        assert_eq!(telemetry.target_left, 1.0);
        assert_eq!(telemetry.wheel_speeds, [0.0; 6]);
    }
}
