mod common;

use std::convert::Infallible;

use common::{data, ev, ManualClock, ScriptedTwi};
use rover_core::utils::{
    bus::TwiStatus,
    controllers::{Motor, MotorState, Wheel},
    connection::DrivetrainNode,
    CommandId, Direction, DrivetrainConfig, Payload, Telemetry,
};

/// 10 ms at 2 MHz.
const TICK: u64 = 20_000;

#[derive(Default)]
struct Pin;

impl embedded_hal::digital::ErrorType for Pin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

fn motors() -> [Motor<Pin>; 6] {
    core::array::from_fn(|_| {
        let Ok(motor) = Motor::new(Pin, Pin);
        motor
    })
}

fn node<'c, const N: usize>(
    regs: &ScriptedTwi,
    clock: &'c ManualClock,
) -> DrivetrainNode<'c, ScriptedTwi, ManualClock, Pin, N> {
    let mut node = DrivetrainNode::new(
        regs.clone(),
        clock,
        motors(),
        DrivetrainConfig::default(),
    );
    node.init();
    node
}

/// Incoming master write carrying `payload`.
fn incoming(regs: &ScriptedTwi, payload: Payload) {
    let mut events = vec![ev(0x60)];
    events.extend(payload.encode().iter().map(|&b| data(0x80, b)));
    events.push(ev(0xA0));
    regs.push(events);
    regs.raise();
}

fn step<const N: usize>(
    node: &mut DrivetrainNode<'_, ScriptedTwi, ManualClock, Pin, N>,
    clock: &ManualClock,
) {
    clock.advance(TICK);
    node.tick();
}

#[test]
fn test_init_configures_slave() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let node = node::<8>(&regs, &clock);
    assert_eq!(regs.own_address(), 0xA4);
    assert_eq!(regs.mask(), 0x00);
    assert!(node.twi().is_suppressed(TwiStatus::StDataNack));
    assert!(node.twi().is_suppressed(TwiStatus::StLastData));
}

#[test]
fn test_drive_end_to_end() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let mut node = node::<8>(&regs, &clock);

    incoming(&regs, Payload::Drive { direction: Direction::Forward });
    step(&mut node, &clock);
    assert_eq!(node.queue().len(), 1);

    step(&mut node, &clock);
    assert!(regs.is_drained());
    assert_eq!(node.telemetry().command, CommandId::Drive);

    let mut ticks = 0;
    while node.telemetry().command == CommandId::Drive {
        step(&mut node, &clock);
        ticks += 1;
        assert!(ticks < 200, "drive never converged");
    }
    assert_eq!(node.telemetry().command, CommandId::None);
    assert_eq!(node.drivetrain().speeds(), &[1.0; 6]);
    assert_eq!(node.telemetry().target_left, 1.0);
    assert_eq!(node.motor(Wheel::BackRight).duty(), u16::MAX);
    assert_eq!(node.motor(Wheel::FrontLeft).state(), MotorState::Clockwise);
}

#[test]
fn test_telemetry_request_is_answered() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let mut node = node::<8>(&regs, &clock);

    let mut events = vec![ev(0xA8)];
    events.extend(std::iter::repeat(ev(0xB8)).take(36));
    events.push(ev(0xC0));
    regs.push(events);
    regs.raise();

    step(&mut node, &clock);
    let written = regs.written();
    assert_eq!(written.len(), 37);
    let frame: [u8; 37] = written.try_into().unwrap();
    assert_eq!(Telemetry::decode(&frame), Ok(node.telemetry()));

    // NACK of the last byte is suppressed and consumed
    step(&mut node, &clock);
    assert!(regs.is_drained());
}

#[test]
fn test_unknown_command_is_dropped() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let mut node = node::<8>(&regs, &clock);

    regs.push([ev(0x60), data(0x80, 0x09), data(0x80, 0x01), ev(0xA0)]);
    regs.raise();
    for _ in 0..3 {
        step(&mut node, &clock);
    }
    assert!(node.queue().is_empty());
    assert!(node.executor().is_idle());
    assert!(regs.is_drained());
}

#[test]
fn test_truncated_command_is_dropped() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let mut node = node::<8>(&regs, &clock);

    regs.push([ev(0x60), data(0x80, 0x04), data(0x80, 0x00), ev(0xA0)]);
    regs.raise();
    step(&mut node, &clock);
    assert!(node.queue().is_empty());
    assert!(regs.is_drained());
    assert_eq!(node.drivetrain().velocities(), (1.0, 1.0));
}

#[test]
fn test_full_queue_rejects_command() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let mut node = node::<1>(&regs, &clock);

    incoming(&regs, Payload::Drive { direction: Direction::Forward });
    step(&mut node, &clock);
    step(&mut node, &clock);
    assert_eq!(node.executor().current_id(), CommandId::Drive);

    incoming(&regs, Payload::SetTurnVelocity { velocity: 0.5 });
    step(&mut node, &clock);
    step(&mut node, &clock);
    incoming(&regs, Payload::Stop);
    step(&mut node, &clock);
    step(&mut node, &clock);

    assert_eq!(node.queue().len(), 1);
    assert_eq!(
        node.queue().peek().map(|command| command.id()),
        Some(CommandId::SetTurnVelocity)
    );
    assert!(regs.is_drained());
}

#[test]
fn test_non_finite_velocity_is_dropped() {
    let regs = ScriptedTwi::default();
    let clock = ManualClock::default();
    let mut node = node::<8>(&regs, &clock);

    let mut frame = vec![0x04];
    frame.extend(f32::NAN.to_le_bytes());
    frame.extend(0.0f32.to_le_bytes());
    let mut events = vec![ev(0x60)];
    events.extend(frame.iter().map(|&b| data(0x80, b)));
    events.push(ev(0xA0));
    regs.push(events);
    regs.raise();
    for _ in 0..3 {
        step(&mut node, &clock);
    }
    assert!(node.queue().is_empty());
    assert!(node.executor().is_idle());
    assert_eq!(node.drivetrain().velocities(), (1.0, 1.0));

    incoming(&regs, Payload::Stop);
    for _ in 0..3 {
        step(&mut node, &clock);
    }
    assert!(regs.is_drained());
    assert!(node.executor().is_idle());
    assert_eq!(node.drivetrain().speeds(), &[0.0; 6]);
}
