use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTrans};
use rover_core::utils::controllers::{Motor, MotorState, PwmMotor};

fn low() -> PinTrans {
    PinTrans::set(State::Low)
}

fn high() -> PinTrans {
    PinTrans::set(State::High)
}

#[test]
fn test_new_motor_brakes() {
    let a = PinMock::new(&[low()]);
    let b = PinMock::new(&[low()]);
    let motor = Motor::new(a, b).unwrap();
    assert_eq!(motor.state(), MotorState::Brake);
    let (mut a, mut b) = motor.release();
    a.done();
    b.done();
}

#[test]
fn test_direction_changes_lower_opposite_pin_first() {
    // brake, clockwise, counterclockwise, brake
    let a = PinMock::new(&[low(), high(), low(), low()]);
    let b = PinMock::new(&[low(), low(), high(), low()]);
    let mut motor = Motor::new(a, b).unwrap();
    motor.clockwise().unwrap();
    assert_eq!(motor.state(), MotorState::Clockwise);
    motor.counterclockwise().unwrap();
    assert_eq!(motor.state(), MotorState::Counterclockwise);
    motor.brake().unwrap();
    let (mut a, mut b) = motor.release();
    a.done();
    b.done();
}

#[test]
fn test_pwm_cycle_drives_then_brakes() {
    // construction, then one drive and one brake update
    let a = PinMock::new(&[low(), low(), low()]);
    let b = PinMock::new(&[low(), high(), low()]);
    let mut motor = PwmMotor::new(Motor::new(a, b).unwrap(), 100.0);
    motor.set(-0.25);
    assert_eq!(motor.speed(), -0.25);
    // 10 ms cycle: first quarter drives, the rest brakes
    motor.update(0.001).unwrap();
    assert_eq!(motor.state(), MotorState::Counterclockwise);
    motor.update(0.006).unwrap();
    assert_eq!(motor.state(), MotorState::Brake);
    let (mut a, mut b) = motor.release();
    a.done();
    b.done();
}

#[test]
fn test_zero_speed_always_brakes() {
    let a = PinMock::new(&[low(), low(), low()]);
    let b = PinMock::new(&[low(), low(), low()]);
    let mut motor = PwmMotor::new(Motor::new(a, b).unwrap(), 50.0);
    motor.set(0.0);
    motor.update(0.0).unwrap();
    motor.update(0.019).unwrap();
    assert_eq!(motor.duty(), 0);
    let (mut a, mut b) = motor.release();
    a.done();
    b.done();
}
