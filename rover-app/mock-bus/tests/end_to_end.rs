use mock_bus::{Bus, ConfigError, DrivetrainThread, SimConfig, client, load_script};
use rover_core::{
    Error,
    utils::{
        ClientConfig, CommandId, Direction, DrivetrainConfig, ENVIRONMENT_ADDRESS, Payload,
        TwiStatus,
    },
};

fn client_config() -> ClientConfig {
    ClientConfig {
        poll_limit: Some(200_000),
        ..Default::default()
    }
}

#[test]
fn test_drive_forward_reports_until_converged() {
    let bus = Bus::new();
    let drivetrain = DrivetrainThread::spawn(bus.port().unwrap(), DrivetrainConfig::default());
    let mut brain = client(&bus, client_config()).unwrap();

    brain.drive(Direction::Forward).unwrap();
    brain.wait_until_available().unwrap();
    assert_eq!(brain.current_command(), CommandId::Drive);

    let mut previous = brain.wheel_speeds()[0];
    loop {
        let telemetry = brain.request_update().unwrap();
        let speed = telemetry.wheel_speeds[0];
        assert!(speed >= previous);
        previous = speed;
        if telemetry.command == CommandId::None {
            assert_eq!(telemetry.wheel_speeds, [1.0; 6]);
            break;
        }
        assert_eq!(telemetry.command, CommandId::Drive);
        assert_eq!(telemetry.target_left, 1.0);
        assert_eq!(telemetry.target_right, 1.0);
    }

    assert!(drivetrain.harness.is_safe());
    let last = drivetrain.join().unwrap();
    assert_eq!(last.command, CommandId::None);
}

#[test]
fn test_command_sequence() {
    let bus = Bus::new();
    let drivetrain = DrivetrainThread::spawn(bus.port().unwrap(), DrivetrainConfig::default());
    let mut brain = client(&bus, client_config()).unwrap();

    brain.set_velocity(0.5, 0.25).unwrap();
    brain.drive(Direction::Backward).unwrap();
    brain.turn(45.0).unwrap();
    brain.wait_until_idle().unwrap();
    brain.request_update().unwrap();
    assert_eq!(brain.target_left(), -0.5);
    assert_eq!(brain.target_right(), -0.25);
    assert_eq!(brain.wheel_speeds()[0], -0.5);
    assert_eq!(brain.wheel_speeds()[1], -0.25);
    assert_eq!(brain.angle(), 0.0);

    brain.stop().unwrap();
    brain.wait_until_idle().unwrap();
    brain.request_update().unwrap();
    assert_eq!(brain.wheel_speeds(), &[0.0; 6]);

    drivetrain.join().unwrap();
}

#[test]
fn test_absent_node_is_not_acknowledged() {
    let bus = Bus::new();
    let drivetrain = DrivetrainThread::spawn(bus.port().unwrap(), DrivetrainConfig::default());
    let mut environment = client(
        &bus,
        ClientConfig {
            address: ENVIRONMENT_ADDRESS,
            ..client_config()
        },
    )
    .unwrap();

    assert_eq!(
        environment.stop(),
        Err(Error::Protocol(TwiStatus::MtSlaNack))
    );
    environment.release_bus();

    let mut brain = client(&bus, client_config()).unwrap();
    let telemetry = brain.request_update().unwrap();
    assert_eq!(telemetry.command, CommandId::None);

    drivetrain.join().unwrap();
}

#[test]
fn test_partial_config_falls_back_to_defaults() {
    let config: SimConfig =
        serde_json::from_str(r#"{ "drivetrain": { "gain": 4.0, "spin_limit": 1000 } }"#).unwrap();
    assert_eq!(config.drivetrain.gain, 4.0);
    assert_eq!(config.drivetrain.spin_limit, Some(1000));
    assert_eq!(config.drivetrain.address, 0xA4);
    assert_eq!(config.client, ClientConfig::default());
}

#[test]
fn test_script_format() {
    let script: Vec<Payload> = serde_json::from_str(
        r#"[
            { "cmd": "drive", "direction": "backward" },
            { "cmd": "set_velocity", "left": 0.5, "right": 0.25 },
            { "cmd": "stop" }
        ]"#,
    )
    .unwrap();
    assert_eq!(
        script,
        vec![
            Payload::Drive {
                direction: Direction::Backward
            },
            Payload::SetVelocity {
                left: 0.5,
                right: 0.25
            },
            Payload::Stop,
        ]
    );
}

#[test]
fn test_script_errors_name_the_file() {
    let dir = std::env::temp_dir().join(format!("mock-bus-script-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.json");
    std::fs::write(&good, r#"[{ "cmd": "stop" }]"#).unwrap();
    assert_eq!(load_script(&good).unwrap(), vec![Payload::Stop]);

    let bad = dir.join("bad.json");
    std::fs::write(&bad, r#"[{ "cmd": "jump" }]"#).unwrap();
    let err = load_script(&bad).unwrap_err();
    assert!(matches!(err, ConfigError::Script { .. }));
    assert!(err.to_string().contains("bad.json"));

    let missing = load_script(&dir.join("missing.json")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));

    std::fs::remove_dir_all(&dir).unwrap();
}
