use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use mock_bus::{Bus, DrivetrainThread, SimConfig, client, load_script};
use rover_core::utils::{Direction, Payload};
use tracing::{error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0", about = "Brain and drivetrain nodes over a simulated two-wire bus")]
struct Opts {
    /// JSON file with optional `drivetrain` and `client` sections
    #[clap(long)]
    config: Option<PathBuf>,
    /// JSON array of commands to send, e.g. `[{"cmd":"drive","direction":"forward"}]`
    #[clap(long)]
    script: Option<PathBuf>,
    /// Control loop period of the drivetrain in microseconds
    #[clap(long)]
    loop_period_us: Option<u64>,
    /// Proportional gain of every wheel channel
    #[clap(long)]
    gain: Option<f32>,
    /// Give up waiting on the drivetrain after this many telemetry polls
    #[clap(long)]
    poll_limit: Option<u32>,
}

fn default_script() -> Vec<Payload> {
    vec![
        Payload::Drive {
            direction: Direction::Forward,
        },
        Payload::SetVelocity {
            left: 0.5,
            right: 0.5,
        },
        Payload::Turn { angle: 90.0 },
        Payload::Stop,
    ]
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let mut config = match &opts.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };
    if let Some(period) = opts.loop_period_us {
        config.drivetrain.loop_period_us = period;
    }
    if let Some(gain) = opts.gain {
        config.drivetrain.gain = gain;
    }
    if opts.poll_limit.is_some() {
        config.client.poll_limit = opts.poll_limit;
    }

    let script = match &opts.script {
        Some(path) => match load_script(path) {
            Ok(script) => script,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => default_script(),
    };

    let bus = Bus::new();
    let (Some(node_port), Some(mut brain)) = (bus.port(), client(&bus, config.client)) else {
        error!("bus has no free ports");
        return ExitCode::FAILURE;
    };
    let drivetrain = DrivetrainThread::spawn(node_port, config.drivetrain);

    match brain.request_update() {
        Ok(_) => brain.log_telemetry(),
        Err(e) => warn!(?e, "initial telemetry failed"),
    }

    let mut status = ExitCode::SUCCESS;
    for payload in &script {
        if let Err(e) = brain.send(payload) {
            error!(?e, ?payload, "send failed");
            brain.release_bus();
            status = ExitCode::FAILURE;
            break;
        }
        if let Err(e) = brain.wait_until_idle() {
            error!(?e, ?payload, "drivetrain did not finish");
            status = ExitCode::FAILURE;
            break;
        }
        info!(?payload, speeds = ?brain.wheel_speeds(), "done");
    }

    let safe = drivetrain.harness.is_safe();
    match drivetrain.join() {
        Ok(telemetry) => info!(?telemetry, safe, "drivetrain stopped"),
        Err(_) => {
            error!("drivetrain thread panicked");
            status = ExitCode::FAILURE;
        }
    }
    status
}
