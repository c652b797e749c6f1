//! Host simulation of the robot's command bus.
//!
//! Runs the drivetrain node and the brain client on separate threads over an in-process wire,
//! with the node's control loop clocked from the host's monotonic clock.

pub mod clock;
pub mod pins;
pub mod wire;

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use rover_core::utils::{
    time::Clock, ClientConfig, DrivetrainClient, DrivetrainConfig, DrivetrainNode, Payload,
    Telemetry, Timer,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use clock::HostTimer;
pub use pins::{Harness, SimPin};
pub use wire::{Bus, SimTwi};

/// Contents of the JSON configuration file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub drivetrain: DrivetrainConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid command script {path}: {source}")]
    Script {
        path: String,
        source: serde_json::Error,
    },
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Load a JSON array of commands, e.g. `[{"cmd":"drive","direction":"forward"}]`.
pub fn load_script(path: &Path) -> Result<Vec<Payload>, ConfigError> {
    let text = read(path)?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Script {
        path: path.display().to_string(),
        source,
    })
}

/// A drivetrain node running on its own thread until stopped.
pub struct DrivetrainThread {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Telemetry>,
    pub harness: Harness,
}

impl DrivetrainThread {
    pub fn spawn(regs: SimTwi, config: DrivetrainConfig) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let harness = Harness::new();
        let motors = harness.motors();
        let flag = stop.clone();
        let handle = thread::spawn(move || {
            let clock = Clock::new(HostTimer::new());
            let mut node: DrivetrainNode<'_, _, _, _> =
                DrivetrainNode::new(regs, &clock, motors, config);
            node.init();
            let period = config.loop_period();
            let mut timer = Timer::new(&clock);
            while !flag.load(Ordering::Relaxed) {
                node.tick();
                timer.spin_wait(period);
            }
            node.telemetry()
        });
        Self {
            stop,
            handle,
            harness,
        }
    }

    /// Stop the loop and return the node's final telemetry.
    pub fn join(self) -> thread::Result<Telemetry> {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.join()
    }
}

/// Enabled brain-side client on a fresh port of `bus`.
pub fn client(bus: &Bus, config: ClientConfig) -> Option<DrivetrainClient<SimTwi>> {
    let mut client = DrivetrainClient::new(bus.port()?, config);
    client.enable();
    info!(address = config.address, "brain client ready");
    Some(client)
}
