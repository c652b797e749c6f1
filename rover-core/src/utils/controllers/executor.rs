//! Current-command state machine.
//!
//! The executor is either idle or running one command. Every tick it re-applies the running
//! command's targets, steps the drivetrain, and checks completion. When nothing is running it
//! pulls the next queued command whose issue tick differs from the one that just ran; a pulled
//! command starts on the following tick.

use tracing::{debug, info};

use super::drivetrain::Drivetrain;
use crate::utils::{
    protocol::{Command, CommandId, CommandQueue, Payload},
    time::Instant,
};

#[derive(Debug, Default)]
pub struct Executor {
    current: Option<Command>,
    last_issued: Option<Instant>,
}

impl Executor {
    pub const fn new() -> Self {
        Self {
            current: None,
            last_issued: None,
        }
    }

    pub fn current(&self) -> Option<&Command> {
        self.current.as_ref()
    }

    /// Id reported in telemetry.
    pub fn current_id(&self) -> CommandId {
        self.current.map_or(CommandId::None, |command| command.id())
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Run one control tick; returns the id of a command completed on this tick.
    pub fn tick<const N: usize>(
        &mut self,
        now: Instant,
        queue: &mut CommandQueue<N>,
        drivetrain: &mut Drivetrain,
    ) -> Option<CommandId> {
        if let Some(command) = self.current {
            apply(&command.payload, drivetrain);
        }
        drivetrain.update(now);

        let mut completed = None;
        if let Some(command) = self.current {
            if is_complete(&command.payload, drivetrain) {
                info!(id = ?command.id(), "command complete");
                completed = Some(command.id());
                self.current = None;
            }
        }

        if self.current.is_none() {
            self.current = self.next_new(queue);
            if let Some(command) = self.current {
                info!(id = ?command.id(), issued_at = command.issued_at.ticks(), "command started");
                self.last_issued = Some(command.issued_at);
            }
        }
        completed
    }

    fn next_new<const N: usize>(&mut self, queue: &mut CommandQueue<N>) -> Option<Command> {
        while let Some(command) = queue.dequeue() {
            if Some(command.issued_at) == self.last_issued {
                debug!(issued_at = command.issued_at.ticks(), "dropping duplicate command");
                continue;
            }
            return Some(command);
        }
        None
    }
}

fn apply(payload: &Payload, drivetrain: &mut Drivetrain) {
    match *payload {
        Payload::Drive { direction } => drivetrain.drive(direction),
        Payload::Stop => drivetrain.stop(),
        Payload::SetVelocity { left, right } => drivetrain.set_velocity(left, right),
        Payload::SetTurnVelocity { velocity } => drivetrain.set_turn_velocity(velocity),
        // no heading or odometry sensing
        Payload::Turn { .. } | Payload::Move { .. } => {}
    }
}

fn is_complete(payload: &Payload, drivetrain: &Drivetrain) -> bool {
    match payload {
        Payload::Drive { .. } | Payload::Stop | Payload::SetVelocity { .. } => {
            drivetrain.at_target()
        }
        Payload::Turn { .. } | Payload::Move { .. } | Payload::SetTurnVelocity { .. } => true,
    }
}
