//! Bounded FIFO of pending commands.
//!
//! Backed by a fixed-capacity ring buffer; nothing is allocated on the control path. A full
//! queue rejects new commands instead of overwriting the oldest.

use heapless::Deque;

use super::command::Command;
use crate::utils::Error;

pub struct CommandQueue<const N: usize> {
    slots: Deque<Command, N>,
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CommandQueue<N> {
    pub const fn new() -> Self {
        Self {
            slots: Deque::new(),
        }
    }

    /// Append `command`; a full queue drops it and returns [`Error::QueueFull`].
    pub fn enqueue(&mut self, command: Command) -> Result<(), Error> {
        self.slots.push_back(command).map_err(|_| Error::QueueFull)
    }

    pub fn dequeue(&mut self) -> Option<Command> {
        self.slots.pop_front()
    }

    pub fn peek(&self) -> Option<&Command> {
        self.slots.front()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
