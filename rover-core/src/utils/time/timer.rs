//! Stopwatch over a `Monotonic` clock.

use super::{Duration, Instant, Monotonic};

pub struct Timer<'c, C: ?Sized> {
    clock: &'c C,
    start: Instant,
    end: Instant,
    running: bool,
}

impl<'c, C: Monotonic + ?Sized> Timer<'c, C> {
    /// Create a running timer started now.
    pub fn new(clock: &'c C) -> Self {
        let start = clock.now();
        Self {
            clock,
            start,
            end: start,
            running: true,
        }
    }

    pub fn elapsed(&self) -> Duration {
        if self.running {
            self.clock.now().saturating_since(self.start)
        } else {
            self.end.saturating_since(self.start)
        }
    }

    pub fn has_elapsed(&self, duration: Duration) -> bool {
        self.elapsed() >= duration
    }

    /// Freeze the elapsed time; no-op when already stopped.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.end = self.clock.now();
        }
    }

    /// Resume from zero; no-op when already running.
    pub fn start(&mut self) {
        if !self.running {
            self.restart();
        }
    }

    pub fn restart(&mut self) {
        self.running = true;
        self.reset();
    }

    /// Zero the elapsed time without changing the running state.
    pub fn reset(&mut self) {
        self.start = self.clock.now();
        self.end = self.start;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Block until `duration` has passed. Restarts the timer.
    pub fn spin_wait(&mut self, duration: Duration) {
        self.restart();
        while !self.has_elapsed(duration) {
            core::hint::spin_loop();
        }
    }
}
