//! Tick-based time keeping.
//!
//! - `clock`: monotonic tick counter shared with the timer overflow interrupt
//! - `timer`: stopwatch and busy-wait built on any `Monotonic` source

pub mod clock;
pub mod timer;

pub use clock::{Clock, Monotonic, TickSource};
pub use timer::Timer;

use core::ops::{Add, Sub};

/// Timer ticks per second (16 MHz core clock, /8 prescaler).
pub const TICKS_PER_SECOND: u64 = 2_000_000;

/// A point on the tick timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant(u64);

/// A span of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(u64);

impl Instant {
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Ticks elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Instant) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    pub fn as_secs_f32(self) -> f32 {
        Duration(self.0).as_secs_f32()
    }
}

impl Duration {
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros * TICKS_PER_SECOND / 1_000_000)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * TICKS_PER_SECOND / 1_000)
    }

    pub fn from_secs_f32(seconds: f32) -> Self {
        Self(libm::roundf(libm::fabsf(seconds) * TICKS_PER_SECOND as f32) as u64)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    pub fn as_micros_f32(self) -> f32 {
        self.0 as f32 * 1_000_000.0 / TICKS_PER_SECOND as f32
    }

    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / TICKS_PER_SECOND as f32
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs.0)
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.saturating_since(rhs)
    }
}
