//! Host stand-in for the 16-bit hardware tick counter.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant as StdInstant,
};

use rover_core::utils::time::{TickSource, TICKS_PER_SECOND};

/// Wall-clock driven counter with the same 16-bit wrap as the hardware timer.
///
/// There is no overflow interrupt on the host; `Clock` catches up through the pending-overflow
/// path on every read.
#[derive(Debug)]
pub struct HostTimer {
    origin: StdInstant,
    acknowledged: AtomicU64,
}

impl HostTimer {
    pub fn new() -> Self {
        Self {
            origin: StdInstant::now(),
            acknowledged: AtomicU64::new(0),
        }
    }

    fn ticks(&self) -> u64 {
        let nanos = self.origin.elapsed().as_nanos();
        (nanos * u128::from(TICKS_PER_SECOND) / 1_000_000_000) as u64
    }
}

impl Default for HostTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for HostTimer {
    fn count(&self) -> u16 {
        self.ticks() as u16
    }

    fn overflow_pending(&self) -> bool {
        self.ticks() >> 16 > self.acknowledged.load(Ordering::Relaxed)
    }

    fn clear_overflow(&self) {
        self.acknowledged.fetch_add(1, Ordering::Relaxed);
    }
}
