//! Monotonic tick clock.
//!
//! A 16-bit hardware timer overflows into a software counter incremented by the overflow
//! interrupt. `Clock::now` is the only place the counter is read from main-line code; it runs
//! inside one critical section and folds in an overflow the interrupt has not served yet.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use super::Instant;

/// Anything that can tell the current tick.
pub trait Monotonic {
    fn now(&self) -> Instant;
}

/// The free-running 16-bit hardware counter behind a `Clock`.
pub trait TickSource {
    /// Current counter value.
    fn count(&self) -> u16;
    /// True when the counter wrapped and the overflow flag is still set.
    fn overflow_pending(&self) -> bool;
    /// Acknowledge one overflow (clears the hardware flag).
    fn clear_overflow(&self);
}

/// Process-wide tick clock.
///
/// Intended to live in a `static` and be shared by reference; the overflow interrupt calls
/// [`Clock::on_overflow`].
pub struct Clock<T> {
    timer: T,
    overflows: Mutex<CriticalSectionRawMutex, Cell<u64>>,
}

impl<T: TickSource> Clock<T> {
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            overflows: Mutex::new(Cell::new(0)),
        }
    }

    /// Overflow interrupt body.
    pub fn on_overflow(&self) {
        self.overflows.lock(|o| o.set(o.get() + 1));
    }

    /// Raw tick count since the timer started.
    pub fn counter(&self) -> u64 {
        self.overflows.lock(|overflows| {
            let mut count = self.timer.count();
            while self.timer.overflow_pending() {
                count = self.timer.count();
                overflows.set(overflows.get() + 1);
                self.timer.clear_overflow();
            }
            (overflows.get() << 16) | u64::from(count)
        })
    }

    pub fn seconds(&self) -> f32 {
        self.now().as_secs_f32()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<T: TickSource> Monotonic for Clock<T> {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.counter())
    }
}

impl<M: Monotonic + ?Sized> Monotonic for &M {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTimer {
        count: Cell<u16>,
        pending: Cell<bool>,
    }

    impl TickSource for FakeTimer {
        fn count(&self) -> u16 {
            self.count.get()
        }
        fn overflow_pending(&self) -> bool {
            self.pending.get()
        }
        fn clear_overflow(&self) {
            self.pending.set(false);
        }
    }

    fn fake(count: u16, pending: bool) -> Clock<FakeTimer> {
        Clock::new(FakeTimer {
            count: Cell::new(count),
            pending: Cell::new(pending),
        })
    }

    #[test]
    fn counter_combines_overflows_and_count() {
        let clock = fake(0x1234, false);
        clock.on_overflow();
        clock.on_overflow();
        assert_eq!(clock.counter(), 0x2_1234);
    }

    #[test]
    fn pending_overflow_is_caught_up_once() {
        let clock = fake(5, true);
        assert_eq!(clock.counter(), 0x1_0005);
        assert!(!clock.timer().overflow_pending());
        assert_eq!(clock.counter(), 0x1_0005);
    }
}
