//! Output pins that only remember their level.

use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use embedded_hal::digital::{ErrorType, OutputPin};
use rover_core::utils::controllers::{Motor, Wheel};

#[derive(Debug, Clone, Default)]
pub struct SimPin(Arc<AtomicBool>);

impl SimPin {
    pub fn is_high(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Pin pairs of all six wheels, kept for inspection after the motors took their clones.
#[derive(Debug, Clone, Default)]
pub struct Harness {
    pairs: [(SimPin, SimPin); 6],
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn motors(&self) -> [Motor<SimPin>; 6] {
        self.pairs.clone().map(|(a, b)| {
            let Ok(motor) = Motor::new(a, b);
            motor
        })
    }

    pub fn levels(&self, wheel: Wheel) -> (bool, bool) {
        let (a, b) = &self.pairs[wheel.index()];
        (a.is_high(), b.is_high())
    }

    /// No H-bridge has both inputs high.
    pub fn is_safe(&self) -> bool {
        self.pairs.iter().all(|(a, b)| !(a.is_high() && b.is_high()))
    }
}
