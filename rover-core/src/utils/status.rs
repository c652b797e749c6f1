//! Reset cause, as latched in the MCU status register at boot.

const PORF: u8 = 1 << 0;
const EXTRF: u8 = 1 << 1;
const BORF: u8 = 1 << 2;
const WDRF: u8 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetCause {
    pub power_on: bool,
    pub external: bool,
    pub brownout: bool,
    pub watchdog: bool,
}

impl ResetCause {
    pub const fn from_bits(mcusr: u8) -> Self {
        Self {
            power_on: mcusr & PORF != 0,
            external: mcusr & EXTRF != 0,
            brownout: mcusr & BORF != 0,
            watchdog: mcusr & WDRF != 0,
        }
    }

    /// Brownout or watchdog; the caller decides whether to halt.
    pub const fn is_fault(&self) -> bool {
        self.brownout || self.watchdog
    }
}
