use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_COOLDOWN_MS, DEFAULT_DWELL_THRESHOLD_MS, DEFAULT_TICK_PERIOD_MS,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("tick period must be greater than zero")]
    ZeroTickPeriod,
    #[error("dwell threshold must be greater than zero")]
    ZeroThreshold,
}

/// Timing rules for the dwell gate, all in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DwellPolicy {
    tick_period_ms: u64,
    threshold_ms: u64,
    cooldown_ms: u64,
}

impl DwellPolicy {
    /// A `cooldown_ms` of 0 disables the post-capture cooldown.
    pub fn new(tick_period_ms: u64, threshold_ms: u64, cooldown_ms: u64) -> Result<Self, PolicyError> {
        if tick_period_ms == 0 {
            return Err(PolicyError::ZeroTickPeriod);
        }
        if threshold_ms == 0 {
            return Err(PolicyError::ZeroThreshold);
        }
        Ok(Self {
            tick_period_ms,
            threshold_ms,
            cooldown_ms,
        })
    }

    /// Long-dwell variant: 10 s in the oval, 500 ms cooldown.
    pub fn extended() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            threshold_ms: 10_000,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }

    pub fn tick_period_ms(&self) -> u64 {
        self.tick_period_ms
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    pub fn has_cooldown(&self) -> bool {
        self.cooldown_ms > 0
    }

    /// Qualifying ticks needed before a capture fires.
    pub fn ticks_to_capture(&self) -> u64 {
        self.threshold_ms.div_ceil(self.tick_period_ms)
    }
}

impl Default for DwellPolicy {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            threshold_ms: DEFAULT_DWELL_THRESHOLD_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}
