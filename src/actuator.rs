//! Vibration motor pair driven by the stress level

use anyhow::anyhow;
use embedded_hal::digital::{OutputPin, PinState};

use crate::stress::StressLevel;

/// Motor states `(first, second)` for a stress level.
pub fn motor_pattern(level: StressLevel) -> (bool, bool) {
    match level {
        StressLevel::VeryHigh => (true, true),
        StressLevel::High => (true, false),
        _ => (false, false),
    }
}

pub struct StressMotors<A, B> {
    first: A,
    second: B,
    applied: Option<(bool, bool)>,
}

impl<A, B> StressMotors<A, B>
where
    A: OutputPin,
    B: OutputPin,
{
    pub fn new(first: A, second: B) -> Self {
        StressMotors {
            first,
            second,
            applied: None,
        }
    }

    /// Drive both outputs for `level`. Pins are written every call.
    pub fn apply(&mut self, level: StressLevel) -> anyhow::Result<()> {
        let pattern = motor_pattern(level);

        self.first
            .set_state(PinState::from(pattern.0))
            .map_err(|_| anyhow!("Failed to drive first motor"))?;
        self.second
            .set_state(PinState::from(pattern.1))
            .map_err(|_| anyhow!("Failed to drive second motor"))?;

        if self.applied != Some(pattern) {
            log::info!("Motors {:?} for stress {}", pattern, level);
            self.applied = Some(pattern);
        }
        Ok(())
    }

    /// Last pattern written, `None` before the first `apply`.
    pub fn applied(&self) -> Option<(bool, bool)> {
        self.applied
    }

    pub fn release(self) -> (A, B) {
        (self.first, self.second)
    }
}
