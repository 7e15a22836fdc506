//! Analog pulse sensor seam

use crate::clock::Clock;
use crate::config::SENSOR_MAX;

/// Anything that yields one raw pulse reading in `0..=1023` per call.
pub trait PulseSource {
    fn read(&mut self) -> anyhow::Result<u16>;
}

const PULSE_WIDTH_MS: u64 = 60;
const BASELINE: u16 = 380;
const PEAK: u16 = 820;

/// Clock-driven fake sensor producing a pulse train with a repeating
/// sequence of beat-to-beat intervals.
pub struct SyntheticPulse<'a, C: Clock> {
    clock: &'a C,
    intervals_ms: &'a [u64],
    idx: usize,
    next_beat_ms: u64,
}

impl<'a, C: Clock> SyntheticPulse<'a, C> {
    /// `intervals_ms` must not be empty.
    pub fn new(clock: &'a C, intervals_ms: &'a [u64]) -> Self {
        let first = intervals_ms.first().copied().unwrap_or(1000);
        SyntheticPulse {
            clock,
            intervals_ms,
            idx: 0,
            next_beat_ms: clock.now_ms() + first,
        }
    }

    /// Switch rhythm; takes effect from the beat after the upcoming one.
    pub fn set_intervals(&mut self, intervals_ms: &'a [u64]) {
        self.intervals_ms = intervals_ms;
        self.idx = 0;
    }

    fn advance(&mut self) {
        if self.intervals_ms.is_empty() {
            self.next_beat_ms += 1000;
            return;
        }
        self.idx = (self.idx + 1) % self.intervals_ms.len();
        self.next_beat_ms += self.intervals_ms[self.idx];
    }
}

impl<C: Clock> PulseSource for SyntheticPulse<'_, C> {
    fn read(&mut self) -> anyhow::Result<u16> {
        let now = self.clock.now_ms();
        while now >= self.next_beat_ms + PULSE_WIDTH_MS {
            self.advance();
        }

        let value = if now >= self.next_beat_ms {
            PEAK
        } else {
            // small ripple so the trace never looks flat between beats
            BASELINE + (now % 9) as u16 * 12
        };
        Ok(value.min(SENSOR_MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;

    #[test]
    fn peaks_on_schedule() {
        let clock = SimClock::new(0);
        let mut sensor = SyntheticPulse::new(&clock, &[700, 900]);

        clock.advance(699);
        assert!(sensor.read().unwrap() < 560);
        clock.advance(1);
        assert_eq!(sensor.read().unwrap(), PEAK);

        clock.advance(900);
        assert_eq!(sensor.read().unwrap(), PEAK);
        clock.advance(PULSE_WIDTH_MS);
        assert!(sensor.read().unwrap() < 560);

        clock.advance(700 - PULSE_WIDTH_MS);
        assert_eq!(sensor.read().unwrap(), PEAK);
    }

    #[test]
    fn rhythm_switch() {
        let clock = SimClock::new(0);
        let mut sensor = SyntheticPulse::new(&clock, &[1000]);
        sensor.set_intervals(&[500, 700]);

        clock.advance(1000);
        assert_eq!(sensor.read().unwrap(), PEAK);
        clock.advance(700);
        assert_eq!(sensor.read().unwrap(), PEAK);
    }

    #[test]
    fn catches_up_after_long_gap() {
        let clock = SimClock::new(0);
        let mut sensor = SyntheticPulse::new(&clock, &[1000]);

        clock.advance(5_010);
        assert_eq!(sensor.read().unwrap(), PEAK);
    }
}
