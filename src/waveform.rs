//! Scrolling trace of rescaled sensor samples

use crate::circ::{Circ, CircIter};
use crate::config::{SENSOR_MAX, WAVEFORM_LEN, WAVEFORM_MAX};

/// Linear map of a raw reading in `0..=1023` onto `0..=20`.
///
/// Readings above the sensor range are clamped first.
pub fn rescale(raw: u16) -> u8 {
    let raw = u32::from(raw.min(SENSOR_MAX));
    (raw * u32::from(WAVEFORM_MAX) / u32::from(SENSOR_MAX)) as u8
}

#[derive(Clone, Debug)]
pub struct WaveformBuffer {
    samples: Circ<u8, WAVEFORM_LEN>,
}

impl WaveformBuffer {
    pub fn new() -> Self {
        WaveformBuffer {
            samples: Circ::new(0),
        }
    }

    /// Rescale `raw` and store it over the oldest slot.
    pub fn push_raw(&mut self, raw: u16) {
        self.samples.push(rescale(raw));
    }

    /// Slot order, as the flatline scan walks it.
    pub fn slots(&self) -> &[u8] {
        self.samples.as_slice()
    }

    /// Oldest-first, as the trace is drawn.
    pub fn iter(&self) -> CircIter<u8, WAVEFORM_LEN> {
        self.samples.iter()
    }
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self::new()
    }
}
