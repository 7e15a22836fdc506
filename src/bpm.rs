//! Beats-per-minute estimate, refreshed once per evaluation window

use crate::config::MonitorConfig;

pub struct BpmEstimator {
    window_ms: u64,
    decay_rate: f64,
    bpm: u32,
}

impl BpmEstimator {
    pub fn new(config: &MonitorConfig) -> Self {
        BpmEstimator {
            window_ms: config.window_ms,
            decay_rate: config.decay_rate,
            bpm: 0,
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Close a window that saw `beats` accepted beats.
    ///
    /// A silent window decays the previous estimate instead of dropping it,
    /// so a few missed beats do not zero the display.
    pub fn close_window(&mut self, beats: u32) -> u32 {
        if beats > 0 {
            let window_s = (self.window_ms / 1000).max(1);
            self.bpm = (u64::from(beats) * 60 / window_s) as u32;
        } else {
            let decayed = f64::from(self.bpm) * self.decay_rate;
            self.bpm = if decayed < 1.0 { 0 } else { decayed as u32 };
        }
        self.bpm
    }

    /// Used by the flatline override.
    pub fn force_zero(&mut self) {
        self.bpm = 0;
    }
}
