//! Threshold beat detector with a refractory window

use crate::config::MonitorConfig;

pub struct PulseDetector {
    upper_threshold: u16,
    refractory_ms: u64,
    last_beat_ms: u64,
    beats_in_window: u32,
}

impl PulseDetector {
    pub fn new(config: &MonitorConfig) -> Self {
        PulseDetector {
            upper_threshold: config.upper_threshold,
            refractory_ms: config.refractory_ms,
            last_beat_ms: 0,
            beats_in_window: 0,
        }
    }

    /// Feed one raw sample taken at `now_ms`.
    ///
    /// Returns the NN interval when a beat is accepted. The first beat is
    /// measured from time zero, so its interval is the whole uptime so far.
    pub fn update(&mut self, sample: u16, now_ms: u64) -> Option<u32> {
        let since_last = now_ms.saturating_sub(self.last_beat_ms);
        if sample <= self.upper_threshold || since_last <= self.refractory_ms {
            return None;
        }

        self.last_beat_ms = now_ms;
        self.beats_in_window += 1;
        log::debug!("Beat at {} ms, NN {} ms", now_ms, since_last);

        Some(since_last.min(u64::from(u32::MAX)) as u32)
    }

    pub fn last_beat_ms(&self) -> u64 {
        self.last_beat_ms
    }

    pub fn beats_in_window(&self) -> u32 {
        self.beats_in_window
    }

    /// Hand over the beat count of the closing window and start a new one.
    pub fn take_beats(&mut self) -> u32 {
        core::mem::take(&mut self.beats_in_window)
    }
}
