//! Binary snapshot frames for the remote trace viewer

use serde::Serialize;

use crate::config::WAVEFORM_LEN;
use crate::monitor::Monitor;
use crate::stress::StressLevel;

#[derive(Debug, Serialize)]
pub struct TraceFrame<'a> {
    pub uptime_ms: u64,
    pub bpm: u32,
    pub stress: StressLevel,
    pub sdnn: f32,
    pub rmssd: u16,
    /// Rescaled samples, oldest first.
    pub waveform: &'a [u8],
}

impl TraceFrame<'_> {
    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

/// Snapshot `monitor` and encode it in one go.
pub fn encode_snapshot(monitor: &Monitor, uptime_ms: u64) -> anyhow::Result<Vec<u8>> {
    let samples: heapless::Vec<u8, WAVEFORM_LEN> = monitor.waveform().iter().collect();
    let hrv = monitor.hrv();

    TraceFrame {
        uptime_ms,
        bpm: monitor.bpm(),
        stress: monitor.stress(),
        sdnn: hrv.sdnn,
        rmssd: hrv.rmssd,
        waveform: &samples,
    }
    .encode()
}
