//! Periodic `"<bpm>,<stress>"` records over a serial line

use core::fmt::Write as _;
use std::io::Write;

use anyhow::anyhow;

use crate::stress::StressLevel;

pub type Record = heapless::String<32>;

pub fn format_record(bpm: u32, stress: StressLevel) -> anyhow::Result<Record> {
    let mut record = Record::new();
    write!(record, "{},{}", bpm, stress.name()).map_err(|_| anyhow!("Telemetry record overflow"))?;
    Ok(record)
}

/// Fire-and-forget telemetry: no acknowledgement, no retry.
pub struct TelemetryLink<W> {
    out: W,
    interval_ms: u64,
    last_sent_ms: u64,
}

impl<W: Write> TelemetryLink<W> {
    pub fn new(out: W, interval_ms: u64) -> Self {
        TelemetryLink {
            out,
            interval_ms,
            last_sent_ms: 0,
        }
    }

    /// Emit a record if the interval has elapsed. Returns whether one was sent.
    pub fn poll(&mut self, now_ms: u64, bpm: u32, stress: StressLevel) -> anyhow::Result<bool> {
        if now_ms.saturating_sub(self.last_sent_ms) < self.interval_ms {
            return Ok(false);
        }
        self.last_sent_ms = now_ms;

        let record = format_record(bpm, stress)?;
        writeln!(self.out, "{}", record)?;
        self.out.flush()?;
        Ok(true)
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
