//! Device constants and the tunables grouped into [`MonitorConfig`].

/// Number of rescaled samples kept for the trace and the flatline check.
pub const WAVEFORM_LEN: usize = 128;
/// Number of NN intervals kept for HRV.
pub const INTERVAL_HISTORY_LEN: usize = 128;

/// Largest value the analog front end reports.
pub const SENSOR_MAX: u16 = 1023;
/// Top of the display range samples are rescaled into.
pub const WAVEFORM_MAX: u8 = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Raw sample value a beat has to exceed.
    pub upper_threshold: u16,
    /// Minimum spacing between accepted beats, ms.
    pub refractory_ms: u64,
    /// BPM/HRV evaluation window, ms.
    pub window_ms: u64,
    /// Multiplier applied to BPM after a window without beats.
    pub decay_rate: f64,
    /// Telemetry record period, ms.
    pub telemetry_interval_ms: u64,
    /// Largest adjacent-sample step still considered flat.
    pub flatline_tolerance: u8,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            upper_threshold: 560,
            refractory_ms: 600,
            window_ms: 10_000,
            decay_rate: 0.9,
            telemetry_interval_ms: 5_000,
            flatline_tolerance: 1,
        }
    }
}
