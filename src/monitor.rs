//! Per-cycle pipeline: sample in, BPM/HRV/stress out every evaluation window.

use crate::bpm::BpmEstimator;
use crate::config::MonitorConfig;
use crate::flatline::FlatlineGuard;
use crate::hrv::{compute_hrv, HrvMetrics, IntervalHistory};
use crate::pulse::PulseDetector;
use crate::stress::{classify, StressLevel};
use crate::waveform::WaveformBuffer;

/// Result of closing one evaluation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub bpm: u32,
    pub hrv: HrvMetrics,
    pub stress: StressLevel,
    /// The waveform was flat and `bpm`/`stress` were overridden.
    pub flatline: bool,
}

/// All state of the monitor, owned by the control loop.
pub struct Monitor {
    config: MonitorConfig,
    waveform: WaveformBuffer,
    detector: PulseDetector,
    history: IntervalHistory,
    estimator: BpmEstimator,
    guard: FlatlineGuard,
    hrv: HrvMetrics,
    stress: StressLevel,
    window_start_ms: u64,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Monitor {
            waveform: WaveformBuffer::new(),
            detector: PulseDetector::new(&config),
            history: IntervalHistory::new(),
            estimator: BpmEstimator::new(&config),
            guard: FlatlineGuard::new(config.flatline_tolerance),
            hrv: HrvMetrics::default(),
            stress: StressLevel::None,
            window_start_ms: 0,
            config,
        }
    }

    /// Feed the raw reading taken at `now_ms`.
    ///
    /// Returns `Some` on the cycle that closes an evaluation window.
    pub fn process(&mut self, raw: u16, now_ms: u64) -> Option<Evaluation> {
        self.waveform.push_raw(raw);
        if let Some(nn) = self.detector.update(raw, now_ms) {
            self.history.record(nn);
        }

        if now_ms.saturating_sub(self.window_start_ms) < self.config.window_ms {
            return None;
        }
        self.window_start_ms = now_ms;

        Some(self.evaluate())
    }

    fn evaluate(&mut self) -> Evaluation {
        let beats = self.detector.take_beats();
        let bpm = self.estimator.close_window(beats);
        self.hrv = compute_hrv(&self.history);
        self.stress = classify(bpm, &self.hrv);

        let flatline = self.guard.is_flat(&self.waveform);
        if flatline {
            if bpm > 0 || self.stress != StressLevel::None {
                log::warn!(
                    "Flat signal, discarding BPM {} and stress {}",
                    bpm,
                    self.stress
                );
            }
            self.estimator.force_zero();
            self.stress = StressLevel::None;
        }

        let eval = Evaluation {
            bpm: self.estimator.bpm(),
            hrv: self.hrv,
            stress: self.stress,
            flatline,
        };
        log::info!(
            "Window closed: {} beats, BPM {}, SDNN {:.1}, RMSSD {}, stress {}",
            beats,
            eval.bpm,
            eval.hrv.sdnn,
            eval.hrv.rmssd,
            eval.stress
        );
        eval
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn bpm(&self) -> u32 {
        self.estimator.bpm()
    }

    pub fn stress(&self) -> StressLevel {
        self.stress
    }

    pub fn hrv(&self) -> HrvMetrics {
        self.hrv
    }

    pub fn waveform(&self) -> &WaveformBuffer {
        &self.waveform
    }

    pub fn history(&self) -> &IntervalHistory {
        &self.history
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_MS: u64 = 10;

    /// Square pulses of `high` lasting 50 ms every `period_ms` over a `low` baseline.
    fn square(t: u64, period_ms: u64, low: u16, high: u16) -> u16 {
        if t % period_ms < 50 {
            high
        } else {
            low
        }
    }

    /// Run from `from` up to and including `to`, returning the last evaluation.
    fn run(
        m: &mut Monitor,
        from: u64,
        to: u64,
        signal: impl Fn(u64) -> u16,
    ) -> Option<Evaluation> {
        let mut last = None;
        let mut t = from;
        while t <= to {
            if let Some(e) = m.process(signal(t), t) {
                last = Some(e);
            }
            t += STEP_MS;
        }
        last
    }

    #[test]
    fn nothing_before_first_window() {
        let mut m = Monitor::default();
        assert_eq!(run(&mut m, 0, 9_990, |t| square(t, 800, 100, 900)), None);
        assert_eq!(m.history().count(), 12);
    }

    #[test]
    fn steady_rhythm_is_low_stress() {
        let mut m = Monitor::default();
        let e = run(&mut m, 0, 10_000, |t| square(t, 800, 100, 900)).unwrap();

        assert_eq!(e.bpm, 72);
        assert_eq!(e.hrv, HrvMetrics::default());
        assert_eq!(e.stress, StressLevel::Low);
        assert!(!e.flatline);
    }

    #[test]
    fn fast_rigid_rhythm_is_very_high() {
        let mut m = Monitor::default();
        let e = run(&mut m, 0, 10_000, |t| square(t, 610, 100, 900)).unwrap();

        assert_eq!(e.bpm, 96);
        assert_eq!(e.stress, StressLevel::VeryHigh);
        assert_eq!(m.stress(), StressLevel::VeryHigh);
    }

    #[test]
    fn flat_trace_overrides_classification() {
        // 520 and 600 both land on display step 10/11, yet 600 is a beat
        let mut m = Monitor::default();
        let e = run(&mut m, 0, 10_000, |t| square(t, 610, 520, 600)).unwrap();

        assert!(e.flatline);
        assert_eq!(e.bpm, 0);
        assert_eq!(e.stress, StressLevel::None);
        assert_eq!(m.bpm(), 0);
        assert_eq!(m.history().count(), 16);
    }

    #[test]
    fn silence_decays_then_flatlines() {
        let mut m = Monitor::default();
        run(&mut m, 0, 10_000, |t| square(t, 800, 100, 900));

        // Noisy but beatless signal: decays without flatline
        let e = run(&mut m, 10_010, 20_000, |t| if t % 20 == 0 { 100 } else { 300 }).unwrap();
        assert!(!e.flatline);
        assert_eq!(e.bpm, 64);
        assert_eq!(e.stress, StressLevel::Low);

        // Disconnected sensor
        let e = run(&mut m, 20_010, 30_000, |_| 0).unwrap();
        assert!(e.flatline);
        assert_eq!((e.bpm, e.stress), (0, StressLevel::None));
    }

    #[test]
    fn first_beat_is_measured_from_power_up() {
        let mut m = Monitor::default();
        run(&mut m, 0, 3_000, |t| if t == 3_000 { 800 } else { 0 });
        assert_eq!(m.history().window(), &[3_000]);
    }

    #[test]
    fn window_restarts_at_evaluation_time() {
        let mut m = Monitor::default();
        assert!(m.process(0, 10_005).is_some());
        assert!(m.process(0, 20_004).is_none());
        assert!(m.process(0, 20_005).is_some());
    }
}
