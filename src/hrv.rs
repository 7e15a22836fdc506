//! NN interval history and the SDNN/RMSSD statistics computed over it.

use crate::circ::Circ;
use crate::config::INTERVAL_HISTORY_LEN;

/// RMSSD is kept to three digits.
const RMSSD_MODULUS: u32 = 1000;

/// Ring of NN intervals in milliseconds.
///
/// Statistics only cover slots `0..count()`. `count` advances with every
/// interval and drops back to zero whenever the ring wraps, so it always
/// equals the write index: after a wrap older intervals fall out of the
/// statistics even though they are still stored.
pub struct IntervalHistory {
    intervals: Circ<u32, INTERVAL_HISTORY_LEN>,
    count: usize,
}

impl IntervalHistory {
    pub fn new() -> Self {
        IntervalHistory {
            intervals: Circ::new(0),
            count: 0,
        }
    }

    pub fn record(&mut self, nn_ms: u32) {
        self.intervals.push(nn_ms);
        self.count += 1;
        if self.count >= INTERVAL_HISTORY_LEN {
            self.count = 0;
        }
    }

    /// Number of intervals the statistics run over.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Intervals recorded since power-up.
    pub fn total_recorded(&self) -> u32 {
        self.intervals.written()
    }

    /// The slice statistics are computed over.
    pub fn window(&self) -> &[u32] {
        &self.intervals.as_slice()[..self.count]
    }
}

impl Default for IntervalHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HrvMetrics {
    /// Sample standard deviation of the NN intervals, ms.
    pub sdnn: f32,
    /// Root mean square of successive differences, truncated and reduced mod 1000.
    pub rmssd: u16,
}

/// SDNN and RMSSD over [`IntervalHistory::window`].
///
/// Both are zero until at least two intervals have been recorded, and again
/// right after a wrap while fewer than two intervals sit below the write index.
pub fn compute_hrv(history: &IntervalHistory) -> HrvMetrics {
    if history.total_recorded() < 2 {
        return HrvMetrics::default();
    }

    let window = history.window();
    if window.len() < 2 {
        log::debug!("HRV window holds {} interval(s) after wrap", window.len());
        return HrvMetrics::default();
    }

    let n = window.len() as f32;
    let mean = window.iter().map(|&x| x as f32).sum::<f32>() / n;

    let sq_dev: f32 = window
        .iter()
        .map(|&x| {
            let d = x as f32 - mean;
            d * d
        })
        .sum();
    let sdnn = (sq_dev / (n - 1.0)).sqrt();

    let sq_succ: f32 = window
        .windows(2)
        .map(|w| {
            let d = w[1] as f32 - w[0] as f32;
            d * d
        })
        .sum();
    let rmssd = (sq_succ / (n - 1.0)).sqrt() as u32 % RMSSD_MODULUS;

    HrvMetrics {
        sdnn,
        rmssd: rmssd as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(intervals: &[u32]) -> IntervalHistory {
        let mut h = IntervalHistory::new();
        for &nn in intervals {
            h.record(nn);
        }
        h
    }

    #[test]
    fn too_few_intervals() {
        assert_eq!(compute_hrv(&history_of(&[])), HrvMetrics::default());
        assert_eq!(compute_hrv(&history_of(&[812])), HrvMetrics::default());
    }

    #[test]
    fn steady_rhythm_has_no_variability() {
        let m = compute_hrv(&history_of(&[800, 800, 800]));
        assert_eq!(m.sdnn, 0.0);
        assert_eq!(m.rmssd, 0);
    }

    #[test]
    fn two_intervals() {
        let m = compute_hrv(&history_of(&[700, 900]));
        assert!((m.sdnn - 141.421_36).abs() < 0.01);
        assert_eq!(m.rmssd, 200);
    }

    #[test]
    fn rmssd_wraps_at_thousand() {
        // successive difference 1500 -> rmssd 1500 -> 500
        let m = compute_hrv(&history_of(&[1000, 2500]));
        assert_eq!(m.rmssd, 500);
    }

    #[test]
    fn rmssd_is_truncated() {
        // diffs 100, 101 -> sqrt((10000 + 10201) / 2) = 100.50..
        let m = compute_hrv(&history_of(&[700, 800, 901]));
        assert_eq!(m.rmssd, 100);
    }

    #[test]
    fn wrap_narrows_statistics() {
        let mut h = IntervalHistory::new();
        for _ in 0..128 {
            h.record(800);
        }
        h.record(700);
        h.record(900);

        assert_eq!(h.total_recorded(), 130);
        assert_eq!(h.count(), 2);
        assert_eq!(h.window(), &[700, 900]);

        // Only beats 129 and 130 are seen, the 126 steady ones are ignored.
        let m = compute_hrv(&h);
        assert!((m.sdnn - 141.421_36).abs() < 0.01);
        assert_eq!(m.rmssd, 200);
    }

    #[test]
    fn count_follows_write_index_across_wrap() {
        let mut h = IntervalHistory::new();
        for i in 0..300u32 {
            h.record(600 + i);
            assert_eq!(h.count(), h.intervals.write_index());
            assert_eq!(h.count(), (i as usize + 1) % INTERVAL_HISTORY_LEN);
        }

        assert_eq!(h.total_recorded(), 300);
        // 300 = 2 * 128 + 44
        assert_eq!(h.window().len(), 44);
        assert_eq!(h.window()[0], 600 + 256);
    }

    #[test]
    fn single_interval_after_wrap() {
        let mut h = IntervalHistory::new();
        for i in 0..129 {
            h.record(700 + i);
        }

        assert_eq!(h.count(), 1);
        assert_eq!(compute_hrv(&h), HrvMetrics::default());
    }
}
