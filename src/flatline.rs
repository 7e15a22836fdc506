//! Disconnected or saturated sensor detection

use crate::waveform::WaveformBuffer;

pub struct FlatlineGuard {
    tolerance: u8,
}

impl FlatlineGuard {
    pub fn new(tolerance: u8) -> Self {
        FlatlineGuard { tolerance }
    }

    /// True when no two neighbouring slots differ by more than the tolerance.
    ///
    /// The whole buffer is scanned in slot order, including slots that have
    /// not been written since power-up.
    pub fn is_flat(&self, waveform: &WaveformBuffer) -> bool {
        waveform
            .slots()
            .windows(2)
            .all(|w| w[0].abs_diff(w[1]) <= self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WAVEFORM_LEN;

    #[test]
    fn empty_buffer_is_flat() {
        let guard = FlatlineGuard::new(1);
        assert!(guard.is_flat(&WaveformBuffer::new()));
    }

    #[test]
    fn constant_signal_is_flat() {
        let guard = FlatlineGuard::new(1);
        let mut w = WaveformBuffer::new();
        for _ in 0..WAVEFORM_LEN {
            w.push_raw(600);
        }
        assert!(guard.is_flat(&w));
    }

    #[test]
    fn slow_ramp_is_flat() {
        let guard = FlatlineGuard::new(1);
        let mut w = WaveformBuffer::new();
        // one display step every few samples, then back down
        for i in 0..WAVEFORM_LEN as u16 {
            let step = if i < 64 { i / 4 } else { (127 - i) / 4 };
            w.push_raw(step * 52);
        }
        assert!(guard.is_flat(&w));
    }

    #[test]
    fn single_jump_is_not_flat() {
        let guard = FlatlineGuard::new(1);
        let mut w = WaveformBuffer::new();
        for i in 0..WAVEFORM_LEN {
            w.push_raw(if i == 70 { 300 } else { 0 });
        }
        assert!(!guard.is_flat(&w));
    }
}
