//! Stress classification over BPM and HRV.

use core::fmt;

use serde::Serialize;

use crate::hrv::HrvMetrics;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum StressLevel {
    #[default]
    None,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl StressLevel {
    /// Label used on the display and in telemetry records.
    pub fn name(self) -> &'static str {
        match self {
            StressLevel::None => "None",
            StressLevel::Low => "Low",
            StressLevel::Moderate => "Moderate",
            StressLevel::High => "High",
            StressLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Acceptable range for one metric within a rule.
#[derive(Clone, Copy, Debug)]
enum Band {
    Below(f32),
    Within(f32, f32),
    Above(f32),
}

impl Band {
    fn contains(self, v: f32) -> bool {
        match self {
            Band::Below(hi) => v < hi,
            Band::Within(lo, hi) => lo <= v && v <= hi,
            Band::Above(lo) => v > lo,
        }
    }
}

struct Rule {
    level: StressLevel,
    bpm_above: u32,
    sdnn: Band,
    rmssd: Band,
}

impl Rule {
    fn matches(&self, bpm: u32, hrv: &HrvMetrics) -> bool {
        bpm > self.bpm_above && self.sdnn.contains(hrv.sdnn) && self.rmssd.contains(hrv.rmssd as f32)
    }
}

/// Checked top to bottom, first match wins.
const RULES: [Rule; 3] = [
    Rule {
        level: StressLevel::VeryHigh,
        bpm_above: 90,
        sdnn: Band::Below(50.0),
        rmssd: Band::Below(30.0),
    },
    Rule {
        level: StressLevel::High,
        bpm_above: 80,
        sdnn: Band::Within(50.0, 100.0),
        rmssd: Band::Within(30.0, 70.0),
    },
    Rule {
        level: StressLevel::Moderate,
        bpm_above: 70,
        sdnn: Band::Above(100.0),
        rmssd: Band::Above(70.0),
    },
];

pub fn classify(bpm: u32, hrv: &HrvMetrics) -> StressLevel {
    if bpm == 0 {
        return StressLevel::None;
    }

    RULES
        .iter()
        .find(|rule| rule.matches(bpm, hrv))
        .map_or(StressLevel::Low, |rule| rule.level)
}
