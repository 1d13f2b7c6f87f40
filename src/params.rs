// Parameter transform layer: normalized 0..1 controls -> physical units

use serde::{Deserialize, Serialize};

/// Resolution of the response lookup: controls are quantized to 4001 steps.
const TABLE_STEPS: f64 = 4000.0;

/// Exponential response curves used to map a normalized control onto [0, 1].
///
/// Each curve is `(b^x - 1) / (b - 1)`, sampled on a 4001-point grid so
/// that a given slider position always lands on the same breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCurve {
    /// 2 octaves (b = 4)
    TwoOct,
    /// 3 octaves (b = 8)
    ThreeOct,
    /// 4 octaves (b = 16)
    FourOct,
    /// 2 decades (b = 100)
    TwoDec,
    /// 3 decades (b = 1000)
    ThreeDec,
}

impl ResponseCurve {
    fn base(self) -> f64 {
        match self {
            ResponseCurve::TwoOct => 4.0,
            ResponseCurve::ThreeOct => 8.0,
            ResponseCurve::FourOct => 16.0,
            ResponseCurve::TwoDec => 100.0,
            ResponseCurve::ThreeDec => 1000.0,
        }
    }

    /// Look up the curve at normalized position `value` (clamped to 0..1).
    pub fn get(self, value: f64) -> f64 {
        let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let idx = (v * (TABLE_STEPS + 0.999)).floor();
        let x = idx / TABLE_STEPS;
        let b = self.base();
        (b.powf(x) - 1.0) / (b - 1.0)
    }
}

/// How a gain edit is allowed to act on the spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyMode {
    /// Only attenuate (resulting linear gain <= 1)
    Reduce,
    /// Boost and cut
    Bipolar,
    /// Only boost (resulting linear gain >= 1)
    Amplify,
}

impl ApplyMode {
    /// Three-way split of a normalized selector.
    pub fn from_normalized(value: f64) -> Self {
        if value < 0.33 {
            ApplyMode::Reduce
        } else if value < 0.66 {
            ApplyMode::Bipolar
        } else {
            ApplyMode::Amplify
        }
    }

    /// Clamp a linear gain according to the mode.
    pub fn clamp_gain(self, gain: f64) -> f64 {
        match self {
            ApplyMode::Reduce => gain.min(1.0),
            ApplyMode::Bipolar => gain,
            ApplyMode::Amplify => gain.max(1.0),
        }
    }
}

/// Tail envelope applied at the end of an output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMethod {
    Truncate,
    Linear,
    Logarithmic,
    Cosine,
}

impl WindowMethod {
    pub fn from_normalized(value: f64) -> Self {
        if value < 0.25 {
            WindowMethod::Truncate
        } else if value < 0.5 {
            WindowMethod::Linear
        } else if value < 0.75 {
            WindowMethod::Logarithmic
        } else {
            WindowMethod::Cosine
        }
    }
}

pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

pub fn gain_to_db(gain: f64) -> f64 {
    20.0 * gain.log10()
}

/// Evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..count)
            .map(|i| start + (end - start) * i as f64 / (count - 1) as f64)
            .collect(),
    }
}
