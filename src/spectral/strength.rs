use crate::config::StageParams;

/// Per-bin weight of a stage's edits, 0 outside `[f_min, f_max]` and
/// ramping (linearly in octaves) across the low/high blend zones.
#[derive(Debug, Clone, PartialEq)]
pub struct Strengths {
    pub f_min: usize,
    pub f_max: usize,
    pub f_blend_min: f64,
    pub f_blend_max: f64,
    weights: Vec<f64>,
}

impl Strengths {
    /// Mask for a spectrum of `n` bins at `samplerate`.
    pub fn new(params: &StageParams, n: usize, samplerate: f64) -> Self {
        let half = n / 2;
        let mut weights = vec![0.0; half + 1];

        if params.min_freq_hz >= params.max_freq_hz || half == 0 {
            return Self {
                f_min: 1,
                f_max: 1,
                f_blend_min: 1.0,
                f_blend_max: 1.0,
                weights,
            };
        }

        let nyquist = samplerate / 2.0;
        let to_bin = |hz: f64| ((hz / nyquist * half as f64).round().max(0.0) as usize).clamp(1, half);
        let f_min = to_bin(params.min_freq_hz);
        let f_max = to_bin(params.max_freq_hz);

        let f_blend_min = (f_min as f64 * 2.0_f64.powf(params.low_blend_octs)).min(f_max as f64);
        let f_blend_max = (f_max as f64 / 2.0_f64.powf(params.high_blend_octs)).max(f_min as f64);

        let low_span = (f_blend_min / f_min as f64).log2();
        let high_span = (f_max as f64 / f_blend_max).log2();

        for (i, w) in weights.iter_mut().enumerate().take(f_max + 1).skip(f_min) {
            let f = i as f64;
            let mut weight = 1.0;
            if f < f_blend_min && low_span > 0.0 {
                weight *= (f / f_min as f64).log2() / low_span;
            }
            if f > f_blend_max && high_span > 0.0 {
                weight *= (f_max as f64 / f).log2() / high_span;
            }
            *w = weight.clamp(0.0, 1.0);
        }

        Self {
            f_min,
            f_max,
            f_blend_min,
            f_blend_max,
            weights,
        }
    }

    /// Weight at bin `i`; 0 past Nyquist.
    pub fn get(&self, i: usize) -> f64 {
        self.weights.get(i).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Bins that may carry a non-zero weight.
    pub fn active_range(&self) -> std::ops::RangeInclusive<usize> {
        self.f_min..=self.f_max
    }
}
