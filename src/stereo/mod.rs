// Stereo enhancer: per-band opposite L/R gain and delay, then cross-blend

use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::debug;

use crate::config::{MixingConfig, MAX_SAMPLE_LENGTH};
use crate::dsp::{forward_fft, inverse_fft_real, linear_bin_average, rotate_bin, scale_bin};
use crate::output::StereoSignal;
use crate::params::db_to_gain;

/// Physical settings of the enhancer, derived from a [`MixingConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct StereoParams {
    pub eq_depth_db: f64,
    pub eq_smoothing_octaves: f64,
    pub delay_millis: f64,
    /// Linear cross-feed gain; 0 disables the blend pass.
    pub blend_gain: f64,
    pub center_frequencies: Vec<f64>,
    pub stereo_eq: Vec<f64>,
    pub stereo_phase: Vec<f64>,
}

impl StereoParams {
    pub fn from_config(config: &MixingConfig) -> Self {
        let blend_gain = if config.blend_amount == 0.0 {
            0.0
        } else {
            db_to_gain(config.blend_amount_transformed())
        };
        Self {
            eq_depth_db: config.eq_depth_db_transformed(),
            eq_smoothing_octaves: config.eq_smoothing_octaves_transformed(),
            delay_millis: config.delay_millis_transformed(),
            blend_gain,
            center_frequencies: config.center_frequencies(),
            stereo_eq: config.stereo_eq.clone(),
            stereo_phase: config.stereo_phase.clone(),
        }
    }
}

pub struct StereoEnhancer {
    params: StereoParams,
    samplerate: f64,
}

impl StereoEnhancer {
    pub fn new(config: &MixingConfig, samplerate: f64) -> Self {
        Self::from_params(StereoParams::from_config(config), samplerate)
    }

    pub fn from_params(params: StereoParams, samplerate: f64) -> Self {
        Self { params, samplerate }
    }

    /// Band index for every bin 0..=N/2, nearest center by absolute Hz.
    pub fn band_map(&self, n: usize) -> Vec<usize> {
        let hz_per_bin = self.samplerate / n as f64;
        let centers = &self.params.center_frequencies;
        (0..=n / 2)
            .map(|i| {
                let f = i as f64 * hz_per_bin;
                centers
                    .iter()
                    .enumerate()
                    .min_by(|a, b| (a.1 - f).abs().total_cmp(&(b.1 - f).abs()))
                    .map(|(k, _)| k)
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn process(&self, input: &StereoSignal) -> StereoSignal {
        let n = MAX_SAMPLE_LENGTH;
        let fit = |ch: &[f64]| {
            let mut v: Vec<f64> = ch.iter().copied().take(n).collect();
            v.resize(n, 0.0);
            v
        };
        let mut left = forward_fft(&fit(&input.left));
        let mut right = forward_fft(&fit(&input.right));
        let bands = self.band_map(n);

        self.apply_eq_bands(&mut left, &mut right, &bands);
        self.apply_phase_bands(&mut left, &mut right, &bands);

        let out_len = input.len();
        let mut l = inverse_fft_real(&left);
        let mut r = inverse_fft_real(&right);
        l.resize(out_len, 0.0);
        r.resize(out_len, 0.0);

        let b = self.params.blend_gain;
        if b != 0.0 {
            let (l0, r0) = (l.clone(), r.clone());
            for i in 0..out_len {
                l[i] = l0[i] + r0[i] * b;
                r[i] = r0[i] + l0[i] * b;
            }
        }

        debug!(
            "stereo process: depth={:.1} dB delay={:.2} ms blend={:.3}",
            self.params.eq_depth_db, self.params.delay_millis, b
        );
        StereoSignal::new(l, r)
    }

    /// Equal-and-opposite dB gain per band. The linear gains of each channel
    /// are smoothed across bins separately.
    fn apply_eq_bands(&self, left: &mut [Complex64], right: &mut [Complex64], bands: &[usize]) {
        let depth = self.params.eq_depth_db;
        let target_db: Vec<f64> = bands
            .iter()
            .map(|&b| {
                let v = self.params.stereo_eq.get(b).copied().unwrap_or(0.5);
                (2.0 * v - 1.0) * depth
            })
            .collect();
        if target_db.iter().all(|&g| g == 0.0) {
            return;
        }
        let gains_left: Vec<f64> = target_db.iter().map(|&db| db_to_gain(db)).collect();
        let gains_right: Vec<f64> = target_db.iter().map(|&db| db_to_gain(-db)).collect();
        let smoothing = self.params.eq_smoothing_octaves;
        let smoothed_left = linear_bin_average(&gains_left, smoothing);
        let smoothed_right = linear_bin_average(&gains_right, smoothing);

        for i in 1..bands.len() {
            scale_bin(left, i, smoothed_left[i]);
            scale_bin(right, i, smoothed_right[i]);
        }
    }

    /// Delay one channel per band: left when the control is below center,
    /// right when above.
    fn apply_phase_bands(&self, left: &mut [Complex64], right: &mut [Complex64], bands: &[usize]) {
        let max_delay = self.params.delay_millis / 1000.0 * self.samplerate;
        if max_delay == 0.0 {
            return;
        }
        let n = left.len() as f64;
        for (i, &b) in bands.iter().enumerate().skip(1) {
            let control = 2.0 * self.params.stereo_phase.get(b).copied().unwrap_or(0.5) - 1.0;
            if control == 0.0 {
                continue;
            }
            let phase = -2.0 * PI * i as f64 * max_delay * control.abs() / n;
            if control < 0.0 {
                rotate_bin(left, i, phase);
            } else {
                rotate_bin(right, i, phase);
            }
        }
    }
}
