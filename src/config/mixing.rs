use serde::{Deserialize, Serialize};

use crate::params::{linspace, ResponseCurve};

use super::OutputStage;

/// Number of stereo-enhancer bands.
pub const STEREO_BAND_COUNT: usize = 16;

/// Number of parametric EQ bands.
pub const EQ_BAND_COUNT: usize = 6;

/// One peaking EQ band, normalized controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqBandConfig {
    pub freq: f64,
    pub q: f64,
    pub gain_db: f64,
}

impl Default for EqBandConfig {
    fn default() -> Self {
        Self {
            freq: 0.5,
            q: 0.5,
            gain_db: 0.5,
        }
    }
}

impl EqBandConfig {
    pub fn freq_transformed(&self) -> f64 {
        20.0 + ResponseCurve::ThreeDec.get(self.freq) * (22000.0 - 20.0)
    }

    pub fn q_transformed(&self) -> f64 {
        10.0_f64.powf(2.0 * self.q - 1.0)
    }

    pub fn gain_db_transformed(&self) -> f64 {
        -20.0 + 40.0 * self.gain_db
    }
}

/// Preset-level mixing: parametric EQ, stereo enhancement, final output stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixingConfig {
    pub output_stage: OutputStage,
    pub eq_bands: [EqBandConfig; EQ_BAND_COUNT],

    pub eq_depth_db: f64,
    pub eq_smoothing_octaves: f64,
    pub delay_millis: f64,
    pub freq_shift: f64,
    pub blend_amount: f64,

    /// Per-band L/R balance, 0.5 = centered
    pub stereo_eq: Vec<f64>,
    /// Per-band L/R delay, 0.5 = none
    pub stereo_phase: Vec<f64>,
}

impl Default for MixingConfig {
    fn default() -> Self {
        Self {
            output_stage: OutputStage::default(),
            eq_bands: [EqBandConfig::default(); EQ_BAND_COUNT],
            eq_depth_db: 0.5,
            eq_smoothing_octaves: 0.5,
            delay_millis: 0.5,
            freq_shift: 0.5,
            blend_amount: 0.0,
            stereo_eq: vec![0.5; STEREO_BAND_COUNT],
            stereo_phase: vec![0.5; STEREO_BAND_COUNT],
        }
    }
}

impl MixingConfig {
    pub fn eq_depth_db_transformed(&self) -> f64 {
        12.0 * self.eq_depth_db
    }

    pub fn eq_smoothing_octaves_transformed(&self) -> f64 {
        ResponseCurve::TwoDec.get(self.eq_smoothing_octaves) * 2.0
    }

    pub fn delay_millis_transformed(&self) -> f64 {
        ResponseCurve::TwoOct.get(self.delay_millis) * 80.0
    }

    pub fn freq_shift_transformed(&self) -> f64 {
        0.5 + self.freq_shift
    }

    pub fn blend_amount_transformed(&self) -> f64 {
        -40.0 + 40.0 * self.blend_amount
    }

    /// Stereo band centers: 80 Hz · 2^k, k evenly spaced over 0..7.4, shifted.
    pub fn center_frequencies(&self) -> Vec<f64> {
        let shift = self.freq_shift_transformed();
        linspace(0.0, 7.4, STEREO_BAND_COUNT)
            .into_iter()
            .map(|x| 2.0_f64.powf(x) * 80.0 * shift)
            .collect()
    }

    /// Short display labels for the stereo bands ("80", "1.2k").
    pub fn center_frequency_labels(&self) -> Vec<String> {
        self.center_frequencies()
            .into_iter()
            .map(|f| {
                if f < 1000.0 {
                    format!("{f:.0}")
                } else {
                    format!("{:.1}k", f / 1000.0)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_eq_is_flat() {
        let cfg = MixingConfig::default();
        for band in &cfg.eq_bands {
            assert_eq!(band.gain_db_transformed(), 0.0);
            assert!((band.q_transformed() - 1.0).abs() < 1e-12);
            let f = band.freq_transformed();
            assert!(f > 600.0 && f < 800.0, "default EQ freq should sit near 700 Hz, got {f}");
        }
    }

    #[test]
    fn test_center_frequencies() {
        let cfg = MixingConfig::default();
        let freqs = cfg.center_frequencies();
        assert_eq!(freqs.len(), STEREO_BAND_COUNT);
        assert!((freqs[0] - 80.0).abs() < 1e-9);
        let top = 80.0 * 2.0_f64.powf(7.4);
        assert!((freqs[15] - top).abs() < 1e-6);
        for w in freqs.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_center_frequencies_shifted() {
        let cfg = MixingConfig {
            freq_shift: 1.0,
            ..Default::default()
        };
        assert!((cfg.center_frequencies()[0] - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels() {
        let labels = MixingConfig::default().center_frequency_labels();
        assert_eq!(labels[0], "80");
        assert!(labels[15].ends_with('k'));
    }

    #[test]
    fn test_blend_default_is_silent() {
        assert_eq!(MixingConfig::default().blend_amount_transformed(), -40.0);
    }
}
