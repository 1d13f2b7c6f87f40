use serde::{Deserialize, Serialize};

use crate::params::{ApplyMode, ResponseCurve};

use super::MAX_FREQUENCY;

/// One spectral edit unit of an impulse. All controls are normalized 0..1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumStage {
    pub is_enabled: bool,
    pub minimum_phase: bool,
    /// Index of an earlier impulse in the preset whose spectrum is applied here
    pub apply_source: Option<usize>,

    pub min_freq: f64,
    pub max_freq: f64,
    pub low_blend_octs: f64,
    pub high_blend_octs: f64,
    pub gain: f64,
    pub delay_samples: f64,

    // Gain variation
    pub gain_smoothing_octaves: f64,
    pub gain_smoothing_amount: f64,
    pub gain_smoothing_mode: f64,

    // Random gain per frequency
    pub random_gain_filtering: f64,
    pub random_gain_seed: f64,
    pub random_gain_shift: f64,
    pub random_gain_amount: f64,
    pub random_skew_amount: f64,
    pub random_gain_mode: f64,

    // Frequency skew
    pub frequency_skew: f64,
    pub pin_to_high_frequency: bool,

    // Phase bands (decorrelation)
    pub phase_bands: f64,
    pub phase_band_delay_amount: f64,
    pub phase_band_freq_track: f64,
    pub phase_band_seed: f64,
    pub phase_band_freq_shift: f64,
}

impl Default for SpectrumStage {
    fn default() -> Self {
        Self {
            is_enabled: true,
            minimum_phase: true,
            apply_source: None,
            min_freq: 0.0,
            max_freq: 1.0,
            low_blend_octs: 0.0,
            high_blend_octs: 0.0,
            gain: 0.6,
            delay_samples: 0.0,
            gain_smoothing_octaves: 0.2,
            gain_smoothing_amount: 0.5,
            gain_smoothing_mode: 0.5,
            random_gain_filtering: 0.2,
            random_gain_seed: 0.0,
            random_gain_shift: 0.0,
            random_gain_amount: 0.0,
            random_skew_amount: 0.5,
            random_gain_mode: 0.5,
            frequency_skew: 0.5,
            pin_to_high_frequency: false,
            phase_bands: 0.5,
            phase_band_delay_amount: 0.0,
            phase_band_freq_track: 0.5,
            phase_band_seed: 0.0,
            phase_band_freq_shift: 0.5,
        }
    }
}

impl SpectrumStage {
    pub fn min_freq_transformed(&self) -> f64 {
        ResponseCurve::TwoDec.get(self.min_freq) * MAX_FREQUENCY
    }

    pub fn max_freq_transformed(&self) -> f64 {
        ResponseCurve::TwoDec.get(self.max_freq) * MAX_FREQUENCY
    }

    pub fn low_blend_octs_transformed(&self) -> f64 {
        self.low_blend_octs * 5.0
    }

    pub fn high_blend_octs_transformed(&self) -> f64 {
        self.high_blend_octs * 5.0
    }

    pub fn gain_transformed(&self) -> f64 {
        -60.0 + self.gain * 100.0
    }

    /// Whole samples, 0..4096
    pub fn delay_samples_transformed(&self) -> f64 {
        (ResponseCurve::TwoDec.get(self.delay_samples) * 4096.0).trunc()
    }

    pub fn gain_smoothing_octaves_transformed(&self) -> f64 {
        ResponseCurve::TwoDec.get(self.gain_smoothing_octaves) * 2.0
    }

    /// 0 flattens the response, 1 leaves it untouched, >1 exaggerates it.
    pub fn gain_smoothing_amount_transformed(&self) -> f64 {
        (10.0_f64.powf(self.gain_smoothing_amount * 2.0 - 1.0) - 0.1) / 0.9
    }

    pub fn gain_smoothing_mode_transformed(&self) -> ApplyMode {
        ApplyMode::from_normalized(self.gain_smoothing_mode)
    }

    pub fn random_gain_filtering_transformed(&self) -> usize {
        (ResponseCurve::TwoOct.get(self.random_gain_filtering) * 128.0) as usize
    }

    pub fn random_gain_seed_transformed(&self) -> u64 {
        (self.random_gain_seed.max(0.0) * 1000.0) as u64
    }

    pub fn random_gain_shift_transformed(&self) -> usize {
        (self.random_gain_shift.max(0.0) * 1000.0) as usize
    }

    pub fn random_gain_amount_transformed(&self) -> f64 {
        self.random_gain_amount * 40.0
    }

    pub fn random_skew_amount_transformed(&self) -> f64 {
        3.0_f64.powf(self.random_skew_amount * 2.0 - 1.0)
    }

    pub fn random_gain_mode_transformed(&self) -> ApplyMode {
        ApplyMode::from_normalized(self.random_gain_mode)
    }

    pub fn frequency_skew_transformed(&self) -> f64 {
        2.0_f64.powf(self.frequency_skew * 4.0 - 2.0)
    }

    /// 2..=10 bands
    pub fn phase_bands_transformed(&self) -> usize {
        let bands = ((self.phase_bands - 0.001) * 9.0) as i64 + 2;
        bands.clamp(2, 10) as usize
    }

    pub fn phase_band_delay_amount_transformed(&self) -> f64 {
        (ResponseCurve::TwoDec.get(self.phase_band_delay_amount) * 4096.0).trunc()
    }

    /// -1 favours low bands, +1 favours high bands
    pub fn phase_band_freq_track_transformed(&self) -> f64 {
        2.0 * self.phase_band_freq_track - 1.0
    }

    pub fn phase_band_seed_transformed(&self) -> u64 {
        (self.phase_band_seed.max(0.0) * 10000.0) as u64
    }

    pub fn phase_band_freq_shift_transformed(&self) -> f64 {
        0.5 + self.phase_band_freq_shift
    }

    /// Snapshot of every transformed value, consumed by the spectral processor.
    pub fn params(&self) -> StageParams {
        StageParams {
            enabled: self.is_enabled,
            minimum_phase: self.minimum_phase,
            apply_source: self.apply_source,
            min_freq_hz: self.min_freq_transformed(),
            max_freq_hz: self.max_freq_transformed(),
            low_blend_octs: self.low_blend_octs_transformed(),
            high_blend_octs: self.high_blend_octs_transformed(),
            gain_db: self.gain_transformed(),
            delay_samples: self.delay_samples_transformed(),
            smoothing_octaves: self.gain_smoothing_octaves_transformed(),
            smoothing_amount: self.gain_smoothing_amount_transformed(),
            smoothing_mode: self.gain_smoothing_mode_transformed(),
            random_filter_width: self.random_gain_filtering_transformed(),
            random_seed: self.random_gain_seed_transformed(),
            random_shift: self.random_gain_shift_transformed(),
            random_amount_db: self.random_gain_amount_transformed(),
            random_skew: self.random_skew_amount_transformed(),
            random_mode: self.random_gain_mode_transformed(),
            frequency_skew: self.frequency_skew_transformed(),
            pin_to_high_frequency: self.pin_to_high_frequency,
            phase_bands: self.phase_bands_transformed(),
            phase_band_delay_samples: self.phase_band_delay_amount_transformed(),
            phase_band_freq_track: self.phase_band_freq_track_transformed(),
            phase_band_seed: self.phase_band_seed_transformed(),
            phase_band_freq_shift: self.phase_band_freq_shift_transformed(),
        }
    }
}

/// Physical-unit view of a [`SpectrumStage`].
#[derive(Debug, Clone, PartialEq)]
pub struct StageParams {
    pub enabled: bool,
    pub minimum_phase: bool,
    pub apply_source: Option<usize>,
    pub min_freq_hz: f64,
    pub max_freq_hz: f64,
    pub low_blend_octs: f64,
    pub high_blend_octs: f64,
    pub gain_db: f64,
    pub delay_samples: f64,
    pub smoothing_octaves: f64,
    pub smoothing_amount: f64,
    pub smoothing_mode: ApplyMode,
    pub random_filter_width: usize,
    pub random_seed: u64,
    pub random_shift: usize,
    pub random_amount_db: f64,
    pub random_skew: f64,
    pub random_mode: ApplyMode,
    pub frequency_skew: f64,
    pub pin_to_high_frequency: bool,
    pub phase_bands: usize,
    pub phase_band_delay_samples: f64,
    pub phase_band_freq_track: f64,
    pub phase_band_seed: u64,
    pub phase_band_freq_shift: f64,
}

impl StageParams {
    /// Full-band stage that leaves any spectrum untouched.
    pub fn neutral() -> Self {
        Self {
            enabled: true,
            minimum_phase: false,
            apply_source: None,
            min_freq_hz: 0.0,
            max_freq_hz: MAX_FREQUENCY,
            low_blend_octs: 0.0,
            high_blend_octs: 0.0,
            gain_db: 0.0,
            delay_samples: 0.0,
            smoothing_octaves: 0.2,
            smoothing_amount: 1.0,
            smoothing_mode: ApplyMode::Bipolar,
            random_filter_width: 13,
            random_seed: 0,
            random_shift: 0,
            random_amount_db: 0.0,
            random_skew: 1.0,
            random_mode: ApplyMode::Bipolar,
            frequency_skew: 1.0,
            pin_to_high_frequency: false,
            phase_bands: 6,
            phase_band_delay_samples: 0.0,
            phase_band_freq_track: 0.0,
            phase_band_seed: 0,
            phase_band_freq_shift: 1.0,
        }
    }
}
