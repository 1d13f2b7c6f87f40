use serde::{Deserialize, Serialize};

use crate::params::{ResponseCurve, WindowMethod};

/// Post-processing of one stereo signal: gain, pan, cuts, delay, tail window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputStage {
    pub gain: f64,
    pub delay_millis_l: f64,
    pub delay_millis_r: f64,
    pub pan: f64,
    pub invert_phase_left: bool,
    pub invert_phase_right: bool,
    pub low_cut_12db: bool,
    pub high_cut_12db: bool,
    pub low_cut_left: f64,
    pub low_cut_right: f64,
    pub high_cut_left: f64,
    pub high_cut_right: f64,
    pub window_method: f64,
    pub window_length: f64,
}

impl Default for OutputStage {
    fn default() -> Self {
        Self {
            gain: 6.0 / 8.0,
            delay_millis_l: 0.0,
            delay_millis_r: 0.0,
            pan: 0.5,
            invert_phase_left: false,
            invert_phase_right: false,
            low_cut_12db: false,
            high_cut_12db: true,
            low_cut_left: 0.0,
            low_cut_right: 0.0,
            high_cut_left: 1.0,
            high_cut_right: 1.0,
            window_method: 0.7,
            window_length: 0.0,
        }
    }
}

impl OutputStage {
    pub fn gain_transformed(&self) -> f64 {
        -60.0 + self.gain * 80.0
    }

    pub fn delay_millis_l_transformed(&self) -> f64 {
        ResponseCurve::TwoOct.get(self.delay_millis_l) * 80.0
    }

    pub fn delay_millis_r_transformed(&self) -> f64 {
        ResponseCurve::TwoOct.get(self.delay_millis_r) * 80.0
    }

    pub fn pan_transformed(&self) -> f64 {
        self.pan * 2.0 - 1.0
    }

    pub fn low_cut_left_transformed(&self) -> f64 {
        20.0 + ResponseCurve::ThreeOct.get(self.low_cut_left) * 1480.0
    }

    pub fn low_cut_right_transformed(&self) -> f64 {
        20.0 + ResponseCurve::ThreeOct.get(self.low_cut_right) * 1480.0
    }

    pub fn high_cut_left_transformed(&self) -> f64 {
        1000.0 + ResponseCurve::FourOct.get(self.high_cut_left) * 21000.0
    }

    pub fn high_cut_right_transformed(&self) -> f64 {
        1000.0 + ResponseCurve::FourOct.get(self.high_cut_right) * 21000.0
    }

    pub fn window_method_transformed(&self) -> WindowMethod {
        WindowMethod::from_normalized(self.window_method)
    }

    /// Fraction of the impulse length covered by the tail window, 0..0.5
    pub fn window_length_transformed(&self) -> f64 {
        ResponseCurve::TwoOct.get(self.window_length) * 0.5
    }

    /// Physical parameters at the given working sample rate.
    pub fn params(&self, samplerate: f64) -> OutputParams {
        let ms_to_samples = |ms: f64| (ms / 1000.0 * samplerate).round().max(0.0) as usize;
        OutputParams {
            gain_db: self.gain_transformed(),
            pan: self.pan_transformed(),
            invert_left: self.invert_phase_left,
            invert_right: self.invert_phase_right,
            delay_left: ms_to_samples(self.delay_millis_l_transformed()),
            delay_right: ms_to_samples(self.delay_millis_r_transformed()),
            low_cut_left_hz: self.low_cut_left_transformed(),
            low_cut_right_hz: self.low_cut_right_transformed(),
            high_cut_left_hz: self.high_cut_left_transformed(),
            high_cut_right_hz: self.high_cut_right_transformed(),
            low_cut_12db: self.low_cut_12db,
            high_cut_12db: self.high_cut_12db,
            window_method: self.window_method_transformed(),
            window_length: self.window_length_transformed(),
        }
    }
}

/// Physical-unit view of an [`OutputStage`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutputParams {
    pub gain_db: f64,
    pub pan: f64,
    pub invert_left: bool,
    pub invert_right: bool,
    pub delay_left: usize,
    pub delay_right: usize,
    pub low_cut_left_hz: f64,
    pub low_cut_right_hz: f64,
    pub high_cut_left_hz: f64,
    pub high_cut_right_hz: f64,
    pub low_cut_12db: bool,
    pub high_cut_12db: bool,
    pub window_method: WindowMethod,
    pub window_length: f64,
}
