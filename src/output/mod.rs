// Output stage: gain, pan, invert, cuts, per-channel delay and tail window

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{OutputParams, OutputStage};
use crate::dsp::filters::{Biquad, OnePole, BUTTERWORTH_Q};
use crate::dsp::get_window;
use crate::params::db_to_gain;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Channel-major stereo buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StereoSignal {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl StereoSignal {
    pub fn new(left: Vec<f64>, right: Vec<f64>) -> Self {
        Self { left, right }
    }

    pub fn silent(len: usize) -> Self {
        Self::new(vec![0.0; len], vec![0.0; len])
    }

    /// Same mono signal on both channels.
    pub fn dual_mono(signal: Vec<f64>) -> Self {
        Self::new(signal.clone(), signal)
    }

    pub fn len(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Sample-wise sum; `other` is truncated to this buffer's length.
    pub fn accumulate(&mut self, other: &StereoSignal) {
        for (a, b) in self.left.iter_mut().zip(other.left.iter()) {
            *a += b;
        }
        for (a, b) in self.right.iter_mut().zip(other.right.iter()) {
            *a += b;
        }
    }

    pub fn scale(&mut self, gain: f64) {
        self.left.iter_mut().chain(self.right.iter_mut()).for_each(|v| *v *= gain);
    }

    pub fn truncate(&mut self, len: usize) {
        self.left.truncate(len);
        self.right.truncate(len);
    }

    /// Largest absolute sample over both channels.
    pub fn peak(&self) -> f64 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// High/low cut, one- or two-pole.
enum CutFilter {
    OnePoleLowPass(OnePole),
    OnePoleHighPass(OnePole),
    TwoPole(Biquad),
}

impl CutFilter {
    fn high_cut(samplerate: f64, fc: f64, two_pole: bool) -> Self {
        if two_pole {
            CutFilter::TwoPole(Biquad::low_pass(samplerate, fc, BUTTERWORTH_Q))
        } else {
            CutFilter::OnePoleLowPass(OnePole::new(samplerate, fc))
        }
    }

    fn low_cut(samplerate: f64, fc: f64, two_pole: bool) -> Self {
        if two_pole {
            CutFilter::TwoPole(Biquad::high_pass(samplerate, fc, BUTTERWORTH_Q))
        } else {
            CutFilter::OnePoleHighPass(OnePole::new(samplerate, fc))
        }
    }

    fn process(&mut self, x: f64) -> f64 {
        match self {
            CutFilter::OnePoleLowPass(f) => f.tick(x).0,
            CutFilter::OnePoleHighPass(f) => f.tick(x).1,
            CutFilter::TwoPole(f) => f.process(x),
        }
    }
}

struct ChannelSettings {
    gain: f64,
    delay: usize,
    low_cut_hz: f64,
    high_cut_hz: f64,
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct OutputProcessor {
    params: OutputParams,
    impulse_length: usize,
    samplerate: f64,
}

impl OutputProcessor {
    pub fn new(stage: &OutputStage, impulse_length: usize, samplerate: f64) -> Self {
        Self::from_params(stage.params(samplerate), impulse_length, samplerate)
    }

    pub fn from_params(params: OutputParams, impulse_length: usize, samplerate: f64) -> Self {
        Self {
            params,
            impulse_length,
            samplerate,
        }
    }

    pub fn params(&self) -> &OutputParams {
        &self.params
    }

    /// Process both channels. Output buffers keep the input length; samples
    /// from `impulse_length` on are zeroed by the window.
    pub fn process(&self, input: &StereoSignal) -> StereoSignal {
        let p = &self.params;
        debug!(
            "output process: gain={:.1} dB pan={:.2} delay={}/{} window={:?}@{:.3}",
            p.gain_db, p.pan, p.delay_left, p.delay_right, p.window_method, p.window_length
        );

        let base_gain = db_to_gain(p.gain_db);
        let pan_left = if p.pan <= 0.0 { 1.0 } else { 1.0 - p.pan.abs() };
        let pan_right = if p.pan >= 0.0 { 1.0 } else { 1.0 - p.pan.abs() };
        let sign = |invert: bool| if invert { -1.0 } else { 1.0 };

        let left = ChannelSettings {
            gain: base_gain * pan_left * sign(p.invert_left),
            delay: p.delay_left,
            low_cut_hz: p.low_cut_left_hz,
            high_cut_hz: p.high_cut_left_hz,
        };
        let right = ChannelSettings {
            gain: base_gain * pan_right * sign(p.invert_right),
            delay: p.delay_right,
            low_cut_hz: p.low_cut_right_hz,
            high_cut_hz: p.high_cut_right_hz,
        };

        StereoSignal {
            left: self.process_channel(&input.left, &left),
            right: self.process_channel(&input.right, &right),
        }
    }

    fn process_channel(&self, input: &[f64], ch: &ChannelSettings) -> Vec<f64> {
        let p = &self.params;
        let len = input.len();
        let mut high_cut = CutFilter::high_cut(self.samplerate, ch.high_cut_hz, p.high_cut_12db);
        let mut low_cut = CutFilter::low_cut(self.samplerate, ch.low_cut_hz, p.low_cut_12db);

        let mut out = vec![0.0; len];
        for (i, &x) in input.iter().enumerate() {
            let y = low_cut.process(high_cut.process(x * ch.gain));
            if let Some(slot) = out.get_mut(i + ch.delay) {
                *slot = y;
            }
        }

        for (i, v) in out.iter_mut().enumerate() {
            *v *= get_window(i, self.impulse_length, p.window_length, p.window_method);
        }
        out
    }
}
