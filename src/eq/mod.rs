// Parametric EQ: six peaking biquads in series per channel

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MixingConfig;
use crate::dsp::filters::Biquad;
use crate::dsp::generate_log_freq_grid;
use crate::output::StereoSignal;

/// Points in [`EqProcessor::frequency_response`].
pub const RESPONSE_POINTS: usize = 1000;

/// Lower end of the response grid, Hz.
pub const RESPONSE_MIN_HZ: f64 = 20.0;

/// One peaking band in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    pub freq_hz: f64,
    pub q: f64,
    pub gain_db: f64,
}

/// Combined magnitude response on a log frequency grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
    pub freq: Vec<f64>,
    pub magnitude_db: Vec<f64>,
}

pub struct EqProcessor {
    bands: Vec<EqBand>,
    filters: Vec<Biquad>,
    samplerate: f64,
}

impl EqProcessor {
    pub fn new(config: &MixingConfig, samplerate: f64) -> Self {
        let bands: Vec<EqBand> = config
            .eq_bands
            .iter()
            .map(|b| EqBand {
                freq_hz: b.freq_transformed(),
                q: b.q_transformed(),
                gain_db: b.gain_db_transformed(),
            })
            .collect();
        Self::from_bands(bands, samplerate)
    }

    pub fn from_bands(bands: Vec<EqBand>, samplerate: f64) -> Self {
        let filters = bands
            .iter()
            .map(|b| Biquad::peak(samplerate, b.freq_hz, b.q, b.gain_db))
            .collect();
        Self {
            bands,
            filters,
            samplerate,
        }
    }

    pub fn bands(&self) -> &[EqBand] {
        &self.bands
    }

    /// Filter both channels; each starts from zero filter state.
    pub fn process(&mut self, input: &StereoSignal) -> StereoSignal {
        debug!("eq process: {} bands, {} samples", self.filters.len(), input.len());
        let left = self.process_channel(&input.left);
        let right = self.process_channel(&input.right);
        StereoSignal { left, right }
    }

    fn process_channel(&mut self, input: &[f64]) -> Vec<f64> {
        for f in &mut self.filters {
            f.reset();
        }
        input
            .iter()
            .map(|&x| self.filters.iter_mut().fold(x, |acc, f| f.process(acc)))
            .collect()
    }

    /// Magnitude (dB) of the whole band chain from 20 Hz to Nyquist.
    pub fn frequency_response(&self) -> FrequencyResponse {
        let freq = generate_log_freq_grid(RESPONSE_POINTS, RESPONSE_MIN_HZ, self.samplerate / 2.0);
        let magnitude_db = freq
            .iter()
            .map(|&f| {
                let h = self
                    .filters
                    .iter()
                    .map(|bq| bq.response(f, self.samplerate))
                    .product::<Complex64>();
                20.0 * h.norm().max(1e-20).log10()
            })
            .collect();
        FrequencyResponse { freq, magnitude_db }
    }
}
