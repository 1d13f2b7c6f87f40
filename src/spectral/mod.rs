// Spectral stage processor: one impulse's spectrum edited by its stage chain

mod edits;
mod min_phase;
mod strength;

use std::collections::HashMap;

use num_complex::Complex64;
use tracing::{debug, warn};

use crate::config::{ImpulseConfig, StageParams, MAX_SAMPLE_LENGTH};
use crate::dsp::{forward_fft, half_magnitudes, inverse_fft_real};

pub use edits::{phase_band_ranges, PhaseBands, RandomGain};
pub use min_phase::minimum_phase;
pub use strength::Strengths;

/// Final spectra of already processed impulses, keyed by impulse index.
pub type StageOutputs = HashMap<usize, Vec<Complex64>>;

/// Holds the complex spectrum of one impulse and applies stages to it in
/// place.
#[derive(Debug, Clone)]
pub struct ImpulseProcessor {
    samplerate: f64,
    spectrum: Vec<Complex64>,
}

impl ImpulseProcessor {
    /// Load, resample and transform the impulse's source sample.
    pub fn new(config: &ImpulseConfig) -> Self {
        Self::from_samples(&config.converted_sample_data(), config.samplerate as f64)
    }

    /// Start from raw samples at the working rate; zero-padded or truncated
    /// to [`MAX_SAMPLE_LENGTH`].
    pub fn from_samples(samples: &[f64], samplerate: f64) -> Self {
        let mut signal: Vec<f64> = samples.iter().copied().take(MAX_SAMPLE_LENGTH).collect();
        signal.resize(MAX_SAMPLE_LENGTH, 0.0);
        Self {
            samplerate,
            spectrum: forward_fft(&signal),
        }
    }

    pub fn samplerate(&self) -> f64 {
        self.samplerate
    }

    pub fn spectrum(&self) -> &[Complex64] {
        &self.spectrum
    }

    /// Apply every enabled stage of `config`, in order.
    pub fn process_all(&mut self, config: &ImpulseConfig, stage_outputs: &StageOutputs) {
        for (idx, stage) in config.spectrum_stages.iter().enumerate() {
            debug!("process_all: '{}' stage {}", config.name, idx);
            self.process_stage(&stage.params(), stage_outputs);
        }
    }

    /// Apply one stage. Disabled stages are a no-op.
    pub fn process_stage(&mut self, stage: &StageParams, stage_outputs: &StageOutputs) {
        if !stage.enabled {
            return;
        }
        let n = self.spectrum.len();
        let strengths = Strengths::new(stage, n, self.samplerate);

        if let Some(src) = stage.apply_source {
            match stage_outputs.get(&src) {
                Some(source) if source.len() == n => {
                    edits::apply_source(&mut self.spectrum, &strengths, source);
                }
                _ => warn!("process_stage: no cached spectrum for source impulse {}, skipped", src),
            }
        }

        edits::apply_gain(&mut self.spectrum, &strengths, stage.gain_db);
        edits::apply_gain_variation(
            &mut self.spectrum,
            &strengths,
            stage.smoothing_octaves,
            stage.smoothing_amount,
            stage.smoothing_mode,
        );
        edits::apply_random_gain(
            &mut self.spectrum,
            &strengths,
            &RandomGain {
                filter_width: stage.random_filter_width,
                seed: stage.random_seed,
                shift: stage.random_shift,
                amount_db: stage.random_amount_db,
                skew: stage.random_skew,
                mode: stage.random_mode,
            },
        );

        let snapshot = half_magnitudes(&self.spectrum);
        edits::apply_frequency_skew(
            &mut self.spectrum,
            &strengths,
            &snapshot,
            stage.frequency_skew,
            stage.pin_to_high_frequency,
        );

        if stage.minimum_phase {
            minimum_phase(&mut self.spectrum);
        }

        edits::apply_delay(&mut self.spectrum, &strengths, stage.delay_samples);
        edits::apply_phase_bands(
            &mut self.spectrum,
            &strengths,
            &PhaseBands {
                count: stage.phase_bands,
                delay_samples: stage.phase_band_delay_samples,
                freq_track: stage.phase_band_freq_track,
                seed: stage.phase_band_seed,
                freq_shift: stage.phase_band_freq_shift,
            },
            self.samplerate,
        );
    }

    /// Inverse FFT of the current spectrum (recomputed on every call).
    pub fn time_signal(&self) -> Vec<f64> {
        inverse_fft_real(&self.spectrum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpectrumStage;
    use rustfft::FftPlanner;

    const SR: f64 = 48000.0;

    fn unit_impulse() -> ImpulseProcessor {
        ImpulseProcessor::from_samples(&[1.0, 0.0, 0.0, 0.0], SR)
    }

    fn noisy() -> ImpulseProcessor {
        let mut rng = crate::dsp::StageRng::new(3);
        let x: Vec<f64> = (0..2000)
            .map(|i| rng.next_bipolar() * (-(i as f64) / 300.0).exp())
            .collect();
        ImpulseProcessor::from_samples(&x, SR)
    }

    fn max_imag_after_ifft(spec: &[Complex64]) -> f64 {
        let mut buf = spec.to_vec();
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_inverse(buf.len()).process(&mut buf);
        let norm = 1.0 / buf.len() as f64;
        buf.iter().map(|c| (c.im * norm).abs()).fold(0.0, f64::max)
    }

    fn peak_index(x: &[f64]) -> usize {
        x.iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    #[test]
    fn test_neutral_stage_roundtrip() {
        let mut p = noisy();
        let before = p.spectrum().to_vec();
        p.process_stage(&StageParams::neutral(), &StageOutputs::new());
        for (a, b) in p.spectrum().iter().zip(before.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_disabled_stage_is_noop() {
        let mut p = noisy();
        let before = p.spectrum().to_vec();
        let stage = StageParams {
            enabled: false,
            gain_db: 12.0,
            delay_samples: 300.0,
            minimum_phase: true,
            ..StageParams::neutral()
        };
        p.process_stage(&stage, &StageOutputs::new());
        assert_eq!(p.spectrum(), &before[..]);
    }

    #[test]
    fn test_default_stage_keeps_unit_impulse() {
        let mut p = unit_impulse();
        p.process_stage(&SpectrumStage::default().params(), &StageOutputs::new());
        let y = p.time_signal();
        assert!((y[0] - 1.0).abs() < 1e-6, "got {}", y[0]);
        assert!(y[1..].iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_conjugate_symmetry_after_busy_stage() {
        let mut p = noisy();
        let stage = StageParams {
            min_freq_hz: 200.0,
            max_freq_hz: 9000.0,
            low_blend_octs: 1.0,
            high_blend_octs: 2.0,
            gain_db: 4.0,
            delay_samples: 37.0,
            smoothing_amount: 0.3,
            random_amount_db: 6.0,
            random_seed: 17,
            random_shift: 2,
            frequency_skew: 1.4,
            phase_band_delay_samples: 250.0,
            phase_band_seed: 4,
            minimum_phase: true,
            ..StageParams::neutral()
        };
        p.process_stage(&stage, &StageOutputs::new());
        let imag = max_imag_after_ifft(p.spectrum());
        assert!(imag < 1e-9, "time signal should be real, max imag {imag}");
    }

    #[test]
    fn test_gain_monotonic_inside_band() {
        let stage = |gain_db| StageParams {
            min_freq_hz: 500.0,
            max_freq_hz: 5000.0,
            gain_db,
            ..StageParams::neutral()
        };
        let strengths = Strengths::new(&stage(0.0), MAX_SAMPLE_LENGTH, SR);
        let base = noisy();
        let mut prev = half_magnitudes(base.spectrum());
        for g in [1.0, 3.0, 6.0] {
            let mut p = base.clone();
            p.process_stage(&stage(g), &StageOutputs::new());
            let mags = half_magnitudes(p.spectrum());
            for i in 0..mags.len() {
                if strengths.active_range().contains(&i) {
                    assert!(mags[i] > prev[i], "bin {i} did not grow at {g} dB");
                } else {
                    assert!((mags[i] - prev[i]).abs() < 1e-12 * prev[i].max(1.0), "bin {i} outside band changed");
                }
            }
            prev = mags;
        }
    }

    #[test]
    fn test_delay_100_samples() {
        let mut p = unit_impulse();
        let stage = StageParams {
            delay_samples: 100.0,
            ..StageParams::neutral()
        };
        p.process_stage(&stage, &StageOutputs::new());
        let peak = peak_index(&p.time_signal());
        assert!((99..=101).contains(&peak), "peak at {peak}");
    }

    #[test]
    fn test_minimum_phase_undoes_delay_from_earlier_stage() {
        let mut p = unit_impulse();
        let delay = StageParams {
            delay_samples: 300.0,
            max_freq_hz: SR / 2.0,
            ..StageParams::neutral()
        };
        p.process_stage(&delay, &StageOutputs::new());
        let min_phase = StageParams {
            minimum_phase: true,
            ..StageParams::neutral()
        };
        p.process_stage(&min_phase, &StageOutputs::new());
        assert_eq!(peak_index(&p.time_signal()), 0);
    }

    #[test]
    fn test_apply_source_uses_cache() {
        let mut source = ImpulseProcessor::from_samples(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0], SR);
        source.process_stage(&StageParams::neutral(), &StageOutputs::new());
        let mut cache = StageOutputs::new();
        cache.insert(0, source.spectrum().to_vec());

        let mut p = unit_impulse();
        let stage = StageParams {
            apply_source: Some(0),
            max_freq_hz: SR / 2.0,
            ..StageParams::neutral()
        };
        p.process_stage(&stage, &cache);
        assert_eq!(peak_index(&p.time_signal()), 5);

        // missing cache entry: skipped
        let mut q = unit_impulse();
        q.process_stage(&StageParams { apply_source: Some(3), ..stage }, &cache);
        assert_eq!(peak_index(&q.time_signal()), 0);
    }
}
