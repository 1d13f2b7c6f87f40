// Preset summation driver: every impulse through its stages, then the mix bus

use tracing::{debug, info};

use crate::config::{ImpulsePreset, MAX_SAMPLE_LENGTH, STEREO_BAND_COUNT};
use crate::eq::EqProcessor;
use crate::error::IrError;
use crate::io::{SampleLoader, WavLoader};
use crate::output::{OutputProcessor, StereoSignal};
use crate::spectral::{ImpulseProcessor, StageOutputs};
use crate::stereo::StereoEnhancer;

/// Peaks below this are not amplified further by normalization.
const NORMALIZE_FLOOR: f64 = 0.01;

/// Renders an [`ImpulsePreset`] to its final stereo impulse.
///
/// Sample files not yet loaded are read through `loader` on first use.
/// Keeps the final spectrum of every impulse from the last run so stages
/// can reference an earlier impulse ("apply source").
#[derive(Debug)]
pub struct PresetProcessor<L: SampleLoader = WavLoader> {
    loader: L,
    stage_outputs: StageOutputs,
}

impl PresetProcessor<WavLoader> {
    pub fn new() -> Self {
        Self::with_loader(WavLoader)
    }
}

impl Default for PresetProcessor<WavLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: SampleLoader> PresetProcessor<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            stage_outputs: StageOutputs::new(),
        }
    }

    /// Final spectra of the last run, keyed by impulse index.
    pub fn stage_outputs(&self) -> &StageOutputs {
        &self.stage_outputs
    }

    pub fn process(&mut self, preset: &mut ImpulsePreset) -> Result<StereoSignal, IrError> {
        validate(preset)?;
        preset.load_samples(&self.loader);
        self.stage_outputs.clear();

        let samplerate = preset.samplerate_transformed() as f64;
        let length = preset.impulse_length_transformed();
        let has_solo = preset.impulse_configs.iter().any(|ic| ic.solo);

        let mut sum = StereoSignal::silent(MAX_SAMPLE_LENGTH);
        let mut contributing = 0;

        for (idx, ic) in preset.impulse_configs.iter().enumerate() {
            let mut processor = ImpulseProcessor::new(ic);
            processor.process_all(ic, &self.stage_outputs);
            self.stage_outputs.insert(idx, processor.spectrum().to_vec());

            let signal = StereoSignal::dual_mono(processor.time_signal());
            let output = OutputProcessor::new(&ic.output_stage, ic.impulse_length, ic.samplerate as f64)
                .process(&signal);

            let included = (!has_solo || ic.solo) && (ic.enable || ic.solo);
            debug!("process: impulse {} '{}' included={}", idx, ic.name, included);
            if included {
                sum.accumulate(&output);
                contributing += 1;
            }
        }

        let mixing = &preset.mixing_config;
        let equalized = EqProcessor::new(mixing, samplerate).process(&sum);
        let widened = StereoEnhancer::new(mixing, samplerate).process(&equalized);
        let mut result = OutputProcessor::new(&mixing.output_stage, length, samplerate).process(&widened);

        if preset.normalize {
            let peak = result.peak().max(NORMALIZE_FLOOR);
            result.scale(1.0 / peak);
        }
        result.truncate(length);

        info!(
            "process: {} impulses ({} contributing) -> {} samples @ {} Hz",
            preset.impulse_configs.len(),
            contributing,
            length,
            samplerate
        );
        Ok(result)
    }
}

/// Structural checks that the processors rely on.
pub fn validate(preset: &ImpulsePreset) -> Result<(), IrError> {
    let mixing = &preset.mixing_config;
    if mixing.stereo_eq.len() != STEREO_BAND_COUNT || mixing.stereo_phase.len() != STEREO_BAND_COUNT {
        return Err(IrError::config(format!(
            "stereo band arrays must hold {} entries (eq: {}, phase: {})",
            STEREO_BAND_COUNT,
            mixing.stereo_eq.len(),
            mixing.stereo_phase.len()
        )));
    }
    for (idx, ic) in preset.impulse_configs.iter().enumerate() {
        for stage in &ic.spectrum_stages {
            if let Some(src) = stage.apply_source {
                if src >= idx {
                    return Err(IrError::config(format!(
                        "impulse {} '{}' applies source {}, which is not an earlier impulse",
                        idx, ic.name, src
                    )));
                }
            }
        }
    }
    Ok(())
}
