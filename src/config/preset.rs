use serde::{Deserialize, Serialize};

use crate::error::IrError;
use crate::io::SampleLoader;

use super::{ImpulseConfig, MixingConfig};

/// Current preset format version.
pub const PRESET_VERSION: u32 = 1000;

/// Top-level aggregate: global rate/length, impulses, mixing, normalization.
///
/// Global sample rate and impulse length are pushed into every child
/// [`ImpulseConfig`]; use the setters (or [`ImpulsePreset::sync_children`]
/// after editing `impulse_configs` directly) to keep them consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpulsePreset {
    pub preset_version: u32,
    samplerate: f64,
    impulse_length: f64,
    pub impulse_configs: Vec<ImpulseConfig>,
    pub mixing_config: MixingConfig,
    pub normalize: bool,
}

impl Default for ImpulsePreset {
    fn default() -> Self {
        Self {
            preset_version: PRESET_VERSION,
            samplerate: 0.3333333,
            impulse_length: 0.75,
            impulse_configs: Vec::new(),
            mixing_config: MixingConfig::default(),
            normalize: false,
        }
    }
}

impl ImpulsePreset {
    /// Normalized sample-rate selector.
    pub fn samplerate(&self) -> f64 {
        self.samplerate
    }

    pub fn set_samplerate(&mut self, value: f64) {
        self.samplerate = value;
        self.sync_children();
    }

    /// Normalized impulse-length selector.
    pub fn impulse_length(&self) -> f64 {
        self.impulse_length
    }

    pub fn set_impulse_length(&mut self, value: f64) {
        self.impulse_length = value;
        self.sync_children();
    }

    /// 44100 / 48000 / 88200 / 96000 Hz
    pub fn samplerate_transformed(&self) -> u32 {
        if self.samplerate < 0.25 {
            44100
        } else if self.samplerate < 0.5 {
            48000
        } else if self.samplerate < 0.75 {
            88200
        } else {
            96000
        }
    }

    pub fn set_samplerate_transformed(&mut self, hz: u32) -> Result<(), IrError> {
        let value = match hz {
            44100 => 0.0,
            48000 => 0.3,
            88200 => 0.6,
            96000 => 0.99,
            _ => return Err(IrError::config(format!("unsupported sample rate {hz}"))),
        };
        self.set_samplerate(value);
        Ok(())
    }

    /// 256 / 512 / 1024 / 2048 / 4096 samples
    pub fn impulse_length_transformed(&self) -> usize {
        match ((self.impulse_length - 0.0001) * 5.0) as i64 {
            i64::MIN..=0 => 256,
            1 => 512,
            2 => 1024,
            3 => 2048,
            _ => 4096,
        }
    }

    pub fn set_impulse_length_transformed(&mut self, samples: usize) -> Result<(), IrError> {
        let value = match samples {
            256 => 0.0,
            512 => 0.21,
            1024 => 0.41,
            2048 => 0.65,
            4096 => 0.81,
            _ => return Err(IrError::config(format!("unsupported impulse length {samples}"))),
        };
        self.set_impulse_length(value);
        Ok(())
    }

    /// Append an impulse, adopting the preset's global rate and length.
    pub fn add_impulse(&mut self, mut impulse: ImpulseConfig) {
        impulse.samplerate = self.samplerate_transformed();
        impulse.impulse_length = self.impulse_length_transformed();
        self.impulse_configs.push(impulse);
    }

    /// Push the global sample rate and impulse length into every impulse.
    pub fn sync_children(&mut self) {
        let samplerate = self.samplerate_transformed();
        let length = self.impulse_length_transformed();
        for ic in &mut self.impulse_configs {
            ic.samplerate = samplerate;
            ic.impulse_length = length;
        }
    }

    /// Load every impulse source that has not been loaded yet.
    pub fn load_samples(&mut self, loader: &dyn SampleLoader) {
        for ic in self.impulse_configs.iter_mut().filter(|ic| !ic.is_source_loaded()) {
            ic.load_sample_data(loader);
        }
    }
}
