use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dsp::resample_spline;
use crate::io::{SampleData, SampleLoader};

use super::{OutputStage, SpectrumStage, MAX_SAMPLE_LENGTH};

/// One sound source: a sampled impulse reshaped by a chain of spectrum stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpulseConfig {
    pub name: String,
    pub file_path: Option<PathBuf>,
    /// Fraction of the (resampled) source skipped before the working window
    pub sample_start: f64,
    pub enable: bool,
    pub solo: bool,
    /// Working sample rate, kept in sync with the owning preset
    pub samplerate: u32,
    /// Target impulse length, kept in sync with the owning preset
    pub impulse_length: usize,
    /// Use the right channel of a stereo source file
    pub use_right_channel: bool,
    pub spectrum_stages: Vec<SpectrumStage>,
    pub output_stage: OutputStage,

    #[serde(skip)]
    source: Option<SampleData>,
    #[serde(skip)]
    source_loaded: bool,
}

impl Default for ImpulseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            file_path: None,
            sample_start: 0.0,
            enable: true,
            solo: false,
            samplerate: 48000,
            impulse_length: 2048,
            use_right_channel: false,
            spectrum_stages: vec![SpectrumStage::default()],
            output_stage: OutputStage::default(),
            source: None,
            source_loaded: false,
        }
    }
}

impl ImpulseConfig {
    /// Default impulse (one default stage, unit-impulse fallback) named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Replace the stage chain.
    pub fn with_stages(mut self, stages: Vec<SpectrumStage>) -> Self {
        self.spectrum_stages = stages;
        self
    }

    /// Source file to read on first use.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self.source = None;
        self.source_loaded = false;
        self
    }

    pub fn is_source_loaded(&self) -> bool {
        self.source_loaded
    }

    pub fn source(&self) -> Option<&SampleData> {
        self.source.as_ref()
    }

    pub fn file_is_stereo(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is_stereo())
    }

    /// Attach already-decoded sample data (bypasses the loader).
    pub fn set_source(&mut self, data: Option<SampleData>) {
        self.source = data;
        self.source_loaded = true;
        if !self.file_is_stereo() {
            self.use_right_channel = false;
        }
    }

    /// Read the source file through `loader`. A missing or unreadable file is
    /// not an error: the impulse falls back to a unit impulse.
    pub fn load_sample_data(&mut self, loader: &dyn SampleLoader) {
        let data = match &self.file_path {
            Some(path) if !path.as_os_str().is_empty() => match loader.load(path) {
                Ok(data) => {
                    debug!(
                        "load_sample_data: '{}' {} ch, {} Hz, {} samples",
                        self.name,
                        data.channel_count(),
                        data.samplerate,
                        data.len()
                    );
                    Some(data)
                }
                Err(e) => {
                    warn!(
                        "load_sample_data: '{}' falling back to unit impulse ({}): {}",
                        self.name,
                        path.display(),
                        e
                    );
                    None
                }
            },
            _ => None,
        };
        self.set_source(data);
    }

    /// Source samples converted to the working rate, offset by `sample_start`
    /// and zero-padded / truncated to exactly [`MAX_SAMPLE_LENGTH`].
    pub fn converted_sample_data(&self) -> Vec<f64> {
        let (wave, skip) = match &self.source {
            Some(src) if !src.is_empty() => {
                let channel = if src.is_stereo() && self.use_right_channel { 1 } else { 0 };
                let data = resample_spline(
                    src.channel(channel),
                    src.samplerate as f64,
                    self.samplerate as f64,
                );
                let len = data.len();
                let mut skip = (self.sample_start.max(0.0) * len as f64) as usize;
                if skip >= len {
                    skip = len.saturating_sub(1);
                }
                (data, skip)
            }
            _ => (vec![1.0, 0.0, 0.0, 0.0], 0),
        };

        let mut out: Vec<f64> = wave.into_iter().skip(skip).take(MAX_SAMPLE_LENGTH).collect();
        out.resize(MAX_SAMPLE_LENGTH, 0.0);
        out
    }
}
