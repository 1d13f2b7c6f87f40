pub mod preset;
mod wav;

pub use wav::{companion_paths, export_impulse, read_wav, write_stereo_wav, WavLoader};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// Decoded source audio: one `Vec<f64>` per channel at `samplerate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    pub channels: Vec<Vec<f64>>,
    pub samplerate: u32,
}

impl SampleData {
    pub fn new(channels: Vec<Vec<f64>>, samplerate: u32) -> Self {
        Self {
            channels,
            samplerate,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_stereo(&self) -> bool {
        self.channels.len() >= 2
    }

    /// Frames in the longest channel.
    pub fn len(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples of channel `idx`; empty if the channel does not exist.
    pub fn channel(&self, idx: usize) -> &[f64] {
        self.channels.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Source of decoded sample files.
pub trait SampleLoader {
    fn load(&self, path: &Path) -> Result<SampleData, IrError>;
}
