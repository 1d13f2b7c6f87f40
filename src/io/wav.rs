// WAV loading and impulse export (hound)

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::info;

use crate::error::IrError;
use crate::output::StereoSignal;

use super::{SampleData, SampleLoader};

/// Export bit depth.
const EXPORT_BITS: u16 = 24;

/// Reads sample files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavLoader;

impl SampleLoader for WavLoader {
    fn load(&self, path: &Path) -> Result<SampleData, IrError> {
        read_wav(path)
    }
}

/// Decode a WAV file (int or float) into per-channel `f64` samples.
pub fn read_wav(path: &Path) -> Result<SampleData, IrError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<_, _>>()?
        }
    };

    let mut data = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks(channels) {
        for (ch, &v) in frame.iter().enumerate() {
            data[ch].push(v);
        }
    }

    info!(
        "read_wav: {} ({} ch, {} Hz, {} frames)",
        path.display(),
        channels,
        spec.sample_rate,
        data[0].len()
    );
    Ok(SampleData::new(data, spec.sample_rate))
}

fn to_pcm24(v: f64) -> i32 {
    let max = ((1_i32 << (EXPORT_BITS - 1)) - 1) as f64;
    (v.clamp(-1.0, 1.0) * max).round() as i32
}

fn write_wav(path: &Path, channels: &[&[f64]], samplerate: u32) -> Result<(), IrError> {
    let spec = WavSpec {
        channels: channels.len() as u16,
        sample_rate: samplerate,
        bits_per_sample: EXPORT_BITS,
        sample_format: SampleFormat::Int,
    };
    let frames = channels.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut writer = WavWriter::create(path, spec)?;
    for i in 0..frames {
        for ch in channels {
            writer.write_sample(to_pcm24(ch.get(i).copied().unwrap_or(0.0)))?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Write a 24-bit stereo WAV.
pub fn write_stereo_wav(signal: &StereoSignal, samplerate: u32, path: &Path) -> Result<(), IrError> {
    write_wav(path, &[&signal.left, &signal.right], samplerate)
}

/// `name-L.wav` / `name-R.wav` next to `path`.
pub fn companion_paths(path: &Path) -> (PathBuf, PathBuf) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "impulse".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_string());
    (
        path.with_file_name(format!("{stem}-L.{ext}")),
        path.with_file_name(format!("{stem}-R.{ext}")),
    )
}

/// Write the stereo impulse plus its mono `-L` / `-R` companions.
/// Returns the written paths, stereo file first.
pub fn export_impulse(signal: &StereoSignal, samplerate: u32, path: &Path) -> Result<Vec<PathBuf>, IrError> {
    let (left_path, right_path) = companion_paths(path);
    write_stereo_wav(signal, samplerate, path)?;
    write_wav(&left_path, &[&signal.left], samplerate)?;
    write_wav(&right_path, &[&signal.right], samplerate)?;
    info!(
        "export_impulse: {} samples @ {} Hz -> {}",
        signal.len(),
        samplerate,
        path.display()
    );
    Ok(vec![path.to_path_buf(), left_path, right_path])
}
