pub mod config;
pub mod dsp;
pub mod eq;
pub mod error;
pub mod io;
pub mod output;
pub mod params;
pub mod preset;
pub mod spectral;
pub mod stereo;

use std::path::{Path, PathBuf};

use tracing::info;

pub use config::{ImpulseConfig, ImpulsePreset, MixingConfig, OutputStage, SpectrumStage};
pub use error::IrError;
pub use output::StereoSignal;
pub use preset::PresetProcessor;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load a preset file, render it (sample files are read on demand) and
/// export the stereo impulse plus `-L` / `-R` companions next to `out_path`.
pub fn render_preset_file(preset_path: &Path, out_path: &Path) -> Result<Vec<PathBuf>, IrError> {
    let mut preset = io::preset::load_preset(preset_path)?;
    let signal = PresetProcessor::new().process(&mut preset)?;
    let written = io::export_impulse(&signal, preset.samplerate_transformed(), out_path)?;
    info!(
        "render_preset_file: {} -> {} files",
        preset_path.display(),
        written.len()
    );
    Ok(written)
}
