// Data model: impulse presets and their normalized controls

mod impulse;
mod mixing;
mod output;
mod preset;
mod stage;

pub use impulse::ImpulseConfig;
pub use mixing::{EqBandConfig, MixingConfig, EQ_BAND_COUNT, STEREO_BAND_COUNT};
pub use output::{OutputParams, OutputStage};
pub use preset::{ImpulsePreset, PRESET_VERSION};
pub use stage::{SpectrumStage, StageParams};

/// Working buffer length of every per-impulse FFT.
pub const MAX_SAMPLE_LENGTH: usize = 8192;

/// Upper end of the stage frequency controls, Hz.
pub const MAX_FREQUENCY: f64 = 22000.0;
