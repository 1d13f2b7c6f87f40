// Preset JSON load/save

use std::path::Path;

use tracing::info;

use crate::config::{ImpulsePreset, PRESET_VERSION};
use crate::error::IrError;

/// Parse preset JSON. Newer format versions are rejected; global settings
/// are pushed into every impulse.
pub fn parse_preset(json: &str) -> Result<ImpulsePreset, IrError> {
    let mut preset: ImpulsePreset = serde_json::from_str(json)?;
    if preset.preset_version > PRESET_VERSION {
        return Err(IrError::config(format!(
            "Preset version {} is newer than supported (max {})",
            preset.preset_version, PRESET_VERSION
        )));
    }
    preset.sync_children();
    Ok(preset)
}

pub fn to_json(preset: &ImpulsePreset) -> Result<String, IrError> {
    Ok(serde_json::to_string_pretty(preset)?)
}

pub fn load_preset(path: &Path) -> Result<ImpulsePreset, IrError> {
    info!("load_preset: {}", path.display());
    let json = std::fs::read_to_string(path)?;
    let preset = parse_preset(&json)?;
    info!("load_preset: {} impulses loaded", preset.impulse_configs.len());
    Ok(preset)
}

pub fn save_preset(path: &Path, preset: &ImpulsePreset) -> Result<(), IrError> {
    info!("save_preset: {}", path.display());
    let json = to_json(preset)?;
    std::fs::write(path, &json)?;
    info!("save_preset: wrote {} bytes", json.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImpulseConfig, SpectrumStage};

    #[test]
    fn test_roundtrip_through_file() {
        let mut preset = ImpulsePreset::default();
        preset.add_impulse(ImpulseConfig::named("Close mic").with_stages(vec![
            SpectrumStage::default(),
            SpectrumStage {
                gain: 0.7,
                apply_source: Some(0),
                ..Default::default()
            },
        ]));
        preset.normalize = true;
        preset.set_impulse_length_transformed(1024).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        save_preset(&path, &preset).unwrap();
        let loaded = load_preset(&path).unwrap();
        assert_eq!(loaded, preset);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = parse_preset(r#"{ "preset_version": 2000 }"#).unwrap_err();
        assert!(err.to_string().contains("newer than supported"), "{err}");
    }

    #[test]
    fn test_partial_preset_syncs_children() {
        let json = r#"{
            "samplerate": 0.9,
            "impulse_length": 0.1,
            "impulse_configs": [ { "name": "a" }, { "name": "b", "samplerate": 22050 } ]
        }"#;
        let preset = parse_preset(json).unwrap();
        assert_eq!(preset.samplerate_transformed(), 96000);
        for ic in &preset.impulse_configs {
            assert_eq!(ic.samplerate, 96000);
            assert_eq!(ic.impulse_length, 256);
        }
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(parse_preset("{ not json"), Err(IrError::Json(_))));
    }
}
