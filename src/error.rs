use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Preset JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {message}")]
    Config { message: String },
}

impl IrError {
    pub fn config(message: impl Into<String>) -> Self {
        IrError::Config {
            message: message.into(),
        }
    }
}

// Serialize as plain message so errors can travel inside JSON reports
impl Serialize for IrError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = IrError::config("bad stereo band count");
        assert_eq!(err.to_string(), "Invalid config: bad stereo band count");
    }

    #[test]
    fn test_serialize_as_string() {
        let err = IrError::config("stereo_eq has 15 entries");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Invalid config: stereo_eq has 15 entries\"");
    }
}
