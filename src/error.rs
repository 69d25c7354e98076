//! Error handling for rtap-dsp
//!
//! Only control and offline paths return errors. Block processing and the
//! scalar setters clamp instead, since an audio callback has nowhere to
//! propagate a failure to.

use thiserror::Error;

/// Result type alias for rtap-dsp operations
pub type Result<T> = std::result::Result<T, RtapError>;

/// Main error type for rtap-dsp operations
#[derive(Error, Debug)]
pub enum RtapError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Parameter Errors
    #[error("Unknown parameter '{name}' for {effect_type}")]
    UnknownParameter { effect_type: String, name: String },

    #[error("Invalid value for {param}: expected {expected}, got {value}")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Chain Errors
    #[error("Effect not found: {effect_id}")]
    EffectNotFound { effect_id: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RtapError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            RtapError::FileNotFound { .. } => "FILE_NOT_FOUND",
            RtapError::InvalidAudio { .. } => "INVALID_AUDIO",
            RtapError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            RtapError::EmptyAudio => "EMPTY_AUDIO",
            RtapError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            RtapError::InvalidParameter { .. } => "INVALID_PARAMETER",
            RtapError::EffectNotFound { .. } => "EFFECT_NOT_FOUND",
            RtapError::Io(_) => "IO_ERROR",
            RtapError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RtapError::FileNotFound { .. }
                | RtapError::UnsupportedFormat { .. }
                | RtapError::UnknownParameter { .. }
                | RtapError::InvalidParameter { .. }
                | RtapError::EffectNotFound { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RtapError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            RtapError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the file as PCM or float WAV",
            ],
            RtapError::UnsupportedFormat { .. } => vec![
                "Convert the file to a mono WAV first",
                "Supported bit depths: 16, 24, 32 (float)",
            ],
            RtapError::UnknownParameter { .. } => vec![
                "Parameters: mix, algorithm, saturation, frequency, quality, gain, bandpass",
            ],
            RtapError::InvalidParameter { .. } => vec![
                "Numeric parameters expect a JSON number",
                "'bandpass' and 'enabled' expect a JSON bool",
            ],
            _ => vec![],
        }
    }

    /// Shorthand for a wrongly typed parameter value
    pub(crate) fn invalid_param(param: &str, expected: &str, value: &serde_json::Value) -> Self {
        RtapError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RtapError::FileNotFound {
            path: "test.wav".to_string(),
            source: None,
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert_eq!(RtapError::EmptyAudio.error_code(), "EMPTY_AUDIO");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = RtapError::UnknownParameter {
            effect_type: "distortion".to_string(),
            name: "drive".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.is_recoverable());
        assert!(!RtapError::EmptyAudio.is_recoverable());
    }

    #[test]
    fn test_invalid_param_message() {
        let err = RtapError::invalid_param("mix", "number", &serde_json::json!("loud"));
        assert_eq!(
            err.to_string(),
            "Invalid value for mix: expected number, got \"loud\""
        );
    }
}
