//! Error types shared by the segmentation engine and its collaborators

use std::path::PathBuf;
use thiserror::Error;

use crate::config::OutputFormat;

/// Boxed cause carried by collaborator failures
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for splitter operations
pub type SplitResult<T> = Result<T, SplitError>;

/// Errors that abort a splitting run
#[derive(Debug, Error)]
pub enum SplitError {
    /// Input could not be read or decoded; fatal for the whole batch
    #[error("failed to decode {}: {cause}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        cause: Cause,
    },

    /// A segment could not be exported in the requested format
    #[error("failed to encode {segment} as {format}: {cause}")]
    Encode {
        segment: String,
        format: OutputFormat,
        #[source]
        cause: Cause,
    },

    #[error("invalid value for {field}: {value}")]
    InvalidParameter { field: &'static str, value: String },

    #[error("no input files given")]
    EmptyBatch,

    #[error("run cancelled")]
    Cancelled,

    #[error("failed to write archive {}: {cause}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        cause: Cause,
    },

    #[error("failed to load config {}: {cause}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        cause: Cause,
    },
}

impl SplitError {
    pub fn decode(path: impl Into<PathBuf>, cause: impl Into<Cause>) -> Self {
        Self::Decode {
            path: path.into(),
            cause: cause.into(),
        }
    }

    pub fn encode(segment: impl Into<String>, format: OutputFormat, cause: impl Into<Cause>) -> Self {
        Self::Encode {
            segment: segment.into(),
            format,
            cause: cause.into(),
        }
    }

    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            field,
            value: value.to_string(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>, cause: impl Into<Cause>) -> Self {
        Self::Archive {
            path: path.into(),
            cause: cause.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_names_path() {
        let err = SplitError::decode("/music/broken.mp3", anyhow::anyhow!("bad frame"));
        let msg = err.to_string();
        assert!(msg.contains("/music/broken.mp3"));
        assert!(msg.contains("bad frame"));
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = SplitError::invalid("target_duration_ms", 0);
        assert_eq!(err.to_string(), "invalid value for target_duration_ms: 0");
    }
}
