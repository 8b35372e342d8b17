use std::path::PathBuf;

use thiserror::Error;

use crate::transcription::domain::api_error::ApiError;

/// Input rejected before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    EmptyUrl,
    #[error("Please enter a valid URL")]
    InvalidUrl(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("file is empty: {}", .0.display())]
    EmptyFile(PathBuf),
    #[error("unsupported file type '{0}', select an audio or video file")]
    UnsupportedMediaType(String),
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
    #[error("transcription {0} is not completed yet")]
    NotCompleted(String),
    #[error("segment {0} not found")]
    UnknownSegment(String),
    #[error("expected SEGMENT_ID=TEXT, got '{0}'")]
    MalformedEdit(String),
    #[error("no segment edits given")]
    NoEdits,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    /// Whether the error was raised locally, without reaching the service.
    pub fn is_local(&self) -> bool {
        matches!(self, WorkflowError::Validation(_) | WorkflowError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmptyUrl.to_string(), "Please enter a URL");
        assert_eq!(
            ValidationError::InvalidUrl("x".into()).to_string(),
            "Please enter a valid URL"
        );
    }

    #[test]
    fn test_is_local() {
        assert!(WorkflowError::from(ValidationError::EmptyUrl).is_local());
        assert!(!WorkflowError::from(ApiError::Transport("down".into())).is_local());
    }

    #[test]
    fn test_api_error_message_passes_through() {
        let err = WorkflowError::from(ApiError::from_response(
            400,
            r#"{"detail": "Failed to download file"}"#,
        ));
        assert_eq!(err.to_string(), "Failed to download file");
    }
}
