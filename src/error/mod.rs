use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid params - {0}")]
    InvalidParams(String),

    #[error("Internal error - {0}")]
    Internal(String),

    #[error("IO error - {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error - {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image fetch failed - {0}")]
    FetchFailure(String),

    #[error("Image decode failed - {0}")]
    DecodeFailure(String),

    #[error("Canvas size mismatch - expected {expected}x{expected}, got {actual}x{actual}")]
    CanvasSizeMismatch { expected: u32, actual: u32 },

    #[error("No pending edits to submit")]
    EmptyBatch,

    #[error("Batch of {count} pixels exceeds the {max} pixels-per-transaction limit")]
    OversizedBatch { count: usize, max: usize },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Session is not in draw mode")]
    NotInDrawMode,

    #[error("Ledger submission failed - {0}")]
    SubmissionFailed(String),

    #[error("Transaction confirmation failed - {0}")]
    ConfirmationFailed(String),

    #[error("TryInitError - {0}")]
    TryInitError(#[from] tracing_subscriber::util::TryInitError),
}

impl EngineError {
    /// Formats the error as a notification the host UI can show directly.
    /// Internal detail is logged here and never reaches the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidParams(msg) => msg.clone(),
            Self::Internal(error) => {
                tracing::error!(error = %error, "Internal error");
                "Something went wrong. Please try again.".to_string()
            }
            Self::IoError(error) => {
                tracing::error!(error = %error, "IO error");
                "Something went wrong. Please try again.".to_string()
            }
            Self::SerializationError(error) => {
                tracing::error!(error = %error, "Serialization error");
                "Something went wrong. Please try again.".to_string()
            }
            Self::FetchFailure(error) => {
                tracing::error!(error = %error, "Canvas image fetch failed");
                "Couldn't load the latest canvas. It will refresh automatically.".to_string()
            }
            Self::DecodeFailure(error) => {
                tracing::error!(error = %error, "Canvas image decode failed");
                "Couldn't load the latest canvas. It will refresh automatically.".to_string()
            }
            Self::CanvasSizeMismatch { .. } => {
                tracing::error!(error = %self, "Canvas size mismatch");
                "Couldn't load the latest canvas. It will refresh automatically.".to_string()
            }
            Self::EmptyBatch => "Draw something before submitting.".to_string(),
            Self::OversizedBatch { count, max } => format!(
                "Your drawing has {count} pixels, over the {max} pixel limit. Please submit a smaller drawing.",
            ),
            Self::SubmissionInFlight => {
                "A submission is still being confirmed. Please wait for it to finish.".to_string()
            }
            Self::NotInDrawMode => "Enter draw mode to start drawing.".to_string(),
            Self::SubmissionFailed(error) => {
                tracing::error!(error = %error, "Draw submission failed");
                "Failed to submit your drawing. Your edits are kept, please try again.".to_string()
            }
            Self::ConfirmationFailed(error) => {
                tracing::error!(error = %error, "Transaction confirmation failed");
                "Failed to submit your drawing. Your edits are kept, please try again.".to_string()
            }
            Self::TryInitError(error) => {
                tracing::error!(error = %error, "TryInitError");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
