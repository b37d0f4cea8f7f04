use quill_core::ValidationError;
use thiserror::Error;

/// Result type for submissions
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Fallback notification when the server gave no usable message.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Request failed";

/// Every way a submission can end without being published.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Rejected before anything was sent
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Could not read attachment {field}: {source}")]
    Attachment {
        field: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode submission: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },

    /// Transport failure: unreachable, DNS, timeout, connection reset
    #[error("Network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// The transport succeeded but the body is not the expected JSON
    #[error("Invalid response from server (status {status})")]
    InvalidResponse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// Non-success status, or `success: false` in the body
    #[error("Request rejected (status {status}): {}", .message.as_deref().unwrap_or(FALLBACK_FAILURE_MESSAGE))]
    RequestRejected { status: u16, message: Option<String> },
}

impl SubmitError {
    pub(crate) fn network(source: reqwest::Error) -> Self {
        Self::Network { source }
    }

    /// True when nothing reached the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SubmitError::Invalid(_)
                | SubmitError::SubmissionInFlight
                | SubmitError::Attachment { .. }
                | SubmitError::Encode { .. }
        )
    }

    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            SubmitError::Invalid(reason) => Some(*reason),
            _ => None,
        }
    }

    /// The relay's own 500, raised when forwarding to the backend failed.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, SubmitError::RequestRejected { status, .. } if *status >= 500)
    }

    /// Single user-facing line for a toast or status bar.
    pub fn notification(&self) -> String {
        match self {
            SubmitError::Invalid(reason) => reason.to_string(),
            SubmitError::SubmissionInFlight => self.to_string(),
            SubmitError::Attachment { field, .. } => format!("Could not read the file for {field}"),
            SubmitError::Encode { .. } => FALLBACK_FAILURE_MESSAGE.to_string(),
            SubmitError::Network { .. } => "Network error. Please check your connection.".to_string(),
            SubmitError::InvalidResponse { .. } => "Invalid response from server".to_string(),
            SubmitError::RequestRejected { message, .. } => message
                .clone()
                .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string()),
        }
    }
}
