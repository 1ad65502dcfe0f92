//! Google Directory error types with transient/permanent classification.

use thiserror::Error;

use dirsync_core::PortError;

/// Error from the Directory API or its transport.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Connection, TLS, timeout, or body-decoding failure.
    #[error("directory transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status returned by the Directory API.
    #[error("directory api error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// The token provider could not produce a usable access token.
    #[error("directory authentication failed: {0}")]
    Auth(String),
}

impl GoogleError {
    /// Transient errors may resolve on a later run without operator action.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            GoogleError::Transport(_) => true,
            GoogleError::Api { status, .. } => *status == 429 || *status >= 500,
            GoogleError::Auth(_) => false,
        }
    }
}

impl From<GoogleError> for PortError {
    fn from(err: GoogleError) -> Self {
        if err.is_transient() {
            PortError::unavailable_with_source(err.to_string(), err)
        } else {
            PortError::rejected_with_source(err.to_string(), err)
        }
    }
}

/// Result type for Directory operations.
pub type GoogleResult<T> = Result<T, GoogleError>;
