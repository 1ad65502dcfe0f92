//! SCIM error types with transient/permanent classification.

use thiserror::Error;

use dirsync_core::PortError;

/// Error from the SCIM endpoint or its transport.
#[derive(Debug, Error)]
pub enum ScimError {
    /// Connection, TLS, timeout, or body-decoding failure.
    #[error("scim transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status other than a uniqueness conflict.
    #[error("scim api error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// Uniqueness collision on create; resolved locally by fetching the
    /// existing resource, never surfaced past the adapter.
    #[error("scim conflict: {message}")]
    Conflict { message: String },

    /// A lookup that was expected to match found nothing.
    #[error("scim resource not found: {0}")]
    NotFound(String),
}

impl ScimError {
    /// Transient errors may resolve on a later run without operator action.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScimError::Transport(_) => true,
            ScimError::Api { status, .. } => *status == 429 || *status >= 500,
            ScimError::Conflict { .. } | ScimError::NotFound(_) => false,
        }
    }
}

impl From<ScimError> for PortError {
    fn from(err: ScimError) -> Self {
        if err.is_transient() {
            PortError::unavailable_with_source(err.to_string(), err)
        } else {
            PortError::rejected_with_source(err.to_string(), err)
        }
    }
}

/// Result type for SCIM operations.
pub type ScimResult<T> = Result<T, ScimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_transient() {
        assert!(ScimError::Api {
            status: 429,
            message: "slow down".into()
        }
        .is_transient());
        assert!(ScimError::Api {
            status: 502,
            message: "bad gateway".into()
        }
        .is_transient());
    }

    #[test]
    fn conflicts_and_rejections_are_permanent() {
        assert!(!ScimError::Conflict {
            message: "userName taken".into()
        }
        .is_transient());
        assert!(!ScimError::Api {
            status: 403,
            message: "forbidden".into()
        }
        .is_transient());
        assert!(!ScimError::NotFound("user".into()).is_transient());
    }
}
