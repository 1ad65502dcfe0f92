//! Error types shared by the ports and the reconciliation engine.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error surfaced by the identity-provider and SCIM ports.
///
/// The two variants carry the retry classification: `Unavailable` is
/// transient (network failure, 5xx, throttling) and retriable at the host
/// level, `Rejected` is permanent for the run (permission denied, bad
/// filter, malformed request). The engine retries neither; it aborts on the
/// first hard error and relies on the next run to converge.
#[derive(Debug, Error)]
pub enum PortError {
    /// Network error, 5xx, or transport failure.
    #[error("service unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// 4xx with semantics other than a uniqueness conflict.
    #[error("request rejected: {message}")]
    Rejected {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        PortError::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        PortError::Rejected {
            message: message.into(),
            source: None,
        }
    }

    pub fn rejected_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Rejected {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether retrying the whole run may succeed without operator action.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Unavailable { .. })
    }
}

/// Error surfaced by the state repository.
#[derive(Debug, Error)]
pub enum StateError {
    /// No state document exists yet.
    #[error("state document not found")]
    NotFound,

    /// The backing store failed to read or write the document.
    #[error("state storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The stored document could not be encoded or decoded.
    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StateError {
    pub fn storage(message: impl Into<String>) -> Self {
        StateError::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StateError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Error returned by a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("identity provider: {0}")]
    IdentityProvider(#[source] PortError),

    #[error("scim: {0}")]
    Scim(#[source] PortError),

    #[error("state repository: {0}")]
    State(#[from] StateError),

    /// The computed operation set contradicts itself or the loaded state,
    /// e.g. an update whose record carries no downstream identifier.
    #[error("data invariant violated: {0}")]
    DataInvariant(String),

    /// The run was cancelled before completion; no state was written.
    #[error("sync cancelled")]
    Cancelled,
}

/// Result alias for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_transient() {
        assert!(PortError::unavailable("connection reset").is_transient());
        assert!(!PortError::rejected("permission denied").is_transient());
    }

    #[test]
    fn error_display() {
        let err = PortError::rejected("bad filter");
        assert_eq!(err.to_string(), "request rejected: bad filter");

        let err = SyncError::DataInvariant("user update without scimid".into());
        assert_eq!(
            err.to_string(),
            "data invariant violated: user update without scimid"
        );
    }

    #[test]
    fn error_with_source_preserves_cause() {
        let cause = std::io::Error::other("boom");
        let err = PortError::unavailable_with_source("request failed", cause);
        assert!(std::error::Error::source(&err).is_some());
    }
}
