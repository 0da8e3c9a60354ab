use eventbook_store::StoreError;
use thiserror::Error;

/// Domain-specific errors using thiserror.
///
/// Every variant maps to exactly one HTTP problem class in
/// `api::rest::error`; services never construct HTTP responses themselves.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{reason}")]
    Forbidden { reason: String },

    #[error("{reason}")]
    Unauthorized { reason: String },

    #[error("{reason}")]
    BadRequest { reason: String },

    #[error("{reason}")]
    Conflict { reason: String },

    #[error("{reason}")]
    InvalidArgument { reason: String },

    /// The first leg of a dual write committed but the second failed.
    /// The caller must not treat the operation as applied.
    #[error("partial update: applied {applied}, failed {failed}: {reason}")]
    PartialUpdate {
        applied: String,
        failed: String,
        reason: String,
    },

    /// Lost the optimistic-concurrency race on every retry.
    #[error("concurrent update on {what}, retries exhausted")]
    WriteConflict { what: String },

    #[error("upstream provider failure: {message}")]
    Upstream { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn partial_update(
        applied: impl Into<String>,
        failed: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PartialUpdate {
            applied: applied.into(),
            failed: failed.into(),
            reason: reason.into(),
        }
    }

    pub fn write_conflict(what: impl Into<String>) -> Self {
        Self::WriteConflict { what: what.into() }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True when the operation lost an optimistic-concurrency race and a
    /// re-read + retry may succeed.
    #[must_use]
    pub fn is_write_conflict(&self) -> bool {
        matches!(self, Self::WriteConflict { .. })
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::VersionConflict { collection, .. } => Self::WriteConflict {
                what: collection,
            },
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}
