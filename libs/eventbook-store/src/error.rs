use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("collection '{collection}' already contains a record with id {id}")]
    DuplicateId { collection: String, id: Uuid },

    #[error("collection '{collection}' has no record with id {id}")]
    RecordNotFound { collection: String, id: Uuid },

    #[error(
        "version conflict in collection '{collection}' for record {id}: \
         expected {expected}, found {actual}"
    )]
    VersionConflict {
        collection: String,
        id: Uuid,
        expected: u64,
        actual: u64,
    },

    #[error("failed to encode record for collection '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode record in collection '{collection}': {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store image at {path} is not valid JSON: {source}")]
    CorruptImage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("i/o failure on store image at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn duplicate_id(collection: &str, id: Uuid) -> Self {
        Self::DuplicateId {
            collection: collection.to_owned(),
            id,
        }
    }

    pub(crate) fn record_not_found(collection: &str, id: Uuid) -> Self {
        Self::RecordNotFound {
            collection: collection.to_owned(),
            id,
        }
    }

    pub(crate) fn version_conflict(collection: &str, id: Uuid, expected: u64, actual: u64) -> Self {
        Self::VersionConflict {
            collection: collection.to_owned(),
            id,
            expected,
            actual,
        }
    }

    pub(crate) fn encode(collection: &str, source: serde_json::Error) -> Self {
        Self::Encode {
            collection: collection.to_owned(),
            source,
        }
    }

    pub(crate) fn decode(collection: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            collection: collection.to_owned(),
            source,
        }
    }

    /// True when the error is a lost race on `replace`, i.e. the caller
    /// should re-read the record and retry.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
