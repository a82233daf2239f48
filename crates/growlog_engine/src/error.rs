//! Engine error types.

use growlog_model::{Collection, ObjectId};
use growlog_store::StoreError;
use thiserror::Error;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by sync operations.
///
/// Variants are split along the caller's fault line: everything except a
/// backend [`StoreError`] is a client error and maps to a 4xx status at
/// the transport layer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mutation that requires a primary key arrived without one.
    #[error("Missing object's ID")]
    MissingObjectId,

    /// A referenced record does not exist.
    #[error("{collection} record not found: {id}")]
    NotFound {
        /// Collection the lookup ran against.
        collection: Collection,
        /// The missing primary key.
        id: ObjectId,
    },

    /// The record (or its parent) belongs to a different user.
    #[error("record is not owned by the authenticated user")]
    OwnershipMismatch,

    /// The plant subtree above the record has been archived.
    #[error("plant is archived")]
    Archived,

    /// The storage layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Whether this error was caused by the request rather than the
    /// backend.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::MissingObjectId
            | Self::NotFound { .. }
            | Self::OwnershipMismatch
            | Self::Archived => true,
            Self::Store(StoreError::NotFound { .. } | StoreError::Conflict(_)) => true,
            Self::Store(StoreError::Backend(_)) => false,
        }
    }
}
