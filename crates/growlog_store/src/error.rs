//! Error types for the storage layer.

use growlog_model::{Collection, ObjectId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced record does not exist.
    #[error("{collection} record not found: {id}")]
    NotFound {
        /// Collection that was searched.
        collection: Collection,
        /// The missing primary key.
        id: ObjectId,
    },

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a not-found error.
    #[must_use]
    pub const fn not_found(collection: Collection, id: ObjectId) -> Self {
        Self::NotFound { collection, id }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_collection() {
        let id = ObjectId::random();
        let err = StoreError::not_found(Collection::Plants, id);
        let msg = err.to_string();
        assert!(msg.contains("plants"));
        assert!(msg.contains(&id.to_string()));
    }
}
