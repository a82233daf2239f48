//! Request body decoding.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Maximum accepted request body, 1 MiB.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Body decoding failures. All map to 4xx statuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The body exceeds [`MAX_BODY_BYTES`].
    #[error("Request body must not be larger than 1MB")]
    TooLarge,
    /// The body is empty.
    #[error("Request body must not be empty")]
    Empty,
    /// The body is not valid JSON for the expected shape. Carries the
    /// parser's message, including line and column.
    #[error("{0}")]
    Malformed(String),
}

/// Decodes a JSON request body with the standard size and shape checks.
///
/// Unknown fields are rejected by the entity types themselves, so a
/// client typo surfaces here as `Malformed` instead of silently
/// dropping data.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    if body.len() > MAX_BODY_BYTES {
        return Err(DecodeError::TooLarge);
    }
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }
    serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))
}
