//! Request-level errors and their status mapping.

use crate::auth::AuthError;
use crate::decode::DecodeError;
use growlog_engine::EngineError;
use thiserror::Error;

/// Anything a request handler can fail with.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The token is missing, invalid, or expired.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The body decoded but fails a domain rule (nickname length,
    /// missing end claim, bad credentials wear this too).
    #[error("{0}")]
    Validation(String),

    /// Login with an unknown nickname or a wrong password.
    #[error("invalid credentials")]
    BadCredentials,

    /// The sync core rejected or failed the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// No route matches the request.
    #[error("not found")]
    UnknownRoute,
}

impl ServerError {
    /// The HTTP status this error maps to.
    ///
    /// Client mistakes are 400, authentication and ownership failures
    /// are 401, oversized bodies 413, unknown routes 404; only backend
    /// failures surface as 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Decode(DecodeError::TooLarge) => 413,
            Self::Decode(_) | Self::Validation(_) => 400,
            Self::Auth(_) | Self::BadCredentials => 401,
            Self::Engine(EngineError::OwnershipMismatch) => 401,
            Self::Engine(e) if e.is_client_error() => 400,
            Self::Engine(_) => 500,
            Self::UnknownRoute => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use growlog_model::{Collection, ObjectId};
    use growlog_store::StoreError;

    #[test]
    fn statuses_follow_the_fault_line() {
        assert_eq!(ServerError::from(DecodeError::Empty).status(), 400);
        assert_eq!(ServerError::from(DecodeError::TooLarge).status(), 413);
        assert_eq!(ServerError::from(AuthError::Malformed).status(), 401);
        assert_eq!(
            ServerError::from(EngineError::OwnershipMismatch).status(),
            401
        );
        assert_eq!(
            ServerError::from(EngineError::NotFound {
                collection: Collection::Plants,
                id: ObjectId::random(),
            })
            .status(),
            400
        );
        assert_eq!(
            ServerError::from(EngineError::Store(StoreError::backend("db down"))).status(),
            500
        );
        assert_eq!(ServerError::UnknownRoute.status(), 404);
    }
}
