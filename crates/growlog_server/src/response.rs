//! Wire responses.

use crate::error::ServerError;
use growlog_model::{EndId, ObjectId, UserId};
use serde::Serialize;
use serde_json::{json, Value};

/// A transport-agnostic response: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl Response {
    /// 201 with the minted primary key: `{"id": "..."}`.
    #[must_use]
    pub fn created(id: ObjectId) -> Self {
        Self {
            status: 201,
            body: json!({ "id": id }),
        }
    }

    /// 201 with the minted user ID: `{"id": "..."}`.
    #[must_use]
    pub fn created_user(id: UserId) -> Self {
        Self {
            status: 201,
            body: json!({ "id": id }),
        }
    }

    /// 201 for a registered end: `{"id": "...", "token": "..."}`.
    #[must_use]
    pub fn created_end(id: EndId, token: &str) -> Self {
        Self {
            status: 201,
            body: json!({ "id": id.0, "token": token }),
        }
    }

    /// 200 `{"status": "OK"}`.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: json!({ "status": "OK" }),
        }
    }

    /// 200 `{"token": "..."}`.
    #[must_use]
    pub fn token(token: &str) -> Self {
        Self {
            status: 200,
            body: json!({ "token": token }),
        }
    }

    /// 200 `{"items": [...]}` for pull responses.
    pub fn items<T: Serialize>(items: &[T]) -> Result<Self, ServerError> {
        let body = serde_json::to_value(items)
            .map_err(|e| ServerError::Validation(e.to_string()))?;
        Ok(Self {
            status: 200,
            body: json!({ "items": body }),
        })
    }

    /// An error response: the mapped status and `{"error": "..."}`.
    #[must_use]
    pub fn error(err: &ServerError) -> Self {
        Self {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

impl From<ServerError> for Response {
    fn from(err: ServerError) -> Self {
        Self::error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;

    #[test]
    fn created_carries_the_plain_uuid() {
        let id = ObjectId::random();
        let resp = Response::created(id);
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body["id"], json!(id.0.to_string()));
    }

    #[test]
    fn errors_carry_their_wire_message() {
        let resp = Response::from(ServerError::from(DecodeError::Empty));
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], "Request body must not be empty");
    }
}
