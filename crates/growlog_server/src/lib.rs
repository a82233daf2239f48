//! Request layer for the growlog diary backend.
//!
//! Wraps the sync engine with everything a client-facing deployment
//! needs: HMAC bearer tokens, salted password storage, size-capped JSON
//! decoding, a route table, and the error-to-status mapping. Transport
//! is left to the embedder; [`handle`] takes a method, path, token, and
//! body and returns a status plus JSON body.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod decode;
mod error;
mod handlers;
mod password;
mod response;
mod routes;

pub use auth::{AuthError, Claims, TokenSigner};
pub use decode::{decode_json, DecodeError, MAX_BODY_BYTES};
pub use error::ServerError;
pub use handlers::DiaryService;
pub use response::Response;
pub use routes::handle;
