//! Compact HMAC-signed auth tokens.
//!
//! A token is 73 bytes: the user ID (16), an end-present flag (1), the
//! end ID or zeroes (16), the issue timestamp in big-endian unix
//! milliseconds (8), and an HMAC-SHA256 tag over the preceding 41 bytes
//! (32). Tokens travel hex-encoded. Login mints a user-only token; end
//! registration mints the (user, end) token sync endpoints require.

use growlog_model::{EndId, UserId};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const PAYLOAD_LEN: usize = 16 + 1 + 16 + 8;
const TOKEN_LEN: usize = PAYLOAD_LEN + 32;

/// Token verification failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The token is absent, not hex, or the wrong length.
    #[error("malformed token")]
    Malformed,
    /// The HMAC tag does not match.
    #[error("invalid token signature")]
    BadSignature,
    /// The token is older than the configured lifetime.
    #[error("token expired")]
    Expired,
}

/// What a verified token asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    /// The authenticated user.
    pub user_id: UserId,
    /// The acting end, present on tokens minted at end registration.
    pub end_id: Option<EndId>,
    /// Issue time, unix milliseconds.
    pub issued_at_ms: u64,
}

/// Signs and verifies tokens with a shared secret.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_ms: Option<u64>,
}

impl TokenSigner {
    /// Creates a signer. Tokens do not expire unless a lifetime is set
    /// with [`TokenSigner::with_ttl`].
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl_ms: None,
        }
    }

    /// Sets a token lifetime in milliseconds.
    #[must_use]
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.secret).expect("hmac key")
    }

    /// Mints a hex-encoded token for the claims.
    #[must_use]
    pub fn sign(&self, claims: &Claims) -> String {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..16].copy_from_slice(&claims.user_id.into_bytes());
        if let Some(end_id) = claims.end_id {
            payload[16] = 1;
            payload[17..33].copy_from_slice(&end_id.into_bytes());
        }
        payload[33..41].copy_from_slice(&claims.issued_at_ms.to_be_bytes());

        let mut mac = self.mac();
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();

        let mut token = String::with_capacity(TOKEN_LEN * 2);
        for byte in payload.iter().chain(tag.iter()) {
            token.push_str(&format!("{byte:02x}"));
        }
        token
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str, now_ms: u64) -> Result<Claims, AuthError> {
        let bytes = decode_hex(token)?;
        if bytes.len() != TOKEN_LEN {
            return Err(AuthError::Malformed);
        }
        let (payload, tag) = bytes.split_at(PAYLOAD_LEN);

        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(tag).map_err(|_| AuthError::BadSignature)?;

        let mut user = [0u8; 16];
        user.copy_from_slice(&payload[..16]);
        let end_id = if payload[16] == 1 {
            let mut end = [0u8; 16];
            end.copy_from_slice(&payload[17..33]);
            Some(EndId::from_bytes(end))
        } else {
            None
        };
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&payload[33..41]);
        let issued_at_ms = u64::from_be_bytes(ts);

        if let Some(ttl) = self.ttl_ms {
            if now_ms.saturating_sub(issued_at_ms) > ttl {
                return Err(AuthError::Expired);
            }
        }

        Ok(Claims {
            user_id: UserId::from_bytes(user),
            end_id,
            issued_at_ms,
        })
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, AuthError> {
    if s.len() % 2 != 0 {
        return Err(AuthError::Malformed);
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or(AuthError::Malformed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"0123456789abcdef0123456789abcdef".to_vec())
    }

    #[test]
    fn sign_verify_round_trip() {
        let claims = Claims {
            user_id: UserId::random(),
            end_id: Some(EndId::random()),
            issued_at_ms: 1_700_000_000_000,
        };
        let token = signer().sign(&claims);
        assert_eq!(token.len(), TOKEN_LEN * 2);
        assert_eq!(signer().verify(&token, 1_700_000_000_001).unwrap(), claims);
    }

    #[test]
    fn user_only_tokens_carry_no_end() {
        let claims = Claims {
            user_id: UserId::random(),
            end_id: None,
            issued_at_ms: 5,
        };
        let verified = signer().verify(&signer().sign(&claims), 5).unwrap();
        assert_eq!(verified.end_id, None);
    }

    #[test]
    fn tampering_breaks_the_signature() {
        let claims = Claims {
            user_id: UserId::random(),
            end_id: None,
            issued_at_ms: 5,
        };
        let mut token = signer().sign(&claims);
        let flipped = if token.starts_with('0') { "1" } else { "0" };
        token.replace_range(0..1, flipped);
        assert_eq!(
            signer().verify(&token, 5).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn a_foreign_secret_is_rejected() {
        let claims = Claims {
            user_id: UserId::random(),
            end_id: None,
            issued_at_ms: 5,
        };
        let token = TokenSigner::new(b"other secret".to_vec()).sign(&claims);
        assert_eq!(
            signer().verify(&token, 5).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn tokens_expire_when_a_ttl_is_set() {
        let signer = signer().with_ttl(1_000);
        let claims = Claims {
            user_id: UserId::random(),
            end_id: None,
            issued_at_ms: 10_000,
        };
        let token = signer.sign(&claims);
        assert!(signer.verify(&token, 10_500).is_ok());
        assert_eq!(signer.verify(&token, 12_000).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(signer().verify("zz", 0).unwrap_err(), AuthError::Malformed);
        assert_eq!(
            signer().verify("deadbeef", 0).unwrap_err(),
            AuthError::Malformed
        );
    }
}
