//! Compact RS256 token encoding shared by the signer and the authenticator.

use crate::error::AuthError;
use crate::identity::User;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// Claim set carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub user: User,
}

impl Claims {
    /// Check the `[iat, exp)` validity window against `now`.
    pub fn check_window(&self, now: i64) -> Result<(), AuthError> {
        if now >= self.exp {
            return Err(AuthError::ExpiredToken);
        }
        if now < self.iat {
            return Err(AuthError::InvalidToken(
                "token used before issued".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn encode(claims: &Claims, key: &EncodingKey) -> Result<String, AuthError> {
    jsonwebtoken::encode(&Header::new(ALGORITHM), claims, key)
        .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify the signature and structure of `token`; the time window is left to the caller.
pub(crate) fn decode(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<Claims, AuthError> {
    jsonwebtoken::decode::<Claims>(token, key, validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken(e.to_string()),
        })
}

/// Validation rules for decoding; expiry is checked by [`Claims::check_window`] so
/// that a token is dead at exactly `exp`.
pub(crate) fn validation(issuer: Option<&str>) -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iss"]);
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }
    validation
}

pub(crate) fn encoding_key(private_key_pem: &[u8]) -> Result<EncodingKey, AuthError> {
    EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| AuthError::KeyLoad(e.to_string()))
}

pub(crate) fn decoding_key(public_key_pem: &[u8]) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_rsa_pem(public_key_pem).map_err(|e| AuthError::KeyLoad(e.to_string()))
}

pub(crate) fn read_key_file(path: &Path) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|e| AuthError::KeyLoad(format!("{}: {e}", path.display())))
}

pub(crate) fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs() as i64
}
