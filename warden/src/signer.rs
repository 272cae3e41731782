use crate::error::AuthError;
use crate::identity::User;
use crate::token::{self, Claims};
use jsonwebtoken::EncodingKey;
use log::debug;
use std::path::Path;

/// Mints tokens for identities using a private RSA key.
///
/// Holds only immutable key material, so a single instance can be shared across
/// request handlers without locking.
#[derive(Clone)]
pub struct Signer {
    issuer: String,
    expiry_secs: i64,
    encoding_key: EncodingKey,
}

impl Signer {
    /// Create a signer from a PEM encoded RSA private key.
    ///
    /// # Arguments
    /// * `issuer` - Value of the `iss` claim.
    /// * `expiry_secs` - Lifetime of every minted token; must not be negative.
    /// * `private_key_pem` - PKCS#1 or PKCS#8 PEM bytes.
    pub fn new(
        issuer: impl Into<String>,
        expiry_secs: i64,
        private_key_pem: &[u8],
    ) -> Result<Self, AuthError> {
        if expiry_secs < 0 {
            return Err(AuthError::Signing(format!(
                "token lifetime must not be negative, got {expiry_secs}"
            )));
        }
        Ok(Self {
            issuer: issuer.into(),
            expiry_secs,
            encoding_key: token::encoding_key(private_key_pem)?,
        })
    }

    /// Create a signer from a PEM file on disk
    pub fn from_key_file(
        issuer: impl Into<String>,
        expiry_secs: i64,
        path: impl AsRef<Path>,
    ) -> Result<Self, AuthError> {
        let pem = token::read_key_file(path.as_ref())?;
        Self::new(issuer, expiry_secs, &pem)
    }

    /// Sign a token for `user`, valid from now for the configured lifetime
    pub fn sign(&self, user: &User) -> Result<String, AuthError> {
        self.sign_at(user, token::now_epoch_seconds())
    }

    /// Sign a token for `user` as if the current time were `issued_at` (Unix seconds)
    pub fn sign_at(&self, user: &User, issued_at: i64) -> Result<String, AuthError> {
        let expires_at = issued_at.checked_add(self.expiry_secs).ok_or_else(|| {
            AuthError::Signing(format!(
                "expiry overflows: issued at {issued_at} with lifetime {}",
                self.expiry_secs
            ))
        })?;
        let claims = Claims {
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: expires_at,
            user: user.clone(),
        };
        let signed = token::encode(&claims, &self.encoding_key)?;
        debug!(
            "Signed token for user '{}' ({}), expires at {}",
            user.username, user.user_id, claims.exp
        );
        Ok(signed)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("issuer", &self.issuer)
            .field("expiry_secs", &self.expiry_secs)
            .finish()
    }
}
