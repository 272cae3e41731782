use crate::bearer::bearer_token;
use crate::error::AuthError;
use crate::identity::User;
use crate::permissions;
use crate::token::{self, Claims};
use http::HeaderMap;
use jsonwebtoken::{DecodingKey, Validation};
use log::debug;
use std::path::Path;

/// Resolves the identity behind an incoming request.
///
/// The route composer only talks to this trait, so hosts can plug in their own
/// verification scheme or a test double.
pub trait RequestAuthenticator: Send + Sync {
    /// Verify the request's credential and return the identity it carries
    fn authenticate(&self, headers: &HeaderMap) -> Result<User, AuthError>;

    /// Authenticate, then require `capability` on `service`
    fn authorize(
        &self,
        headers: &HeaderMap,
        service: &str,
        capability: &str,
    ) -> Result<User, AuthError>;
}

/// Verifies tokens minted by a [`Signer`](crate::Signer) holding the matching private key.
#[derive(Clone)]
pub struct Authenticator {
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl Authenticator {
    /// Create an authenticator from a PEM encoded RSA public key
    pub fn new(public_key_pem: &[u8]) -> Result<Self, AuthError> {
        Ok(Self {
            decoding_key: token::decoding_key(public_key_pem)?,
            validation: token::validation(None),
            issuer: None,
        })
    }

    /// Create an authenticator from a PEM file on disk
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let pem = token::read_key_file(path.as_ref())?;
        Self::new(&pem)
    }

    /// Only accept tokens whose `iss` claim equals `issuer`
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        self.validation = token::validation(Some(&issuer));
        self.issuer = Some(issuer);
        self
    }

    /// Verify `token` at time `now` and return its full claim set.
    ///
    /// The signature is checked before the validity window, so a forged token is
    /// always reported as invalid rather than expired.
    pub fn verify_claims_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = token::decode(token, &self.decoding_key, &self.validation)?;
        claims.check_window(now)?;
        Ok(claims)
    }

    pub fn authenticate_token(&self, token: &str) -> Result<User, AuthError> {
        self.authenticate_token_at(token, token::now_epoch_seconds())
    }

    pub fn authenticate_token_at(&self, token: &str, now: i64) -> Result<User, AuthError> {
        let claims = self.verify_claims_at(token, now)?;
        debug!(
            "Authenticated user '{}' ({}) issued by '{}'",
            claims.user.username, claims.user.user_id, claims.iss
        );
        Ok(claims.user)
    }

    pub fn authorize_token(
        &self,
        token: &str,
        service: &str,
        capability: &str,
    ) -> Result<User, AuthError> {
        self.authorize_token_at(token, service, capability, token::now_epoch_seconds())
    }

    /// Authenticate `token` at `now`, then evaluate its permissions.
    ///
    /// Authentication errors are returned untouched; a permission denial is
    /// [`AuthError::NotAuthorized`].
    pub fn authorize_token_at(
        &self,
        token: &str,
        service: &str,
        capability: &str,
        now: i64,
    ) -> Result<User, AuthError> {
        let user = self.authenticate_token_at(token, now)?;
        if !permissions::check(&user.permissions, service, capability) {
            debug!(
                "User '{}' denied '{}' on service '{}'",
                user.username, capability, service
            );
            return Err(AuthError::NotAuthorized);
        }
        Ok(user)
    }
}

impl RequestAuthenticator for Authenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        self.authenticate_token(bearer_token(headers)?)
    }

    fn authorize(
        &self,
        headers: &HeaderMap,
        service: &str,
        capability: &str,
    ) -> Result<User, AuthError> {
        self.authorize_token(bearer_token(headers)?, service, capability)
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("issuer", &self.issuer)
            .finish()
    }
}
