use thiserror::Error;

/// Errors raised while issuing, verifying or authorizing tokens.
///
/// The `Display` output of each variant is what clients see in the `meta.message`
/// field of a rejected request, so the wording is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("failed to load key: {0}")]
    KeyLoad(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("authorization header is not of the form: Bearer <token>")]
    MalformedCredential,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is invalid: {0}")]
    InvalidToken(String),
    #[error("expired jwt needs refresh")]
    ExpiredToken,
    #[error("not authorized for this service or capability")]
    NotAuthorized,
}

impl AuthError {
    /// True for every failure that means "who are you?" rather than "you can't do that".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedCredential
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::ExpiredToken
        )
    }

    /// True when the client should refresh its token instead of logging in again.
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::ExpiredToken)
    }
}

/// Errors raised while composing the dispatch table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {method} {path} is registered more than once")]
    DuplicateRoute { method: http::Method, path: String },
    #[error("path {0:?} must start with '/' and capture parameters as {{name}}")]
    InvalidPath(String),
    #[error("path {path:?} names a capture differently from {existing:?} at the same position")]
    ConflictingCapture { path: String, existing: String },
    #[error("method {0} cannot be routed")]
    UnsupportedMethod(http::Method),
}
