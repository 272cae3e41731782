use crate::error::AuthError;
use http::header::AUTHORIZATION;
use http::HeaderMap;

const SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Exactly one whitespace delimited segment must follow the scheme keyword.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MalformedCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;
    parse_bearer(value)
}

/// Parse a raw `Authorization` header value
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let rest = value
        .trim_start()
        .strip_prefix(SCHEME)
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .ok_or(AuthError::MalformedCredential)?;

    let mut segments = rest.split_whitespace();
    match (segments.next(), segments.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedCredential),
    }
}
