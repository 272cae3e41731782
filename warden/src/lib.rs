//! # warden
//!
//! Token based identity and permission checks for axum services.
//!
//! ## Components
//!
//! - **Signer:** mints RS256 tokens embedding a [`User`] and its permissions.
//! - **Authenticator:** verifies tokens from the `Authorization: Bearer` header and
//!   evaluates permissions.
//! - **RouteComposer:** turns public, authenticated and authorized route lists into
//!   an axum router, with request logging, CORS headers and synthesized preflights.

pub mod authenticator;
pub mod bearer;
pub mod error;
pub mod handler;
pub mod identity;
pub mod logger;
pub mod middleware;
pub mod permissions;
pub mod response;
pub mod router;
pub mod signer;
pub mod token;
#[cfg(test)]
mod test_utils;

pub use crate::authenticator::{Authenticator, RequestAuthenticator};
pub use crate::error::{AuthError, RouteError};
pub use crate::handler::{Handler, PathParams};
pub use crate::identity::User;
pub use crate::logger::{LogFacade, NoopLogger, RequestLogger};
pub use crate::permissions::{check, Permissions, WILDCARD_SERVICE};
pub use crate::response::{Envelope, Reply};
pub use crate::router::{Route, RouteComposer, RouteConfig};
pub use crate::signer::Signer;
pub use crate::token::Claims;
