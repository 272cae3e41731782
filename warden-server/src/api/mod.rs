pub(crate) mod health;
pub(crate) mod profile;
pub(crate) mod tokens;

use crate::state::AppState;
use warden::{Route, RouteConfig};

/// Service and capability a caller needs to mint tokens for others
pub(crate) const TOKEN_SERVICE: &str = "tokens";
pub(crate) const TOKEN_ISSUE_CAPABILITY: &str = "issue";

/// Declares every route of the server, grouped by trust tier
pub(crate) fn routes(state: &AppState) -> RouteConfig {
    RouteConfig {
        routes: vec![Route::get("/health", health::health_check)],
        authenticated_routes: vec![
            Route::get("/me", profile::me),
            Route::get(
                "/permissions/{service}/{capability}",
                profile::check_permission,
            ),
        ],
        authorized_routes: vec![Route::post("/tokens", tokens::issue(state.signer.clone()))
            .requires(TOKEN_SERVICE, TOKEN_ISSUE_CAPABILITY)],
        enable_cors: state.config.enable_cors,
    }
}
