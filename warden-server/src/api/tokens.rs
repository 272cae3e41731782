use axum::body::to_bytes;
use axum::extract::Request;
use http::StatusCode;
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use warden::{Handler, PathParams, Reply, Signer, User};

/// Largest identity document accepted for signing
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Handler minting a token for the identity posted in the request body
pub(crate) fn issue(signer: Arc<Signer>) -> impl Handler {
    move |request: Request, _params: PathParams, caller: User| {
        let signer = signer.clone();
        async move { issue_token(&signer, request, &caller).await }
    }
}

async fn issue_token(signer: &Signer, request: Request, caller: &User) -> Reply {
    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            return Reply::message(
                format!("failed to read request body: {e}"),
                StatusCode::BAD_REQUEST,
            )
        }
    };

    let user: User = match serde_json::from_slice(&body) {
        Ok(user) => user,
        Err(e) => {
            return Reply::message(format!("invalid identity: {e}"), StatusCode::BAD_REQUEST)
        }
    };

    match signer.sign(&user) {
        Ok(token) => {
            info!(
                "User '{}' issued a token for '{}' ({})",
                caller.username, user.username, user.user_id
            );
            Reply::created(json!({
                "token": token,
                "expires_in": signer.expiry_secs(),
            }))
        }
        Err(e) => {
            error!("Failed to sign token for '{}': {}", user.username, e);
            Reply::message(e, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
