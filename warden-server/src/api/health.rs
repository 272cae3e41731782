use axum::extract::Request;
use serde_json::json;
use warden::{PathParams, Reply, User};

/// Basic health check handler
pub(crate) async fn health_check(_request: Request, _params: PathParams, _user: User) -> Reply {
    Reply::ok(json!({ "status": "ok" }))
}
