use axum::extract::Request;
use http::StatusCode;
use log::error;
use serde_json::json;
use warden::{PathParams, Reply, User};

/// Returns the identity carried by the caller's token
pub(crate) async fn me(_request: Request, _params: PathParams, user: User) -> Reply {
    match serde_json::to_value(&user) {
        Ok(data) => Reply::ok(data),
        Err(e) => {
            error!("Failed to serialize user '{}': {}", user.username, e);
            Reply::message("failed to serialize identity", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Reports whether the caller holds `capability` on `service`
pub(crate) async fn check_permission(_request: Request, params: PathParams, user: User) -> Reply {
    let service = params.get("service").unwrap_or_default();
    let capability = params.get("capability").unwrap_or_default();

    Reply::ok(json!({
        "service": service,
        "capability": capability,
        "allowed": user.can(service, capability),
    }))
}

#[cfg(test)]
mod test {
    use crate::test_utils::{test_user, TestFixture};
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_me_returns_token_identity() {
        let fixture = TestFixture::new();
        let token = fixture.token_for(&test_user());

        let response = fixture.get("/me", Some(&token)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.json["data"],
            serde_json::to_value(test_user()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let fixture = TestFixture::new();

        let response = fixture.get("/me", None).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json,
            json!({
                "data": null,
                "meta": {"message": "authorization header is not of the form: Bearer <token>"}
            })
        );
    }

    #[tokio::test]
    async fn test_check_permission() {
        let fixture = TestFixture::new();
        let token = fixture.token_for(&test_user());

        let response = fixture.get("/permissions/billing/read", Some(&token)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.json["data"],
            json!({"service": "billing", "capability": "read", "allowed": true})
        );

        let response = fixture.get("/permissions/shipping/ping", Some(&token)).await;
        assert_eq!(response.json["data"]["allowed"], false);
    }
}
