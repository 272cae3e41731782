use axum::body::Body;
use axum::extract::Request;
use axum::Router;
use http::header::{ACCESS_CONTROL_ALLOW_METHODS, AUTHORIZATION};
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use warden::{
    Authenticator, LogFacade, PathParams, Permissions, Reply, Route, RouteComposer, RouteConfig,
    Signer, User, WILDCARD_SERVICE,
};

const PRIVATE_KEY: &str = include_str!("../testdata/jwt_rs256.key");
const PUBLIC_KEY: &str = include_str!("../testdata/jwt_rs256.pub");

fn setup_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(LevelFilter::Debug)
        .try_init();
}

fn operator() -> User {
    User {
        user_id: 11,
        first_name: "Linus".to_string(),
        last_name: "Torvalds".to_string(),
        email: "linus@example.com".to_string(),
        username: "linus".to_string(),
        permissions: Permissions::new()
            .grant("shipping", "dispatch")
            .grant(WILDCARD_SERVICE, "audit"),
    }
}

async fn shipment(_request: Request, params: PathParams, user: User) -> Reply {
    Reply::ok(json!({
        "shipment": params.get("id"),
        "by": user.username,
    }))
}

async fn status(_request: Request, _params: PathParams, _user: User) -> Reply {
    Reply::ok(json!({"status": "ok"}))
}

fn app() -> Router {
    let authenticator = Authenticator::new(PUBLIC_KEY.as_bytes())
        .unwrap()
        .with_issuer("integration");
    RouteComposer::with_logger(Arc::new(authenticator), Arc::new(LogFacade))
        .build(RouteConfig {
            routes: vec![Route::get("/status", status)],
            authenticated_routes: vec![Route::get("/shipments/{id}", shipment)],
            authorized_routes: vec![
                Route::post("/shipments/{id}", shipment).requires("shipping", "dispatch"),
                Route::delete("/shipments/{id}", shipment).requires("shipping", "cancel"),
                Route::get("/audit", status).requires("shipping", "audit"),
            ],
            enable_cors: true,
        })
        .unwrap()
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_issued_token_opens_each_tier() {
    setup_logger();
    let app = app();
    let signer = Signer::new("integration", 600, PRIVATE_KEY.as_bytes()).unwrap();
    let token = signer.sign(&operator()).unwrap();

    let (code, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, json!({"data": {"status": "ok"}, "meta": null}));

    let (code, body) = call(&app, Method::GET, "/shipments/s-1", Some(&token)).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["data"], json!({"shipment": "s-1", "by": "linus"}));

    let (code, _) = call(&app, Method::POST, "/shipments/s-1", Some(&token)).await;
    assert_eq!(code, StatusCode::OK);

    let (code, _) = call(&app, Method::GET, "/audit", Some(&token)).await;
    assert_eq!(code, StatusCode::OK);

    let (code, body) = call(&app, Method::DELETE, "/shipments/s-1", Some(&token)).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["meta"]["message"],
        "not authorized for this service or capability"
    );
}

#[tokio::test]
async fn test_expired_token_is_reported() {
    setup_logger();
    let app = app();
    let signer = Signer::new("integration", 60, PRIVATE_KEY.as_bytes()).unwrap();
    let token = signer.sign_at(&operator(), 1_000).unwrap();

    let (code, body) = call(&app, Method::GET, "/shipments/s-1", Some(&token)).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"data": null, "meta": {"message": "expired jwt needs refresh"}})
    );
}

#[tokio::test]
async fn test_foreign_issuer_is_rejected() {
    setup_logger();
    let app = app();
    let signer = Signer::new("elsewhere", 600, PRIVATE_KEY.as_bytes()).unwrap();
    let token = signer.sign(&operator()).unwrap();

    let (code, body) = call(&app, Method::GET, "/shipments/s-1", Some(&token)).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_preflight_per_path() {
    let app = app();
    for (path, expected) in [
        ("/status", "GET,OPTIONS"),
        ("/shipments/s-9", "GET,POST,DELETE,OPTIONS"),
        ("/audit", "GET,OPTIONS"),
    ] {
        let response = app
            .clone()
            .oneshot(
                http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            expected
        );
    }
}
