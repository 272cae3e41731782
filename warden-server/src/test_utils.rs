use crate::config::ServerConfig;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;
use warden::{Permissions, User, WILDCARD_SERVICE};

/// Test fixture holding a fully built application and the state behind it.
///
/// Keys come from the library's test fixtures, so tokens minted with
/// [`TestFixture::token_for`] are accepted by the application.
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// State the router was built from
    pub state: AppState,
}

/// Status, headers and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "unexpected status, body: {}",
            self.json
        );
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A user holding `billing:read` plus the wildcard `ping` capability
pub fn test_user() -> User {
    User {
        user_id: 7,
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        username: "grace".to_string(),
        permissions: Permissions::new()
            .grant("billing", "read")
            .grant(WILDCARD_SERVICE, "ping"),
    }
}

impl TestFixture {
    pub fn new() -> Self {
        // Initialize test logger
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let state = AppState::new(&ServerConfig::for_test()).expect("Failed to load test keys");
        let app = create_app(&state).expect("Failed to build routes");
        Self { app, state }
    }

    /// Mint a token for `user` with the application's signer
    pub fn token_for(&self, user: &User) -> String {
        self.state.signer.sign(user).expect("Failed to sign token")
    }

    fn request_builder(&self, method: Method, uri: &str, token: Option<&str>) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.header(CONTENT_TYPE, "application/json")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post<T: Serialize>(&self, uri: &str, body: &T, token: Option<&str>) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri, token)
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Send an unauthenticated CORS preflight
    pub async fn options(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }
}
