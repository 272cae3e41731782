use crate::error::AuthError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Wire shape of every handled request: `{"data": ..., "meta": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Option<Value>,
    pub meta: Option<Value>,
}

/// What a business handler hands back: payload, metadata and status code.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub data: Option<Value>,
    pub meta: Option<Value>,
    pub status: StatusCode,
}

impl Reply {
    pub fn new(data: Option<Value>, meta: Option<Value>, status: StatusCode) -> Self {
        Self { data, meta, status }
    }

    /// 200 with `data` and no metadata
    pub fn ok(data: Value) -> Self {
        Self::new(Some(data), None, StatusCode::OK)
    }

    /// 201 with `data` and no metadata
    pub fn created(data: Value) -> Self {
        Self::new(Some(data), None, StatusCode::CREATED)
    }

    /// No data, `{"message": ...}` as metadata
    pub fn message<S: ToString>(message: S, status: StatusCode) -> Self {
        Self::new(None, Some(json!({ "message": message.to_string() })), status)
    }

    /// The 401 reply for any authentication or authorization failure
    pub fn unauthorized(error: &AuthError) -> Self {
        Self::message(error, StatusCode::UNAUTHORIZED)
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let body = Envelope {
            data: self.data,
            meta: self.meta,
        };
        (self.status, Json(body)).into_response()
    }
}
