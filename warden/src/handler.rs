use crate::identity::User;
use crate::response::Reply;
use axum::extract::{FromRequestParts, RawPathParams, Request};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Path parameters captured by the route pattern, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split the captured parameters off `request`; routes without captures yield none
    pub(crate) async fn extract(request: Request) -> (Request, Self) {
        let (mut parts, body) = request.into_parts();
        let params = RawPathParams::from_request_parts(&mut parts, &())
            .await
            .map(|raw| {
                raw.iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        (http::Request::from_parts(parts, body), Self(params))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A business handler.
///
/// Implemented for every `async` closure taking the request, its path parameters
/// and the resolved identity. Public routes receive `User::default()`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request, params: PathParams, user: User) -> BoxFuture<Reply>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, PathParams, User) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    fn call(&self, request: Request, params: PathParams, user: User) -> BoxFuture<Reply> {
        Box::pin(self(request, params, user))
    }
}

pub type BoxedHandler = Arc<dyn Handler>;
