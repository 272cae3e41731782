//! Composition of declared routes into a dispatch table.
//!
//! Each route belongs to one trust tier. The tier decides which check runs before
//! the business handler:
//!
//! | tier          | check                                  |
//! |---------------|----------------------------------------|
//! | public        | none                                   |
//! | authenticated | [`RequestAuthenticator::authenticate`] |
//! | authorized    | [`RequestAuthenticator::authorize`]    |
//!
//! Every route is wrapped in request logging and CORS headers. When CORS is enabled
//! each distinct path additionally answers `OPTIONS` with the union of its methods.

use crate::authenticator::RequestAuthenticator;
use crate::error::{AuthError, RouteError};
use crate::handler::{BoxFuture, BoxedHandler, Handler, PathParams};
use crate::identity::User;
use crate::logger::{NoopLogger, RequestLogger};
use crate::middleware::{cross_cutting, preflight_response};
use crate::response::Reply;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use http::{HeaderMap, HeaderValue, Method};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A declared route.
///
/// `service` and `capability` only matter for authorized routes; an empty value
/// skips that dimension of the permission check.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: BoxedHandler,
    pub service: String,
    pub capability: String,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            method,
            path: path.into(),
            handler: Arc::new(handler),
            service: String::new(),
            capability: String::new(),
        }
    }

    pub fn get(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::GET, path, handler)
    }

    pub fn post(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::POST, path, handler)
    }

    pub fn put(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    pub fn delete(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    /// Set the permission an authorized route demands
    pub fn requires(mut self, service: impl Into<String>, capability: impl Into<String>) -> Self {
        self.service = service.into();
        self.capability = capability.into();
        self
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("service", &self.service)
            .field("capability", &self.capability)
            .finish()
    }
}

/// The complete route declaration for one service.
#[derive(Debug, Clone, Default)]
pub struct RouteConfig {
    /// Routes anyone may call
    pub routes: Vec<Route>,
    /// Routes that need a valid token
    pub authenticated_routes: Vec<Route>,
    /// Routes that need a valid token granting the route's service and capability
    pub authorized_routes: Vec<Route>,
    /// Synthesize an `OPTIONS` responder for every declared path
    pub enable_cors: bool,
}

#[derive(Debug, Clone)]
enum Tier {
    Public,
    Authenticated,
    Authorized { service: String, capability: String },
}

impl Tier {
    fn resolve(
        &self,
        authenticator: &dyn RequestAuthenticator,
        headers: &HeaderMap,
    ) -> Result<User, AuthError> {
        match self {
            Tier::Public => Ok(User::default()),
            Tier::Authenticated => authenticator.authenticate(headers),
            Tier::Authorized {
                service,
                capability,
            } => authenticator.authorize(headers, service, capability),
        }
    }
}

struct PathEntry<S> {
    methods: Vec<Method>,
    router: Option<MethodRouter<S>>,
}

/// Routes collected so far, grouped by path in declaration order.
struct RouteTable<S> {
    order: Vec<String>,
    entries: HashMap<String, PathEntry<S>>,
    /// Capture name and declaring path, keyed by the path shape up to that capture
    captures: HashMap<String, (String, String)>,
}

impl<S> RouteTable<S> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            captures: HashMap::new(),
        }
    }

    /// Reject `path` if one of its captures sits where an already declared path
    /// captures under another name.
    ///
    /// With consistent names, paths that match the same requests are spelled
    /// identically, so grouping methods by path string gives one entry per
    /// distinct path.
    fn check_captures(&mut self, path: &str) -> Result<(), RouteError> {
        let mut shape = String::new();
        for segment in path.trim_start_matches('/').split('/') {
            shape.push('/');
            let Some(name) = capture_name(segment) else {
                shape.push_str(segment);
                continue;
            };
            shape.push_str("{}");
            match self.captures.get(&shape) {
                Some((existing_name, existing)) if existing_name != name => {
                    return Err(RouteError::ConflictingCapture {
                        path: path.to_string(),
                        existing: existing.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    self.captures
                        .insert(shape.clone(), (name.to_string(), path.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Builds the dispatch table from a [`RouteConfig`].
#[derive(Clone)]
pub struct RouteComposer {
    authenticator: Arc<dyn RequestAuthenticator>,
    logger: Arc<dyn RequestLogger>,
}

impl RouteComposer {
    /// Create a composer that logs requests to [`NoopLogger`]
    pub fn new(authenticator: Arc<dyn RequestAuthenticator>) -> Self {
        Self::with_logger(authenticator, Arc::new(NoopLogger))
    }

    pub fn with_logger(
        authenticator: Arc<dyn RequestAuthenticator>,
        logger: Arc<dyn RequestLogger>,
    ) -> Self {
        Self {
            authenticator,
            logger,
        }
    }

    /// Build the dispatch table.
    ///
    /// The returned router is complete; it is meant to be merged into the host
    /// application once at startup and never changed afterwards.
    pub fn build<S>(&self, config: RouteConfig) -> Result<Router<S>, RouteError>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut table = RouteTable::new();

        for route in config.routes {
            self.install(&mut table, route, Tier::Public)?;
        }
        for route in config.authenticated_routes {
            self.install(&mut table, route, Tier::Authenticated)?;
        }
        for route in config.authorized_routes {
            let tier = Tier::Authorized {
                service: route.service.clone(),
                capability: route.capability.clone(),
            };
            self.install(&mut table, route, tier)?;
        }

        let mut router = Router::new();
        for path in table.order {
            let Some(entry) = table.entries.remove(&path) else {
                continue;
            };
            let Some(method_router) = entry.router else {
                continue;
            };
            let mut method_router = cross_cutting(method_router, self.logger.clone());

            if config.enable_cors {
                if entry.methods.contains(&Method::OPTIONS) {
                    return Err(RouteError::DuplicateRoute {
                        method: Method::OPTIONS,
                        path,
                    });
                }
                let allowed = allowed_methods(&entry.methods)?;
                debug!("Synthesized preflight for {path}: {allowed:?}");
                method_router = method_router.options(move || {
                    let allowed = allowed.clone();
                    async move { preflight_response(&allowed) }
                });
            }
            router = router.route(&path, method_router);
        }
        Ok(router)
    }

    fn install<S>(
        &self,
        table: &mut RouteTable<S>,
        route: Route,
        tier: Tier,
    ) -> Result<(), RouteError>
    where
        S: Clone + Send + Sync + 'static,
    {
        validate_path(&route.path)?;
        let filter = MethodFilter::try_from(route.method.clone())
            .map_err(|_| RouteError::UnsupportedMethod(route.method.clone()))?;

        table.check_captures(&route.path)?;

        let order = &mut table.order;
        let entry = table.entries.entry(route.path.clone()).or_insert_with(|| {
            order.push(route.path.clone());
            PathEntry {
                methods: Vec::new(),
                router: None,
            }
        });
        if entry.methods.contains(&route.method) {
            return Err(RouteError::DuplicateRoute {
                method: route.method,
                path: route.path,
            });
        }

        debug!("Installing {:?} route {} {}", tier, route.method, route.path);
        let handler = self.guard(tier, route.handler);
        entry.router = Some(match entry.router.take() {
            Some(method_router) => method_router.on(filter, handler),
            None => on(filter, handler),
        });
        entry.methods.push(route.method);
        Ok(())
    }

    /// Put the tier's identity check in front of `handler`.
    ///
    /// A failed check answers 401 with the error message and the handler never runs.
    fn guard(
        &self,
        tier: Tier,
        handler: BoxedHandler,
    ) -> impl Fn(Request) -> BoxFuture<Response> + Clone + Send + Sync + 'static {
        let authenticator = self.authenticator.clone();
        let tier = Arc::new(tier);
        move |request: Request| -> BoxFuture<Response> {
            let authenticator = authenticator.clone();
            let handler = handler.clone();
            let tier = tier.clone();
            Box::pin(async move {
                let user = match tier.resolve(authenticator.as_ref(), request.headers()) {
                    Ok(user) => user,
                    Err(e) => {
                        warn!(
                            "Rejected {} {}: {}",
                            request.method(),
                            request.uri().path(),
                            e
                        );
                        return Reply::unauthorized(&e).into_response();
                    }
                };

                let (request, params) = PathParams::extract(request).await;
                handler.call(request, params, user).await.into_response()
            })
        }
    }
}

/// `Access-Control-Allow-Methods` value: declared methods in order, then `OPTIONS`
fn allowed_methods(methods: &[Method]) -> Result<HeaderValue, RouteError> {
    let mut names: Vec<&str> = methods.iter().map(Method::as_str).collect();
    names.push(Method::OPTIONS.as_str());
    HeaderValue::from_str(&names.join(","))
        .map_err(|_| RouteError::UnsupportedMethod(Method::OPTIONS))
}

/// Paths start with `/`; a capture is a whole `{name}` segment, named at most once.
fn validate_path(path: &str) -> Result<(), RouteError> {
    let invalid = || RouteError::InvalidPath(path.to_string());
    let Some(rest) = path.strip_prefix('/') else {
        return Err(invalid());
    };

    let mut names = HashSet::new();
    for segment in rest.split('/') {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid());
        }
        match capture_name(segment) {
            Some(name) if !names.insert(name) => return Err(invalid()),
            Some(_) => {}
            None if segment.contains(['{', '}']) => return Err(invalid()),
            None => {}
        }
    }
    Ok(())
}

fn capture_name(segment: &str) -> Option<&str> {
    let name = segment.strip_prefix('{')?.strip_suffix('}')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}
