//! Route table
//!
//! Collects route registrations (path, verbs, middleware chain) the way a
//! koa-style router does and compiles them onto an [`axum::Router`] once
//! setup is complete. Matching itself is left to axum.

use crate::context::{PathParams, Pipeline};
use crate::error::{Error, Result};
use crate::middleware::{Chain, Middleware};
use axum::{
    extract::{RawPathParams, Request, rejection::RawPathParamsRejection},
    response::Response,
    routing::MethodRouter,
};
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

mod verb;

pub use verb::{Methods, Verb};

/// A single registration
#[derive(Clone)]
pub struct Route {
    path: String,
    methods: Methods,
    chain: Vec<Arc<dyn Middleware>>,
}

impl Route {
    /// Path relative to the owning router's prefix
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    /// Number of middleware in the route's own chain
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("chain", &self.chain.len())
            .finish()
    }
}

/// Join a router prefix and a route path
///
/// The root path of a prefixed router is the prefix itself.
pub fn join_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path == "/" {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, path)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_end_matches('/').to_string()
}

/// Router with an optional prefix and router-wide middleware
#[derive(Default, Clone)]
pub struct Router {
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router whose routes are all mounted under `prefix`
    pub fn with_prefix(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: normalize_prefix(prefix.as_ref()),
            ..Self::default()
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add middleware that runs before the chain of every route of this router
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Register `chain` for every path in `paths` under the given verbs
    ///
    /// Returns the number of registrations added (one per path).
    pub fn register<I, P>(
        &mut self,
        paths: I,
        verbs: &[Verb],
        chain: Vec<Arc<dyn Middleware>>,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let methods = Methods::from_verbs(verbs.iter().copied())?;
        self.add(paths, methods, chain)
    }

    /// Register `chain` for every verb as a single wildcard registration
    pub fn all<I, P>(&mut self, paths: I, chain: Vec<Arc<dyn Middleware>>) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.add(paths, Methods::All, chain)
    }

    pub fn get(&mut self, path: &str, chain: Vec<Arc<dyn Middleware>>) -> Result<usize> {
        self.register([path], &[Verb::Get], chain)
    }

    pub fn post(&mut self, path: &str, chain: Vec<Arc<dyn Middleware>>) -> Result<usize> {
        self.register([path], &[Verb::Post], chain)
    }

    pub fn put(&mut self, path: &str, chain: Vec<Arc<dyn Middleware>>) -> Result<usize> {
        self.register([path], &[Verb::Put], chain)
    }

    pub fn patch(&mut self, path: &str, chain: Vec<Arc<dyn Middleware>>) -> Result<usize> {
        self.register([path], &[Verb::Patch], chain)
    }

    pub fn delete(&mut self, path: &str, chain: Vec<Arc<dyn Middleware>>) -> Result<usize> {
        self.register([path], &[Verb::Delete], chain)
    }

    fn add<I, P>(&mut self, paths: I, methods: Methods, chain: Vec<Arc<dyn Middleware>>) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(Error::configuration("a route needs at least one path"));
        }
        if let Some(path) = paths.iter().find(|path| !path.starts_with('/')) {
            return Err(Error::configuration(format!(
                "route path '{}' must start with '/'",
                path
            )));
        }

        for path in &paths {
            tracing::debug!(
                "register {:?} {}",
                methods,
                join_paths(&self.prefix, path)
            );
            self.routes.push(Route {
                path: path.clone(),
                methods: methods.clone(),
                chain: chain.clone(),
            });
        }
        Ok(paths.len())
    }

    /// Mount every route of `other` into this router
    ///
    /// `other`'s prefix and middleware are folded into each of its routes, so
    /// they keep applying to those routes only.
    pub fn merge(&mut self, other: Router) {
        let Router {
            prefix,
            middleware,
            routes,
        } = other;
        for route in routes {
            let mut chain = middleware.clone();
            chain.extend(route.chain);
            self.routes.push(Route {
                path: join_paths(&prefix, &route.path),
                methods: route.methods,
                chain,
            });
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Compile every registration into an axum router
    ///
    /// # Errors
    /// [`Error::RouteConflict`] when the same verb (or two wildcards) is
    /// registered twice for one path.
    pub fn into_axum(self, pipeline: Pipeline) -> Result<axum::Router> {
        let Router {
            prefix,
            middleware,
            routes,
        } = self;

        let mut order: Vec<String> = Vec::new();
        let mut compiled: HashMap<String, CompiledPath> = HashMap::new();

        for route in routes {
            let path = join_paths(&prefix, &route.path);
            let mut chain = middleware.clone();
            chain.extend(route.chain);
            let chain: Chain = chain.into();

            let entry = compiled.entry(path.clone()).or_insert_with(|| {
                order.push(path.clone());
                CompiledPath::new()
            });
            entry.add(&path, &route.methods, &pipeline, &chain)?;
        }

        let mut router = axum::Router::new();
        for path in order {
            if let Some(entry) = compiled.remove(&path) {
                router = router.route(&path, entry.method_router);
            }
        }
        Ok(router)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .field("routes", &self.routes)
            .finish()
    }
}

/// Every registration sharing one effective path
struct CompiledPath {
    method_router: MethodRouter,
    verbs: HashSet<Verb>,
    wildcard: bool,
}

impl CompiledPath {
    fn new() -> Self {
        Self {
            method_router: MethodRouter::new(),
            verbs: HashSet::new(),
            wildcard: false,
        }
    }

    fn add(&mut self, path: &str, methods: &Methods, pipeline: &Pipeline, chain: &Chain) -> Result<()> {
        let method_router = std::mem::replace(&mut self.method_router, MethodRouter::new());
        let handler = route_handler(pipeline.clone(), Arc::clone(chain));

        self.method_router = match methods {
            Methods::All => {
                if self.wildcard {
                    return Err(conflict(Verb::All, path));
                }
                self.wildcard = true;
                method_router.fallback(handler)
            }
            Methods::Verbs(verbs) => {
                let mut method_router = method_router;
                for verb in verbs {
                    let Some(filter) = verb.filter() else {
                        continue;
                    };
                    if !self.verbs.insert(*verb) {
                        return Err(conflict(*verb, path));
                    }
                    method_router = method_router.on(filter, handler.clone());
                }
                method_router
            }
        };
        Ok(())
    }
}

fn conflict(verb: Verb, path: &str) -> Error {
    Error::RouteConflict {
        method: verb.to_string(),
        path: path.to_string(),
    }
}

/// axum handler that forwards a matched request into the pipeline
fn route_handler(
    pipeline: Pipeline,
    chain: Chain,
) -> impl FnOnce(std::result::Result<RawPathParams, RawPathParamsRejection>, Request) -> BoxFuture<'static, Response>
+ Clone
+ Send
+ Sync
+ 'static {
    move |params: std::result::Result<RawPathParams, RawPathParamsRejection>,
          mut request: Request|
          -> BoxFuture<'static, Response> {
        Box::pin(async move {
            if let Ok(params) = params {
                let params = params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect();
                request.extensions_mut().insert(PathParams(params));
            }
            pipeline.dispatch(request, chain).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;

    fn noop() -> Vec<Arc<dyn Middleware>> {
        vec![Arc::new(from_fn(|_ctx, _next| async { Ok(()) }))]
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/users"), "/users");
        assert_eq!(join_paths("/api", "/users"), "/api/users");
        assert_eq!(join_paths("/api", "/"), "/api");
        assert_eq!(Router::with_prefix("/api/").prefix(), "/api");
        assert_eq!(Router::with_prefix("/").prefix(), "");
    }

    #[test]
    fn test_register_counts_paths() {
        let mut router = Router::new();
        let added = router
            .register(["/aaa", "/bbb"], &[Verb::Post, Verb::Get], noop())
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(router.route_count(), 2);
        assert_eq!(
            router.routes()[0].methods(),
            &Methods::Verbs(vec![Verb::Post, Verb::Get])
        );
    }

    #[test]
    fn test_register_rejects_relative_path() {
        let mut router = Router::new();
        let err = router.get("users", noop()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(router.route_count(), 0);
    }

    #[test]
    fn test_merge_folds_prefix_and_middleware() {
        let mut sub = Router::with_prefix("/prefix");
        sub.use_middleware(noop().remove(0));
        sub.get("/", noop()).unwrap();
        sub.all(["/any"], noop()).unwrap();

        let mut root = Router::new();
        root.merge(sub);

        let paths: Vec<&str> = root.routes().iter().map(Route::path).collect();
        assert_eq!(paths, vec!["/prefix", "/prefix/any"]);
        assert!(root.routes().iter().all(|route| route.chain_len() == 2));
        assert!(root.routes()[1].methods().is_all());
    }

    #[test]
    fn test_compile_detects_duplicate_verb() {
        let mut router = Router::new();
        router.get("/twice", noop()).unwrap();
        router.get("/twice", noop()).unwrap();

        let pipeline = Pipeline::new(Arc::new(crate::di::Container::new()));
        let err = router.into_axum(pipeline).unwrap_err();
        assert!(matches!(
            err,
            Error::RouteConflict { ref method, ref path } if method == "GET" && path == "/twice"
        ));
    }

    #[test]
    fn test_compile_allows_verbs_beside_wildcard() {
        let mut router = Router::new();
        router.all(["/mixed"], noop()).unwrap();
        router.get("/mixed", noop()).unwrap();

        let pipeline = Pipeline::new(Arc::new(crate::di::Container::new()));
        assert!(router.into_axum(pipeline).is_ok());
    }

    #[tokio::test]
    async fn test_path_params_reach_context() {
        use tower::ServiceExt;

        let echo: Arc<dyn Middleware> = Arc::new(from_fn(|ctx: Arc<crate::context::Context>, _next| async move {
            let id = ctx.param("id").unwrap_or_default().to_string();
            ctx.set_body(id);
            Ok(())
        }));
        let mut router = Router::new();
        router.get("/items/{id}", vec![echo]).unwrap();

        let app = router
            .into_axum(Pipeline::new(Arc::new(crate::di::Container::new())))
            .unwrap();
        let response = app
            .oneshot(axum::http::Request::get("/items/7").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"7");
    }
}
