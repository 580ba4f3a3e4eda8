use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

pub mod logging;

pub use logging::LoggingMiddleware;

/// Shared, ordered middleware chain of a single route
pub type Chain = Arc<[Arc<dyn Middleware>]>;

/// Represents the rest of the chain after the current middleware
///
/// Calling [`Next::run`] past the end of the chain is a no-op, so the
/// terminal middleware of a route simply never calls it.
#[derive(Clone)]
pub struct Next {
    chain: Chain,
    index: usize,
}

impl Next {
    /// Start a chain at its first middleware
    pub fn new(chain: Chain) -> Self {
        Self { chain, index: 0 }
    }

    /// Execute the next middleware
    pub async fn run(self, ctx: Arc<Context>) -> Result<()> {
        match self.chain.get(self.index) {
            Some(middleware) => {
                let middleware = Arc::clone(middleware);
                let next = Next {
                    chain: self.chain,
                    index: self.index + 1,
                };
                middleware.handle(ctx, next).await
            }
            None => Ok(()),
        }
    }
}

/// The Middleware trait
///
/// Middleware can inspect the request context before the rest of the chain
/// runs and inspect or modify the response afterwards.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use wiremount::context::Context;
/// use wiremount::middleware::{Middleware, Next};
///
/// struct LoginRequired;
///
/// #[wiremount::async_trait]
/// impl Middleware for LoginRequired {
///     async fn handle(&self, ctx: Arc<Context>, next: Next) -> wiremount::Result<()> {
///         if ctx.headers().contains_key("authorization") {
///             next.run(ctx).await
///         } else {
///             ctx.set_status(wiremount::axum::http::StatusCode::UNAUTHORIZED);
///             Ok(())
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, ctx: Arc<Context>, next: Next) -> Result<()>;
}

/// Middleware built from an async closure, see [`from_fn`]
pub struct FnMiddleware<F> {
    f: F,
}

/// Create middleware from an async closure
///
/// ```
/// use wiremount::middleware::from_fn;
///
/// let action_log = from_fn(|ctx, next| async move {
///     tracing::info!("action: {}", ctx.path());
///     next.run(ctx).await
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Arc<Context>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnMiddleware { f }
}

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Arc<Context>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: Arc<Context>, next: Next) -> Result<()> {
        (self.f)(ctx, next).await
    }
}

#[async_trait]
impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    async fn handle(&self, ctx: Arc<Context>, next: Next) -> Result<()> {
        (**self).handle(ctx, next).await
    }
}
