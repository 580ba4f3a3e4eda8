use crate::context::Context;
use crate::error::Result;
use crate::middleware::{Middleware, Next};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// A middleware that logs request timing and status
#[derive(Clone, Default)]
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(&self, ctx: Arc<Context>, next: Next) -> Result<()> {
        let start = Instant::now();

        tracing::info!(request_id = %ctx.id(), "--> {} {}", ctx.method(), ctx.uri());

        match next.run(Arc::clone(&ctx)).await {
            Ok(()) => {
                tracing::info!(
                    request_id = %ctx.id(),
                    "<-- {} {} {} {:?}",
                    ctx.method(),
                    ctx.uri(),
                    ctx.effective_status(),
                    start.elapsed()
                );
                Ok(())
            }
            Err(e) => {
                tracing::info!(
                    request_id = %ctx.id(),
                    "<-- {} {} ERROR: {} {:?}",
                    ctx.method(),
                    ctx.uri(),
                    e,
                    start.elapsed()
                );
                Err(e)
            }
        }
    }
}
