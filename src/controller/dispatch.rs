use super::mapping::MappingRecord;
use crate::context::Context;
use crate::di::Injectable;
use crate::error::Result;
use crate::middleware::{Middleware, Next};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

/// Terminal middleware of a controller route
///
/// Resolves a controller instance and the method's parameters through the
/// request injector, invokes the method and writes its value, if any, to
/// the response.
pub struct DispatchAdapter<C> {
    record: MappingRecord<C>,
}

impl<C> DispatchAdapter<C> {
    pub fn new(record: MappingRecord<C>) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &MappingRecord<C> {
        &self.record
    }
}

#[async_trait]
impl<C: Injectable> Middleware for DispatchAdapter<C> {
    async fn handle(&self, ctx: Arc<Context>, _next: Next) -> Result<()> {
        let injector = ctx.injector();
        let instance = injector.instantiate::<C>().await?;
        let args = try_join_all(
            self.record
                .params()
                .iter()
                .map(|param| param.resolve(injector)),
        )
        .await?;

        let Some(value) = self.record.handle().invoke(instance, args).await? else {
            return Ok(());
        };
        match ctx.responder() {
            Some(responder) => responder.success(&ctx, value),
            None => ctx.set_body(value),
        }
        Ok(())
    }
}
