use crate::context::Context;
use crate::di::{Injectable, Injector};
use crate::error::Result;
use crate::metadata::MetadataStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Base state shared by controllers: the request context
///
/// Embed it in a controller and build it from the injector in the
/// controller's own [`Injectable::inject`].
///
/// Only prototype and request scoped controllers may embed it. A singleton
/// is built once, so its `Controller` would keep the first request's context
/// for the life of the application.
#[derive(Debug, Clone)]
pub struct Controller {
    ctx: Arc<Context>,
}

impl Controller {
    pub fn ctx(&self) -> &Arc<Context> {
        &self.ctx
    }
}

#[async_trait]
impl Injectable for Controller {
    async fn inject(injector: &Injector) -> Result<Self> {
        Ok(Self {
            ctx: injector.get_instance::<Context>().await?,
        })
    }
}

/// Records a type's controller metadata
///
/// Discovery calls `annotate` once per exported type and then binds the
/// type. A type that records nothing is skipped.
///
/// ```
/// use std::sync::Arc;
/// use wiremount::controller::{Annotate, Controller, controller, mapping};
/// use wiremount::di::{Injectable, Injector};
/// use wiremount::metadata::MetadataStore;
///
/// struct Hello {
///     base: Controller,
/// }
///
/// #[wiremount::async_trait]
/// impl Injectable for Hello {
///     async fn inject(injector: &Injector) -> wiremount::Result<Self> {
///         Ok(Self { base: Controller::inject(injector).await? })
///     }
/// }
///
/// impl Hello {
///     async fn index(self: Arc<Self>) -> String {
///         format!("hello from {}", self.base.ctx().path())
///     }
/// }
///
/// impl Annotate for Hello {
///     fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
///         controller().prefix("/hello").apply::<Self>(store)?;
///         mapping().apply::<Self, _, _>(store, "index", Self::index)
///     }
/// }
/// ```
pub trait Annotate: Injectable {
    fn annotate(_store: &mut MetadataStore) -> Result<()> {
        Ok(())
    }
}
