use crate::context::Context;
use crate::di::Injectable;
use crate::error::Result;
use crate::middleware::{Middleware, Next};
use crate::router::{Router, Verb};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

type CrudFn<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Lifecycle methods of a CRUD controller
///
/// Each slot is optional; only filled slots are routed.
pub struct Crud<C> {
    get: Option<CrudFn<C>>,
    post: Option<CrudFn<C>>,
    patch: Option<CrudFn<C>>,
    delete: Option<CrudFn<C>>,
}

fn boxed<C, F, Fut>(f: F) -> CrudFn<C>
where
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |instance| Box::pin(f(instance)))
}

impl<C: Send + Sync + 'static> Crud<C> {
    pub fn new() -> Self {
        Self {
            get: None,
            post: None,
            patch: None,
            delete: None,
        }
    }

    pub fn get<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.get = Some(boxed(f));
        self
    }

    pub fn post<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.post = Some(boxed(f));
        self
    }

    pub fn patch<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.patch = Some(boxed(f));
        self
    }

    pub fn delete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.delete = Some(boxed(f));
        self
    }

    /// Verbs with a filled slot, in get/post/patch/delete order
    pub fn verbs(&self) -> Vec<Verb> {
        self.slots().map(|(verb, _)| verb).collect()
    }

    fn slots(&self) -> impl Iterator<Item = (Verb, &CrudFn<C>)> {
        [
            (Verb::Get, &self.get),
            (Verb::Post, &self.post),
            (Verb::Patch, &self.patch),
            (Verb::Delete, &self.delete),
        ]
        .into_iter()
        .filter_map(|(verb, slot)| slot.as_ref().map(|f| (verb, f)))
    }
}

impl<C: Send + Sync + 'static> Default for Crud<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A controller exposing conventional get/post/patch/delete methods
///
/// ```
/// use std::sync::Arc;
/// use wiremount::controller::{Controller, Crud, CrudController};
/// use wiremount::di::{Injectable, Injector};
///
/// struct Notes {
///     base: Controller,
/// }
///
/// #[wiremount::async_trait]
/// impl Injectable for Notes {
///     async fn inject(injector: &Injector) -> wiremount::Result<Self> {
///         Ok(Self { base: Controller::inject(injector).await? })
///     }
/// }
///
/// impl Notes {
///     async fn list(self: Arc<Self>) -> wiremount::Result<()> {
///         self.base.ctx().set_body("[]");
///         Ok(())
///     }
/// }
///
/// impl CrudController for Notes {
///     fn crud() -> Crud<Self> {
///         Crud::new().get(Notes::list)
///     }
/// }
/// ```
pub trait CrudController: Injectable {
    fn crud() -> Crud<Self>;
}

struct CrudDispatch<C> {
    method: CrudFn<C>,
}

#[async_trait]
impl<C: Injectable> Middleware for CrudDispatch<C> {
    async fn handle(&self, ctx: Arc<Context>, _next: Next) -> Result<()> {
        let instance = ctx.injector().instantiate::<C>().await?;
        (self.method)(instance).await
    }
}

/// Register the filled CRUD slots of `C` on `path`
///
/// Each verb gets `middleware` followed by a call of the matching method.
/// Methods take no injected parameters and write the response themselves.
/// Returns the number of registrations added.
pub fn crud_controller<C: CrudController>(
    router: &mut Router,
    path: &str,
    middleware: Vec<Arc<dyn Middleware>>,
) -> Result<usize> {
    let crud = C::crud();
    let mut added = 0;
    for (verb, method) in crud.slots() {
        let mut chain = middleware.clone();
        chain.push(Arc::new(CrudDispatch::<C> {
            method: Arc::clone(method),
        }));
        added += router.register([path], &[verb], chain)?;
    }
    if added == 0 {
        tracing::debug!("crud controller {} has no methods", std::any::type_name::<C>());
    }
    Ok(added)
}
