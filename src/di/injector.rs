use crate::context::Context;
use crate::di::container::Provider;
use crate::di::{Container, Injectable, Instance, Scope};
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;

/// Request-bound view of the [`Container`]
///
/// Every request context owns one injector. It resolves provided types with
/// their scope applied and caches request-scoped instances for the lifetime
/// of the request. The request [`Context`] itself is always resolvable.
pub struct Injector {
    container: Arc<Container>,
    context: Weak<Context>,
    request_instances: DashMap<TypeId, Arc<OnceCell<Instance>>>,
}

impl Injector {
    pub(crate) fn new(container: Arc<Container>, context: Weak<Context>) -> Self {
        Self {
            container,
            context,
            request_instances: DashMap::new(),
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// The request context this injector belongs to
    pub fn context(&self) -> Result<Arc<Context>> {
        self.context
            .upgrade()
            .ok_or_else(|| Error::Internal("request context already released".to_string()))
    }

    /// Resolve an instance of `T` for the current request
    ///
    /// # Errors
    /// [`Error::DependencyNotFound`] when `T` is not provided, or whatever the
    /// provider's construction returns.
    pub async fn get_instance<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let instance: Instance = if type_id == TypeId::of::<Context>() {
            self.context()? as Instance
        } else {
            let provider = self
                .container
                .provider(type_id)
                .ok_or_else(Error::not_found::<T>)?;
            self.resolve(type_id, &provider).await?
        };
        instance
            .downcast::<T>()
            .map_err(|_| Error::downcast_failed::<T>())
    }

    /// Resolve a controller instance
    ///
    /// A controller that was never provided explicitly is provided on first
    /// use with its declared scope, or [`Scope::Prototype`] when it declares
    /// none. An explicit registration always wins.
    pub async fn instantiate<C: Injectable>(&self) -> Result<Arc<C>> {
        self.container
            .ensure::<C>(C::scope().unwrap_or(Scope::Prototype));
        if self.container.scope_of::<C>() == Some(Scope::Singleton) {
            tracing::debug!(
                "{} is a singleton controller; a request context it captures stays bound to the first request",
                std::any::type_name::<C>()
            );
        }
        self.get_instance::<C>().await
    }

    /// Drop every request-scoped instance cached for this request
    ///
    /// Request-scoped instances may hold the request [`Context`], which owns
    /// this injector. Called once the response has been produced.
    pub fn release(&self) {
        self.request_instances.clear();
    }

    async fn resolve(&self, type_id: TypeId, provider: &Provider) -> Result<Instance> {
        match provider.scope {
            Scope::Singleton => provider
                .singleton
                .get_or_try_init(|| (provider.factory)(self))
                .await
                .cloned(),
            Scope::Request => {
                let cell = Arc::clone(self.request_instances.entry(type_id).or_default().value());
                cell.get_or_try_init(|| (provider.factory)(self))
                    .await
                    .cloned()
            }
            Scope::Prototype => (provider.factory)(self).await,
        }
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("container", &self.container)
            .field("request_instances", &self.request_instances.len())
            .finish()
    }
}
