use crate::di::{Injectable, Injector, Scope};
use crate::error::{Error, Result};
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A resolved, type-erased instance
pub type Instance = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn for<'a> Fn(&'a Injector) -> BoxFuture<'a, Result<Instance>> + Send + Sync>;

pub(crate) struct Provider {
    pub(crate) type_name: &'static str,
    pub(crate) scope: Scope,
    pub(crate) factory: Factory,
    pub(crate) singleton: OnceCell<Instance>,
}

fn inject_factory<T: Injectable>(injector: &Injector) -> BoxFuture<'_, Result<Instance>> {
    Box::pin(async move {
        let instance = T::inject(injector).await?;
        Ok(Arc::new(instance) as Instance)
    })
}

fn prebuilt_factory(_injector: &Injector) -> BoxFuture<'_, Result<Instance>> {
    // Registered instances are stored in the singleton cell up front
    Box::pin(async { Err(Error::Internal("pre-built instance is missing".to_string())) })
}

/// Thread-safe dependency injection container.
///
/// Holds one provider per type. Instances are created through an
/// [`Injector`], which is bound to a request context and applies the
/// provider's [`Scope`].
#[derive(Clone, Default)]
pub struct Container {
    providers: DashMap<TypeId, Arc<Provider>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already constructed instance as a singleton
    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        let provider = Provider {
            type_name: std::any::type_name::<T>(),
            scope: Scope::Singleton,
            factory: Arc::new(prebuilt_factory),
            singleton: OnceCell::new_with(Some(Arc::new(instance) as Instance)),
        };
        self.providers.insert(TypeId::of::<T>(), Arc::new(provider));
        self
    }

    /// Provide `T` with its declared scope, singleton when it declares none
    pub fn provide<T: Injectable>(&mut self) -> &mut Self {
        self.provide_scoped::<T>(T::scope().unwrap_or(Scope::Singleton))
    }

    /// Provide `T` with an explicit scope, overriding the declared one
    pub fn provide_scoped<T: Injectable>(&mut self, scope: Scope) -> &mut Self {
        self.providers
            .insert(TypeId::of::<T>(), Arc::new(Self::provider_for::<T>(scope)));
        self
    }

    /// Provide `T` with `scope` unless a provider already exists
    pub(crate) fn ensure<T: Injectable>(&self, scope: Scope) {
        self.providers
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!(
                    "Providing {} with default scope {:?}",
                    std::any::type_name::<T>(),
                    scope
                );
                Arc::new(Self::provider_for::<T>(scope))
            });
    }

    pub(crate) fn provider(&self, type_id: TypeId) -> Option<Arc<Provider>> {
        self.providers
            .get(&type_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn provider_for<T: Injectable>(scope: Scope) -> Provider {
        Provider {
            type_name: std::any::type_name::<T>(),
            scope,
            factory: Arc::new(inject_factory::<T>),
            singleton: OnceCell::new(),
        }
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    /// Scope `T` is provided with, if it is provided at all
    pub fn scope_of<T: 'static>(&self) -> Option<Scope> {
        self.providers
            .get(&TypeId::of::<T>())
            .map(|entry| entry.scope)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for entry in self.providers.iter() {
            list.entry(&format_args!("{} ({:?})", entry.type_name, entry.scope));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct TestService {
        value: i32,
    }

    struct Declared;

    #[async_trait]
    impl Injectable for Declared {
        fn scope() -> Option<Scope> {
            Some(Scope::Request)
        }

        async fn inject(_injector: &Injector) -> Result<Self> {
            Ok(Declared)
        }
    }

    #[test]
    fn test_register_is_singleton() {
        let mut container = Container::new();
        container.register(TestService { value: 42 });

        assert!(container.contains::<TestService>());
        assert_eq!(container.scope_of::<TestService>(), Some(Scope::Singleton));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_provide_uses_declared_scope() {
        let mut container = Container::new();
        container.provide::<Declared>();
        assert_eq!(container.scope_of::<Declared>(), Some(Scope::Request));

        container.provide_scoped::<Declared>(Scope::Prototype);
        assert_eq!(container.scope_of::<Declared>(), Some(Scope::Prototype));
    }

    #[test]
    fn test_ensure_keeps_existing_provider() {
        let mut container = Container::new();
        container.provide_scoped::<Declared>(Scope::Singleton);
        container.ensure::<Declared>(Scope::Prototype);
        assert_eq!(container.scope_of::<Declared>(), Some(Scope::Singleton));

        let fresh = Container::new();
        fresh.ensure::<Declared>(Scope::Prototype);
        assert_eq!(fresh.scope_of::<Declared>(), Some(Scope::Prototype));
    }

    #[test]
    fn test_registered_value_is_kept() {
        let mut container = Container::new();
        container.register(TestService { value: 7 });
        let provider = container.provider(TypeId::of::<TestService>()).unwrap();
        let instance = provider.singleton.get().unwrap().clone();
        assert_eq!(instance.downcast::<TestService>().unwrap().value, 7);
    }
}
