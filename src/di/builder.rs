use crate::di::{Container, Injectable, Scope};

/// Builder for constructing a dependency injection container
///
/// Use this to configure and register services before handing the container
/// to the application.
///
/// # Example
/// ```
/// use wiremount::di::{ContainerBuilder, Scope};
///
/// struct Database {
///     url: String,
/// }
///
/// let container = ContainerBuilder::new()
///     .register(Database { url: "postgres://localhost".into() })
///     .build();
/// assert_eq!(container.scope_of::<Database>(), Some(Scope::Singleton));
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Provide an injectable type with its declared scope
    pub fn provide<T: Injectable>(mut self) -> Self {
        self.container.provide::<T>();
        self
    }

    /// Provide an injectable type with an explicit scope
    pub fn provide_scoped<T: Injectable>(mut self, scope: Scope) -> Self {
        self.container.provide_scoped::<T>(scope);
        self
    }

    /// Build the container
    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
