use crate::di::Injector;
use crate::error::Result;
use async_trait::async_trait;

/// Lifetime policy of a provided type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One instance per container, shared by every request
    Singleton,
    /// One instance per request context
    Request,
    /// A fresh instance for every resolution
    Prototype,
}

/// Trait for types that can be created by the injector
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use wiremount::di::{Injectable, Injector, Scope};
///
/// pub struct UserRepository;
///
/// #[wiremount::async_trait]
/// impl Injectable for UserRepository {
///     async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
///         Ok(Self)
///     }
/// }
///
/// pub struct UserService {
///     repository: Arc<UserRepository>,
/// }
///
/// #[wiremount::async_trait]
/// impl Injectable for UserService {
///     fn scope() -> Option<Scope> {
///         Some(Scope::Request)
///     }
///
///     async fn inject(injector: &Injector) -> wiremount::Result<Self> {
///         Ok(Self {
///             repository: injector.get_instance().await?,
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Declared lifetime of the type
    ///
    /// `None` leaves the choice to whoever provides it: the container
    /// defaults to [`Scope::Singleton`], controllers default to
    /// [`Scope::Prototype`].
    fn scope() -> Option<Scope> {
        None
    }

    /// Create an instance by resolving dependencies from the injector
    ///
    /// # Errors
    /// Returns an error if any required dependency cannot be resolved.
    async fn inject(injector: &Injector) -> Result<Self>;
}
