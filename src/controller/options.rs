use crate::error::{Error, Result};
use crate::metadata::{ClassId, MetadataStore, Slot};
use crate::middleware::Middleware;
use std::fmt;
use std::sync::Arc;

/// Class-wide controller options, see [`controller`]
#[derive(Clone, Default)]
pub struct ControllerOptions {
    prefix: Option<String>,
    middleware: Vec<Arc<dyn Middleware>>,
}

/// Start recording class-wide options
///
/// Every route of the class is mounted under `prefix` and runs `middleware`
/// before the method's own middleware.
pub fn controller() -> ControllerOptions {
    ControllerOptions::default()
}

impl ControllerOptions {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn prefix_path(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn middleware_list(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Store these options for `C`, replacing earlier ones
    pub fn apply<C: Send + Sync + 'static>(mut self, store: &mut MetadataStore) -> Result<()> {
        if let Some(prefix) = self.prefix.take() {
            if !prefix.starts_with('/') {
                return Err(Error::configuration(format!(
                    "controller prefix '{}' must start with '/'",
                    prefix
                )));
            }
            let trimmed = prefix.trim_end_matches('/');
            self.prefix = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        store.define(Slot::Options, ClassId::of::<C>(), self);
        Ok(())
    }
}

impl fmt::Debug for ControllerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Options recorded for `C`, if any
pub fn options_of<C: Send + Sync + 'static>(store: &MetadataStore) -> Option<&ControllerOptions> {
    store.get::<ControllerOptions>(Slot::Options, ClassId::of::<C>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;

    struct Simple;

    #[test]
    fn test_prefix_is_normalized() {
        let mut store = MetadataStore::new();
        controller().prefix("/prefix/").apply::<Simple>(&mut store).unwrap();
        assert_eq!(
            options_of::<Simple>(&store).unwrap().prefix_path(),
            Some("/prefix")
        );

        controller().prefix("/").apply::<Simple>(&mut store).unwrap();
        assert_eq!(options_of::<Simple>(&store).unwrap().prefix_path(), None);
    }

    #[test]
    fn test_relative_prefix_rejected() {
        let mut store = MetadataStore::new();
        let err = controller().prefix("prefix").apply::<Simple>(&mut store);
        assert!(matches!(err, Err(Error::Configuration { .. })));
        assert!(options_of::<Simple>(&store).is_none());
    }

    #[test]
    fn test_apply_replaces_previous_options() {
        let mut store = MetadataStore::new();
        controller()
            .prefix("/a")
            .middleware(from_fn(|ctx, next| next.run(ctx)))
            .apply::<Simple>(&mut store)
            .unwrap();
        controller().apply::<Simple>(&mut store).unwrap();

        let options = options_of::<Simple>(&store).unwrap();
        assert_eq!(options.prefix_path(), None);
        assert!(options.middleware_list().is_empty());
    }
}
