use crate::context::Responder;
use crate::di::Container;
use crate::error::{Error, Result};
use crate::metadata::MetadataStore;
use crate::router::Router;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;

/// Shared state handed to every plugin during setup
///
/// Plugins run in registration order. Capabilities installed by earlier
/// plugins (router, container, responder) are visible to later ones, and
/// each plugin announces itself with [`SetupHelper::define_module`].
#[derive(Default)]
pub struct SetupHelper {
    current: &'static str,
    modules: BTreeSet<String>,
    router: Option<Router>,
    container: Option<Container>,
    responder: Option<Arc<dyn Responder>>,
    store: MetadataStore,
}

impl SetupHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&mut self, plugin: &'static str) {
        self.current = plugin;
    }

    /// Debug log tagged with the plugin being set up
    pub fn debug(&self, message: impl Display) {
        tracing::debug!(plugin = self.current, "{}", message);
    }

    /// Mark a module as active
    pub fn define_module(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::debug!(plugin = self.current, "define module {}", name);
        self.modules.insert(name);
    }

    pub fn module_exists(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    /// # Errors
    /// [`Error::ModuleMissing`] when no earlier plugin defined `name`.
    pub fn assert_module_exists(&self, name: &str) -> Result<()> {
        if self.module_exists(name) {
            Ok(())
        } else {
            Err(Error::ModuleMissing {
                name: name.to_string(),
            })
        }
    }

    pub fn modules(&self) -> &BTreeSet<String> {
        &self.modules
    }

    pub fn install_router(&mut self, router: Router) {
        self.router = Some(router);
    }

    pub fn router_mut(&mut self) -> Result<&mut Router> {
        self.router.as_mut().ok_or_else(|| Error::ModuleMissing {
            name: "router".to_string(),
        })
    }

    pub fn install_container(&mut self, container: Container) {
        self.container = Some(container);
    }

    pub fn container_mut(&mut self) -> Result<&mut Container> {
        self.container.as_mut().ok_or_else(|| Error::ModuleMissing {
            name: "inject".to_string(),
        })
    }

    pub fn set_responder(&mut self, responder: Arc<dyn Responder>) {
        self.responder = Some(responder);
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MetadataStore {
        &mut self.store
    }

    /// Router and metadata store borrowed together, for binding
    pub fn binding_parts(&mut self) -> Result<(&mut Router, &MetadataStore)> {
        let router = self.router.as_mut().ok_or_else(|| Error::ModuleMissing {
            name: "router".to_string(),
        })?;
        Ok((router, &self.store))
    }

    pub(crate) fn into_parts(self) -> SetupParts {
        SetupParts {
            modules: self.modules,
            router: self.router,
            container: self.container,
            responder: self.responder,
        }
    }
}

pub(crate) struct SetupParts {
    pub(crate) modules: BTreeSet<String>,
    pub(crate) router: Option<Router>,
    pub(crate) container: Option<Container>,
    pub(crate) responder: Option<Arc<dyn Responder>>,
}
