use super::setup::SetupHelper;
use crate::common::ApiResponder;
use crate::config::ControllerConfig;
use crate::controller::Annotate;
use crate::di::Container;
use crate::discovery::{self, Export};
use crate::error::Result;
use crate::router::Router;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

pub const INJECT_MODULE: &str = "inject";
pub const ROUTER_MODULE: &str = "router";
pub const RESULT_MODULE: &str = "result";
pub const CONTROLLER_MODULE: &str = "controller";

/// A unit of host setup
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    async fn setup(&self, setup: &mut SetupHelper) -> Result<()>;
}

/// Installs the dependency injection container
#[derive(Debug, Clone, Default)]
pub struct InjectPlugin {
    container: Container,
}

impl InjectPlugin {
    pub fn new(container: Container) -> Self {
        Self { container }
    }
}

#[async_trait]
impl Plugin for InjectPlugin {
    fn name(&self) -> &'static str {
        INJECT_MODULE
    }

    async fn setup(&self, setup: &mut SetupHelper) -> Result<()> {
        setup.debug(format_args!("{} providers", self.container.len()));
        setup.install_container(self.container.clone());
        setup.define_module(INJECT_MODULE);
        Ok(())
    }
}

/// Installs the application router
#[derive(Debug, Clone, Default)]
pub struct RouterPlugin {
    prefix: String,
}

impl RouterPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount every route under `prefix`
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[async_trait]
impl Plugin for RouterPlugin {
    fn name(&self) -> &'static str {
        ROUTER_MODULE
    }

    async fn setup(&self, setup: &mut SetupHelper) -> Result<()> {
        setup.install_router(Router::with_prefix(&self.prefix));
        setup.define_module(ROUTER_MODULE);
        Ok(())
    }
}

/// Wraps controller results in the [`ApiResponse`](crate::common::ApiResponse) envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultPlugin;

#[async_trait]
impl Plugin for ResultPlugin {
    fn name(&self) -> &'static str {
        RESULT_MODULE
    }

    async fn setup(&self, setup: &mut SetupHelper) -> Result<()> {
        setup.set_responder(Arc::new(ApiResponder));
        setup.define_module(RESULT_MODULE);
        Ok(())
    }
}

/// Discovers controllers and mounts their routes
///
/// Requires the `router` and `inject` modules. Types announced with
/// [`controllers!`](crate::controllers) under the configured discover paths
/// are bound first, followed by types registered with
/// [`ControllerPlugin::controller`]. A type is bound at most once.
#[derive(Debug, Clone, Default)]
pub struct ControllerPlugin {
    config: ControllerConfig,
    explicit: Vec<Export>,
}

impl ControllerPlugin {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            explicit: Vec::new(),
        }
    }

    /// Bind `T` regardless of discovery
    pub fn controller<T: Annotate>(mut self) -> Self {
        self.explicit.push(Export::of::<T>());
        self
    }
}

#[async_trait]
impl Plugin for ControllerPlugin {
    fn name(&self) -> &'static str {
        CONTROLLER_MODULE
    }

    async fn setup(&self, setup: &mut SetupHelper) -> Result<()> {
        setup.debug(format_args!("option: {:?}", self.config));
        setup.assert_module_exists(ROUTER_MODULE)?;
        setup.assert_module_exists(INJECT_MODULE)?;
        setup.define_module(CONTROLLER_MODULE);

        let mut exports = Vec::new();
        for module in discovery::discover(&self.config.discover_paths)? {
            setup.debug(format_args!("load: {}", module.module_path()));
            exports.extend(module.exports());
        }
        exports.extend(self.explicit.iter().copied());

        let mut seen = HashSet::new();
        exports.retain(|export| seen.insert(export.class()));

        for export in &exports {
            export.annotate(setup.store_mut())?;
        }

        let (router, store) = setup.binding_parts()?;
        let mut added = 0;
        for export in &exports {
            added += export.bind(router, store)?;
        }
        setup.debug(format_args!(
            "bound {} controllers, {} routes",
            exports.len(),
            added
        ));
        Ok(())
    }
}
