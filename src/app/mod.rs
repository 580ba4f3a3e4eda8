//! Application host
//!
//! The host is composed from [`Plugin`]s. Each plugin's setup runs once, in
//! registration order, against a shared [`SetupHelper`]. Once every plugin
//! ran, the router is compiled onto axum and the resulting [`Server`] can be
//! served or driven directly in tests.

mod plugin;
mod setup;
mod shutdown;

pub use plugin::{
    CONTROLLER_MODULE, ControllerPlugin, INJECT_MODULE, InjectPlugin, Plugin, RESULT_MODULE,
    ROUTER_MODULE, ResultPlugin, RouterPlugin,
};
pub use setup::SetupHelper;
pub use shutdown::shutdown_signal;

use crate::config::ServerConfig;
use crate::context::Pipeline;
use crate::di::Container;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Application builder
///
/// # Example
///
/// ```rust,no_run
/// use wiremount::app::{App, ControllerPlugin, InjectPlugin, ResultPlugin, RouterPlugin};
/// use wiremount::config::ControllerConfig;
///
/// #[tokio::main]
/// async fn main() -> wiremount::Result<()> {
///     let server = App::new()
///         .plugin(InjectPlugin::default())
///         .plugin(RouterPlugin::new())
///         .plugin(ResultPlugin)
///         .plugin(ControllerPlugin::new(ControllerConfig::default()))
///         .build()
///         .await?;
///
///     server.listen().await
/// }
/// ```
#[derive(Default)]
pub struct App {
    plugins: Vec<Box<dyn Plugin>>,
    server: ServerConfig,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn server_config(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    /// Run every plugin's setup and compile the routes
    ///
    /// # Errors
    /// The first error returned by a plugin, [`Error::ModuleMissing`] when no
    /// plugin installed a router, or [`Error::RouteConflict`] from compiling it.
    pub async fn build(self) -> Result<Server> {
        tracing::info!("Starting application setup...");

        let mut setup = SetupHelper::new();
        for plugin in &self.plugins {
            setup.enter(plugin.name());
            setup.debug("setup");
            plugin.setup(&mut setup).await?;
        }

        let parts = setup.into_parts();
        let router = parts.router.ok_or_else(|| Error::ModuleMissing {
            name: ROUTER_MODULE.to_string(),
        })?;
        let container = Arc::new(parts.container.unwrap_or_default());

        let mut pipeline = Pipeline::new(Arc::clone(&container)).body_limit(self.server.body_limit);
        if let Some(responder) = parts.responder {
            pipeline = pipeline.responder(responder);
        }

        let route_count = router.route_count();
        let router = router.into_axum(pipeline)?;
        tracing::info!("Application setup complete: {} routes", route_count);

        Ok(Server {
            router,
            container,
            modules: parts.modules,
            config: self.server,
        })
    }
}

/// A fully set up application
pub struct Server {
    router: axum::Router,
    container: Arc<Container>,
    modules: BTreeSet<String>,
    config: ServerConfig,
}

impl Server {
    pub fn router(&self) -> &axum::Router {
        &self.router
    }

    pub fn into_router(self) -> axum::Router {
        self.router
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        match listener.local_addr() {
            Ok(addr) => tracing::info!("Listening on {}", addr),
            Err(e) => tracing::warn!("Listening on unknown address: {}", e),
        }
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Bind the configured address and serve
    pub async fn listen(self) -> Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::configuration(format!("cannot bind {}: {}", addr, e)))?;
        self.serve(listener).await
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("modules", &self.modules)
            .field("config", &self.config)
            .finish()
    }
}
