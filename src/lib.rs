//! # Wiremount
//!
//! Controller registration and request dispatch with dependency injection,
//! running on axum.
//!
//! Controllers record their routes into a metadata store. At setup the
//! controller plugin discovers them, mounts one route per recorded method
//! and, for every request, resolves the controller and the method's
//! parameters through a request-scoped injector before invoking it.
//!
//! ## Features
//!
//! - **Route recording**: per-method verbs, paths and middleware, class-wide
//!   prefix and middleware
//! - **Dependency Injection**: singleton, request and prototype scopes, the
//!   request [`Context`](context::Context) itself is injectable
//! - **Koa-style middleware**: ordered chains wrapping each controller call
//! - **Discovery**: controller modules announce themselves with [`controllers!`]
//! - **Plugins**: the host is assembled from plugins sharing one setup helper
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wiremount::prelude::*;
//!
//! struct HelloController {
//!     base: Controller,
//! }
//!
//! #[async_trait]
//! impl Injectable for HelloController {
//!     async fn inject(injector: &Injector) -> wiremount::Result<Self> {
//!         Ok(Self { base: Controller::inject(injector).await? })
//!     }
//! }
//!
//! impl HelloController {
//!     async fn index(self: Arc<Self>) -> &'static str {
//!         "hello"
//!     }
//!
//!     async fn echo(self: Arc<Self>) -> String {
//!         self.base.ctx().param("word").unwrap_or_default().to_string()
//!     }
//! }
//!
//! impl Annotate for HelloController {
//!     fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
//!         controller().prefix("/hello").apply::<Self>(store)?;
//!         mapping().apply::<Self, _, _>(store, "index", Self::index)?;
//!         mapping()
//!             .path("/echo/{word}")
//!             .apply::<Self, _, _>(store, "echo", Self::echo)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> wiremount::Result<()> {
//!     let server = App::new()
//!         .plugin(InjectPlugin::default())
//!         .plugin(RouterPlugin::new())
//!         .plugin(ControllerPlugin::default().controller::<HelloController>())
//!         .build()
//!         .await?;
//!
//!     server.listen().await
//! }
//! ```

pub mod app;
pub mod common;
pub mod config;
pub mod context;
pub mod controller;
pub mod di;
pub mod discovery;
pub mod error;
pub mod metadata;
pub mod middleware;
pub mod router;

// Re-export core types
pub use common::ApiResponse;
pub use di::{Container, ContainerBuilder, Injectable, Injector, Scope};
pub use error::{Error, Result};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;
pub use inventory;

/// Prelude module for convenient imports
///
/// ```
/// use wiremount::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{
        App, ControllerPlugin, InjectPlugin, Plugin, ResultPlugin, RouterPlugin, Server,
        SetupHelper,
    };
    pub use crate::common::ApiResponse;
    pub use crate::config::{ConfigService, ControllerConfig, ServerConfig};
    pub use crate::context::{Context, IntoReply, Reply};
    pub use crate::controller::{
        Annotate, Controller, Crud, CrudController, add_to_router, controller, crud_controller,
        mapping,
    };
    pub use crate::controllers;
    pub use crate::di::{Container, ContainerBuilder, Injectable, Injector, Scope};
    pub use crate::error::{Error, Result};
    pub use crate::metadata::MetadataStore;
    pub use crate::middleware::{LoggingMiddleware, Middleware, Next, from_fn};
    pub use crate::router::{Router, Verb};
    pub use async_trait::async_trait;
    pub use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
}
