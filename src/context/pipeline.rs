use crate::common::ApiResponse;
use crate::context::{Context, Responder};
use crate::di::Container;
use crate::middleware::{Chain, Next};
use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use std::sync::Arc;

/// Default maximum size of a buffered request body (2 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Runs a route's middleware chain for an incoming request
///
/// The pipeline buffers the request, creates its [`Context`], runs the chain
/// and turns the outcome into a response. Errors escaping the chain are
/// logged and converted through [`Error`](crate::Error)'s `IntoResponse`.
#[derive(Clone)]
pub struct Pipeline {
    container: Arc<Container>,
    responder: Option<Arc<dyn Responder>>,
    body_limit: usize,
}

impl Pipeline {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            responder: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Install a structured success helper on every request context
    pub fn responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub async fn dispatch(&self, request: Request, chain: Chain) -> Response {
        let (parts, body) = request.into_parts();
        let body = match axum::body::to_bytes(body, self.body_limit).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read request body for {}: {}", parts.uri, e);
                let status = if exceeds_limit(&e) {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                return ApiResponse::<()>::error(status, e.to_string()).into_response();
            }
        };

        let ctx = Context::new(
            axum::http::Request::from_parts(parts, body),
            Arc::clone(&self.container),
            self.responder.clone(),
        );

        let response = match Next::new(chain).run(Arc::clone(&ctx)).await {
            Ok(()) => ctx.take_response(),
            Err(e) => {
                tracing::error!(
                    request_id = %ctx.id(),
                    "{} {} failed: {}",
                    ctx.method(),
                    ctx.uri(),
                    e
                );
                e.into_response()
            }
        };
        ctx.injector().release();
        response
    }
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("container", &self.container)
            .field("responder", &self.responder.is_some())
            .field("body_limit", &self.body_limit)
            .finish()
    }
}
