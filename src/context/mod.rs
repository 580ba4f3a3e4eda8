//! Request context
//!
//! A [`Context`] is created for every request that reaches a registered
//! route. It carries the buffered request, the response being built by the
//! middleware chain, the optional success helper and the request's
//! [`Injector`].

use crate::di::{Container, Injector};
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

mod pipeline;
mod reply;

pub use pipeline::{DEFAULT_BODY_LIMIT, Pipeline};
pub use reply::{IntoReply, Reply};

/// Structured success helper exposed by the host
///
/// When a context carries a responder, controller results are written
/// through it instead of being assigned as the raw body.
pub trait Responder: Send + Sync + 'static {
    fn success(&self, ctx: &Context, value: Reply);
}

/// Path parameters captured by the router for the matched route
#[derive(Debug, Clone, Default)]
pub(crate) struct PathParams(pub(crate) Vec<(String, String)>);

#[derive(Default)]
struct ResponseState {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Reply>,
}

impl ResponseState {
    fn effective_status(&self) -> StatusCode {
        match (self.status, &self.body) {
            (Some(status), _) => status,
            (None, Some(_)) => StatusCode::OK,
            (None, None) => StatusCode::NO_CONTENT,
        }
    }
}

pub struct Context {
    id: Uuid,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Vec<(String, String)>,
    body: Bytes,
    response: Mutex<ResponseState>,
    responder: Option<Arc<dyn Responder>>,
    injector: Injector,
}

impl Context {
    /// Create the context of one request
    pub fn new(
        request: Request<Bytes>,
        container: Arc<Container>,
        responder: Option<Arc<dyn Responder>>,
    ) -> Arc<Self> {
        let (mut parts, body) = request.into_parts();
        let params = parts
            .extensions
            .remove::<PathParams>()
            .unwrap_or_default()
            .0;

        Arc::new_cyclic(|weak| Context {
            id: Uuid::new_v4(),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            params,
            body,
            response: Mutex::new(ResponseState::default()),
            responder,
            injector: Injector::new(container, weak.clone()),
        })
    }

    /// Unique id of this request, used to correlate log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a path parameter of the matched route
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn request_body(&self) -> &Bytes {
        &self.body
    }

    /// Deserialize the request body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Structured success helper, when the host installed one
    pub fn responder(&self) -> Option<&Arc<dyn Responder>> {
        self.responder.as_ref()
    }

    pub fn set_status(&self, status: StatusCode) {
        self.lock_response().status = Some(status);
    }

    /// Status explicitly set by the chain, if any
    pub fn status(&self) -> Option<StatusCode> {
        self.lock_response().status
    }

    /// Status the response will be sent with
    ///
    /// Defaults to `200 OK` with a body and `204 No Content` without one.
    pub fn effective_status(&self) -> StatusCode {
        self.lock_response().effective_status()
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock_response().headers.insert(name, value);
    }

    /// Assign the raw response body
    pub fn set_body(&self, body: impl Into<Reply>) {
        self.lock_response().body = Some(body.into());
    }

    pub fn body(&self) -> Option<Reply> {
        self.lock_response().body.clone()
    }

    pub fn has_body(&self) -> bool {
        self.lock_response().body.is_some()
    }

    /// Turn the response state into an HTTP response
    ///
    /// The body is moved out, so this is called once at the end of the chain.
    pub fn take_response(&self) -> Response {
        let mut state = self.lock_response();
        let status = state.effective_status();
        let mut response = match state.body.take() {
            Some(reply) => reply.into_response(),
            None => Response::new(Body::empty()),
        };
        *response.status_mut() = status;
        response
            .headers_mut()
            .extend(std::mem::take(&mut state.headers));
        response
    }

    fn lock_response(&self) -> MutexGuard<'_, ResponseState> {
        self.response.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("params", &self.params)
            .finish()
    }
}
