use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;
use wiremount::prelude::*;

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, String) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn build(container: Container, plugin: ControllerPlugin) -> axum::Router {
    App::new()
        .plugin(InjectPlugin::new(container))
        .plugin(RouterPlugin::new())
        .plugin(plugin)
        .build()
        .await
        .unwrap()
        .into_router()
}

static CREATED: AtomicUsize = AtomicUsize::new(0);

struct Foo(&'static str);
struct Bar(&'static str);

/// Counts instances created per request
struct PerRequest {
    id: usize,
}

#[async_trait]
impl Injectable for PerRequest {
    fn scope() -> Option<Scope> {
        Some(Scope::Request)
    }

    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            id: CREATED.fetch_add(1, Ordering::SeqCst),
        })
    }
}

struct Params;

#[async_trait]
impl Injectable for Params {
    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Params)
    }
}

impl Params {
    async fn ordered(self: Arc<Self>, foo: Arc<Foo>, bar: Arc<Bar>) -> String {
        format!("{}+{}", foo.0, bar.0)
    }

    async fn shared(self: Arc<Self>, a: Arc<PerRequest>, b: Arc<PerRequest>) -> bool {
        Arc::ptr_eq(&a, &b)
    }

    async fn request_id(self: Arc<Self>, a: Arc<PerRequest>) -> usize {
        a.id
    }

    async fn path(self: Arc<Self>, ctx: Arc<Context>) -> String {
        ctx.path().to_string()
    }

    async fn missing(self: Arc<Self>, _missing: Arc<String>) {}
}

impl Annotate for Params {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping().apply::<Self, _, _>(store, "ordered", Self::ordered)?;
        mapping().apply::<Self, _, _>(store, "shared", Self::shared)?;
        mapping().apply::<Self, _, _>(store, "request_id", Self::request_id)?;
        mapping().apply::<Self, _, _>(store, "path", Self::path)?;
        mapping().apply::<Self, _, _>(store, "missing", Self::missing)
    }
}

/// Controller with no declared scope: fresh per request
struct Fresh {
    hits: AtomicUsize,
}

#[async_trait]
impl Injectable for Fresh {
    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            hits: AtomicUsize::new(0),
        })
    }
}

impl Fresh {
    async fn hit(self: Arc<Self>) -> usize {
        self.hits.fetch_add(1, Ordering::SeqCst)
    }
}

impl Annotate for Fresh {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping().apply::<Self, _, _>(store, "hit", Self::hit)
    }
}

struct Counter {
    i: AtomicUsize,
}

#[async_trait]
impl Injectable for Counter {
    fn scope() -> Option<Scope> {
        Some(Scope::Singleton)
    }

    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            i: AtomicUsize::new(0),
        })
    }
}

impl Counter {
    async fn counter(self: Arc<Self>) -> usize {
        self.i.fetch_add(1, Ordering::SeqCst)
    }
}

impl Annotate for Counter {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping().apply::<Self, _, _>(store, "counter", Self::counter)
    }
}

struct WithContext {
    base: Controller,
}

#[async_trait]
impl Injectable for WithContext {
    async fn inject(injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            base: Controller::inject(injector).await?,
        })
    }
}

impl WithContext {
    async fn show(self: Arc<Self>) -> String {
        let ctx = self.base.ctx();
        format!("{} {}", ctx.method(), ctx.param("id").unwrap_or("-"))
    }
}

impl Annotate for WithContext {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping()
            .path("/items/{id}")
            .apply::<Self, _, _>(store, "show", Self::show)
    }
}

fn params_container() -> Container {
    ContainerBuilder::new()
        .register(Foo("foo"))
        .register(Bar("bar"))
        .provide::<PerRequest>()
        .build()
}

#[tokio::test]
async fn test_params_passed_in_order() {
    let router = build(params_container(), ControllerPlugin::default().controller::<Params>()).await;
    assert_eq!(get(&router, "/ordered").await, (StatusCode::OK, "foo+bar".to_string()));
}

#[tokio::test]
async fn test_request_scope_shared_within_request() {
    let router = build(params_container(), ControllerPlugin::default().controller::<Params>()).await;
    assert_eq!(get(&router, "/shared").await.1, "true");

    let first = get(&router, "/request_id").await.1;
    let second = get(&router, "/request_id").await.1;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_context_is_injectable() {
    let router = build(params_container(), ControllerPlugin::default().controller::<Params>()).await;
    assert_eq!(get(&router, "/path").await.1, "/path");
}

#[tokio::test]
async fn test_missing_dependency_is_server_error() {
    let router = build(params_container(), ControllerPlugin::default().controller::<Params>()).await;
    let (status, body) = get(&router, "/missing").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_controllers_default_to_prototype() {
    let router = build(Container::new(), ControllerPlugin::default().controller::<Fresh>()).await;
    assert_eq!(get(&router, "/hit").await.1, "0");
    assert_eq!(get(&router, "/hit").await.1, "0");
}

#[tokio::test]
async fn test_explicit_registration_wins() {
    let container = ContainerBuilder::new()
        .provide_scoped::<Fresh>(Scope::Singleton)
        .build();
    let router = build(container, ControllerPlugin::default().controller::<Fresh>()).await;
    assert_eq!(get(&router, "/hit").await.1, "0");
    assert_eq!(get(&router, "/hit").await.1, "1");
}

#[tokio::test]
async fn test_singleton_controller_keeps_state() {
    let router = build(Container::new(), ControllerPlugin::default().controller::<Counter>()).await;
    assert_eq!(get(&router, "/counter").await.1, "0");
    assert_eq!(get(&router, "/counter").await.1, "1");
    assert_eq!(get(&router, "/counter").await.1, "2");
}

#[tokio::test]
async fn test_base_controller_sees_request() {
    let router = build(Container::new(), ControllerPlugin::default().controller::<WithContext>()).await;
    assert_eq!(get(&router, "/items/42").await.1, "GET 42");
}

#[tokio::test]
async fn test_base_controller_follows_each_request() {
    let router = build(Container::new(), ControllerPlugin::default().controller::<WithContext>()).await;
    assert_eq!(get(&router, "/items/1").await.1, "GET 1");
    assert_eq!(get(&router, "/items/2").await.1, "GET 2");
}
