use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use wiremount::prelude::*;

async fn call(router: &axum::Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

mod controller {
    use super::*;

    pub struct Discovered;

    #[async_trait]
    impl Injectable for Discovered {
        async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
            Ok(Discovered)
        }
    }

    impl Discovered {
        async fn found(self: Arc<Self>) -> &'static str {
            "found"
        }

        async fn failing(self: Arc<Self>) -> wiremount::Result<String> {
            Err(Error::handler("boom"))
        }

        async fn quiet(self: Arc<Self>) {}
    }

    impl Annotate for Discovered {
        fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
            controller().prefix("/discovered").apply::<Self>(store)?;
            mapping().apply::<Self, _, _>(store, "found", Self::found)?;
            mapping().apply::<Self, _, _>(store, "failing", Self::failing)?;
            mapping().apply::<Self, _, _>(store, "quiet", Self::quiet)
        }
    }

    controllers!(Discovered);
}

mod admin {
    use super::*;

    pub struct Hidden;

    #[async_trait]
    impl Injectable for Hidden {
        async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
            Ok(Hidden)
        }
    }

    impl Hidden {
        async fn hidden(self: Arc<Self>) -> &'static str {
            "hidden"
        }
    }

    impl Annotate for Hidden {
        fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
            mapping().apply::<Self, _, _>(store, "hidden", Self::hidden)
        }
    }

    controllers!(Hidden);
}

struct Notes {
    base: Controller,
}

#[async_trait]
impl Injectable for Notes {
    async fn inject(injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            base: Controller::inject(injector).await?,
        })
    }
}

impl Notes {
    async fn get(self: Arc<Self>) -> wiremount::Result<()> {
        self.base.ctx().set_body("get");
        Ok(())
    }

    async fn post(self: Arc<Self>) -> wiremount::Result<()> {
        self.base.ctx().set_status(StatusCode::CREATED);
        self.base.ctx().set_body("post");
        Ok(())
    }
}

impl CrudController for Notes {
    fn crud() -> Crud<Self> {
        Crud::new().get(Notes::get).post(Notes::post)
    }
}

struct CrudPlugin;

#[async_trait]
impl Plugin for CrudPlugin {
    fn name(&self) -> &'static str {
        "crud"
    }

    async fn setup(&self, setup: &mut SetupHelper) -> wiremount::Result<()> {
        crud_controller::<Notes>(setup.router_mut()?, "/crud", vec![])?;
        Ok(())
    }
}

struct Twice;

#[async_trait]
impl Injectable for Twice {
    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Twice)
    }
}

impl Twice {
    async fn index(self: Arc<Self>) {}
}

impl Annotate for Twice {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping().apply::<Self, _, _>(store, "index", Self::index)?;
        mapping().apply::<Self, _, _>(store, "index", Self::index)
    }
}

fn base_app() -> App {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    App::new()
        .plugin(InjectPlugin::default())
        .plugin(RouterPlugin::new())
}

#[tokio::test]
async fn test_controller_plugin_requires_router() {
    let err = App::new()
        .plugin(InjectPlugin::default())
        .plugin(ControllerPlugin::default())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ModuleMissing { ref name } if name == "router"));

    let err = App::new()
        .plugin(RouterPlugin::new())
        .plugin(ControllerPlugin::default())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ModuleMissing { ref name } if name == "inject"));
}

#[tokio::test]
async fn test_discovery_by_directory() {
    let router = base_app()
        .plugin(ControllerPlugin::default())
        .build()
        .await
        .unwrap()
        .into_router();

    assert_eq!(
        call(&router, Method::GET, "/discovered/found").await,
        (StatusCode::OK, "found".to_string())
    );
    // outside ./controller
    assert_eq!(
        call(&router, Method::GET, "/hidden").await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_discovery_by_module_path() {
    let config = ControllerConfig::new().discover_paths(["./controller", "admin"]);
    let router = base_app()
        .plugin(ControllerPlugin::new(config))
        .build()
        .await
        .unwrap()
        .into_router();

    assert_eq!(call(&router, Method::GET, "/hidden").await.1, "hidden");
    assert_eq!(call(&router, Method::GET, "/discovered/found").await.1, "found");
}

#[tokio::test]
async fn test_discovered_and_explicit_bound_once() {
    let router = base_app()
        .plugin(ControllerPlugin::default().controller::<controller::Discovered>())
        .build()
        .await;
    // a second binding would conflict on GET /discovered/found
    assert!(router.is_ok());
}

#[tokio::test]
async fn test_handler_error_becomes_500() {
    let router = base_app()
        .plugin(ControllerPlugin::default())
        .build()
        .await
        .unwrap()
        .into_router();

    let (status, body) = call(&router, Method::GET, "/discovered/failing").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "Internal Server Error");
}

#[tokio::test]
async fn test_result_plugin_wraps_values() {
    let router = base_app()
        .plugin(ResultPlugin)
        .plugin(ControllerPlugin::default())
        .build()
        .await
        .unwrap()
        .into_router();

    let (status, body) = call(&router, Method::GET, "/discovered/found").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, serde_json::json!({ "data": "found", "success": true }));
}

#[tokio::test]
async fn test_crud_only_present_methods() {
    let router = base_app()
        .plugin(CrudPlugin)
        .build()
        .await
        .unwrap()
        .into_router();

    assert_eq!(
        call(&router, Method::GET, "/crud").await,
        (StatusCode::OK, "get".to_string())
    );
    assert_eq!(
        call(&router, Method::POST, "/crud").await,
        (StatusCode::CREATED, "post".to_string())
    );
    for method in [Method::PATCH, Method::DELETE] {
        assert_eq!(
            call(&router, method, "/crud").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}

#[tokio::test]
async fn test_duplicate_route_is_conflict() {
    let err = base_app()
        .plugin(
            ControllerPlugin::new(ControllerConfig::new().discover_paths(["./none"]))
                .controller::<Twice>(),
        )
        .build()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RouteConflict { ref method, ref path } if method == "GET" && path == "/"
    ));
}

#[tokio::test]
async fn test_no_value_is_no_content() {
    let router = base_app()
        .plugin(ControllerPlugin::default())
        .build()
        .await
        .unwrap()
        .into_router();
    assert_eq!(
        call(&router, Method::GET, "/discovered/quiet").await,
        (StatusCode::NO_CONTENT, String::new())
    );
}
