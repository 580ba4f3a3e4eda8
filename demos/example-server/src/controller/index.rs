use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use wiremount::prelude::*;

fn action_log() -> impl Middleware {
    from_fn(|ctx, next| async move {
        tracing::info!("actionLog middleware");
        next.run(ctx).await
    })
}

fn login_required() -> impl Middleware {
    from_fn(|ctx, next| async move {
        tracing::info!("loginRequired middleware");
        next.run(ctx).await
    })
}

pub struct Simple {
    base: Controller,
}

#[async_trait]
impl Injectable for Simple {
    async fn inject(injector: &Injector) -> wiremount::Result<Self> {
        let base = Controller::inject(injector).await?;
        // runs on every request
        tracing::info!("init: {}", base.ctx().path());
        Ok(Self { base })
    }
}

impl Simple {
    async fn index(self: Arc<Self>) -> &'static str {
        "index"
    }

    async fn simple(self: Arc<Self>) -> &'static str {
        "simple"
    }

    async fn aaa(self: Arc<Self>) -> String {
        format!("aaa via {}", self.base.ctx().method())
    }

    async fn all(self: Arc<Self>) -> &'static str {
        "any method"
    }
}

impl Annotate for Simple {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        controller()
            .prefix("/prefix")
            .middleware(action_log())
            .apply::<Self>(store)?;

        mapping().apply::<Self, _, _>(store, "index", Self::index)?;
        mapping().apply::<Self, _, _>(store, "simple", Self::simple)?;
        mapping()
            .methods([Verb::Post, Verb::Get])
            .paths(["/aaa", "/bbb"])
            .middleware(login_required())
            .apply::<Self, _, _>(store, "aaa", Self::aaa)?;
        mapping()
            .method(Verb::All)
            .apply::<Self, _, _>(store, "all", Self::all)
    }
}

pub struct RequestController;

#[async_trait]
impl Injectable for RequestController {
    fn scope() -> Option<Scope> {
        Some(Scope::Request)
    }

    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self)
    }
}

impl RequestController {
    async fn req(self: Arc<Self>) -> &'static str {
        "req"
    }
}

impl Annotate for RequestController {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping().apply::<Self, _, _>(store, "req", Self::req)
    }
}

pub struct SingletonController {
    i: AtomicU64,
}

#[async_trait]
impl Injectable for SingletonController {
    fn scope() -> Option<Scope> {
        Some(Scope::Singleton)
    }

    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            i: AtomicU64::new(0),
        })
    }
}

impl SingletonController {
    async fn counter(self: Arc<Self>) -> u64 {
        self.i.fetch_add(1, Ordering::SeqCst)
    }
}

impl Annotate for SingletonController {
    fn annotate(store: &mut MetadataStore) -> wiremount::Result<()> {
        mapping().apply::<Self, _, _>(store, "counter", Self::counter)
    }
}

controllers!(Simple, RequestController, SingletonController);
