use super::dispatch::DispatchAdapter;
use super::mapping::records_of;
use super::options::options_of;
use crate::di::Injectable;
use crate::error::Result;
use crate::metadata::{ClassId, MetadataStore};
use crate::middleware::Middleware;
use crate::router::{Methods, Router};
use std::sync::Arc;

/// Mount every recorded mapping of `C` into `router`
///
/// Routes are built on a sub-router carrying the class prefix and class
/// middleware, then merged into `router`. A class without mapping records
/// is skipped. Returns the number of route registrations added.
pub fn add_to_router<C: Injectable>(router: &mut Router, store: &MetadataStore) -> Result<usize> {
    let class = ClassId::of::<C>();
    let records = records_of::<C>(store);
    if records.is_empty() {
        tracing::debug!("ignore no mapping: {}", class);
        return Ok(0);
    }

    let options = options_of::<C>(store).cloned().unwrap_or_default();
    tracing::debug!("controller option: {} {:?}", class, options);

    let mut sub = match options.prefix_path() {
        Some(prefix) => Router::with_prefix(prefix),
        None => Router::new(),
    };
    for middleware in options.middleware_list() {
        sub.use_middleware(Arc::clone(middleware));
    }

    let mut added = 0;
    for record in records {
        tracing::debug!("controller mapping: {} {:?}", class, record);
        let mut chain: Vec<Arc<dyn Middleware>> = record.middleware().to_vec();
        chain.push(Arc::new(DispatchAdapter::new(record.clone())));

        added += match record.methods() {
            Methods::All => sub.all(record.paths().iter().cloned(), chain)?,
            Methods::Verbs(verbs) => sub.register(record.paths().iter().cloned(), verbs, chain)?,
        };
    }

    router.merge(sub);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{controller, mapping};
    use crate::di::Injector;
    use crate::router::Verb;
    use async_trait::async_trait;

    struct Bare;

    #[async_trait]
    impl Injectable for Bare {
        async fn inject(_injector: &Injector) -> Result<Self> {
            Ok(Bare)
        }
    }

    impl Bare {
        async fn index(self: Arc<Self>) -> &'static str {
            "index"
        }

        async fn aaa(self: Arc<Self>) -> &'static str {
            "aaa"
        }
    }

    #[test]
    fn test_no_records_adds_nothing() {
        let mut router = Router::new();
        let store = MetadataStore::new();
        assert_eq!(add_to_router::<Bare>(&mut router, &store).unwrap(), 0);
        assert_eq!(router.route_count(), 0);
    }

    #[test]
    fn test_prefix_and_middleware_applied() {
        let mut store = MetadataStore::new();
        controller()
            .prefix("/prefix")
            .middleware(crate::middleware::from_fn(|ctx, next| next.run(ctx)))
            .apply::<Bare>(&mut store)
            .unwrap();
        mapping()
            .apply::<Bare, _, _>(&mut store, "index", Bare::index)
            .unwrap();
        mapping()
            .methods([Verb::Post, Verb::Get])
            .paths(["/aaa", "/bbb"])
            .apply::<Bare, _, _>(&mut store, "aaa", Bare::aaa)
            .unwrap();

        let mut router = Router::new();
        assert_eq!(add_to_router::<Bare>(&mut router, &store).unwrap(), 3);

        let paths: Vec<&str> = router.routes().iter().map(|route| route.path()).collect();
        assert_eq!(paths, ["/prefix", "/prefix/aaa", "/prefix/bbb"]);
        // class middleware + dispatch adapter
        assert!(router.routes().iter().all(|route| route.chain_len() == 2));
    }

    #[test]
    fn test_binding_twice_duplicates_routes() {
        let mut store = MetadataStore::new();
        mapping()
            .apply::<Bare, _, _>(&mut store, "index", Bare::index)
            .unwrap();

        let mut router = Router::new();
        add_to_router::<Bare>(&mut router, &store).unwrap();
        add_to_router::<Bare>(&mut router, &store).unwrap();
        assert_eq!(router.route_count(), 2);
    }
}
