use super::handler::{MethodHandle, MethodHandler, ParamType};
use crate::error::{Error, Result};
use crate::metadata::{ClassId, MetadataStore, Slot};
use crate::middleware::Middleware;
use crate::router::{Methods, Verb};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Key of a controller method
///
/// Plain names derive their route path; symbol keys have no usable name and
/// always need an explicit path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    Name(Cow<'static, str>),
    Symbol(&'static str),
}

impl MethodKey {
    /// Path used when the mapping does not name one
    fn derived_path(&self) -> Result<String> {
        match self {
            MethodKey::Name(name) if name.is_empty() => Err(Error::configuration(
                "a method with an empty name needs an explicit path",
            )),
            MethodKey::Name(name) if name == "index" => Ok("/".to_string()),
            MethodKey::Name(name) => Ok(format!("/{}", name)),
            MethodKey::Symbol(_) => Err(Error::configuration(format!(
                "method {} is keyed by a symbol and needs an explicit path",
                self
            ))),
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKey::Name(name) => f.write_str(name),
            MethodKey::Symbol(description) => write!(f, "Symbol({})", description),
        }
    }
}

impl From<&'static str> for MethodKey {
    fn from(name: &'static str) -> Self {
        MethodKey::Name(Cow::Borrowed(name))
    }
}

impl From<String> for MethodKey {
    fn from(name: String) -> Self {
        MethodKey::Name(Cow::Owned(name))
    }
}

/// Everything recorded about one controller method
pub struct MappingRecord<C> {
    name: MethodKey,
    methods: Methods,
    paths: Vec<String>,
    middleware: Vec<Arc<dyn Middleware>>,
    handle: MethodHandle<C>,
    params: Vec<ParamType>,
}

impl<C> MappingRecord<C> {
    pub fn name(&self) -> &MethodKey {
        &self.name
    }

    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub fn handle(&self) -> &MethodHandle<C> {
        &self.handle
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }
}

impl<C> Clone for MappingRecord<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            methods: self.methods.clone(),
            paths: self.paths.clone(),
            middleware: self.middleware.clone(),
            handle: self.handle.clone(),
            params: self.params.clone(),
        }
    }
}

impl<C> fmt::Debug for MappingRecord<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRecord")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("paths", &self.paths)
            .field("middleware", &self.middleware.len())
            .field("params", &self.params)
            .finish()
    }
}

/// Builder for a method mapping, see [`mapping`]
#[derive(Clone, Default)]
pub struct Mapping {
    methods: Option<Vec<Verb>>,
    paths: Option<Vec<String>>,
    middleware: Vec<Arc<dyn Middleware>>,
}

/// Start recording a method mapping
///
/// Defaults to `GET` on the path derived from the method name (`/` for
/// `index`, `/<name>` otherwise) with no middleware.
///
/// ```
/// use std::sync::Arc;
/// use wiremount::controller::mapping;
/// use wiremount::metadata::MetadataStore;
/// use wiremount::router::Verb;
///
/// struct Users;
///
/// impl Users {
///     async fn list(self: Arc<Self>) -> &'static str {
///         "[]"
///     }
/// }
///
/// let mut store = MetadataStore::new();
/// mapping()
///     .methods([Verb::Get, Verb::Head])
///     .apply::<Users, _, _>(&mut store, "list", Users::list)
///     .unwrap();
/// ```
pub fn mapping() -> Mapping {
    Mapping::default()
}

impl Mapping {
    pub fn method(mut self, verb: Verb) -> Self {
        self.methods.get_or_insert_with(Vec::new).push(verb);
        self
    }

    pub fn methods(mut self, verbs: impl IntoIterator<Item = Verb>) -> Self {
        self.methods = Some(verbs.into_iter().collect());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.get_or_insert_with(Vec::new).push(path.into());
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Append route-scoped middleware, run in the order added
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append a mapping record for `handler` to the records of `C`
    ///
    /// # Errors
    /// [`Error::Configuration`] when no path can be derived, a path does not
    /// start with `/`, or the method list was set explicitly to nothing.
    pub fn apply<C, H, Args>(
        self,
        store: &mut MetadataStore,
        key: impl Into<MethodKey>,
        handler: H,
    ) -> Result<()>
    where
        C: Send + Sync + 'static,
        H: MethodHandler<C, Args>,
        Args: 'static,
    {
        let name = key.into();
        let methods = match self.methods {
            Some(verbs) => Methods::from_verbs(verbs)?,
            None => Methods::Verbs(vec![Verb::Get]),
        };
        let paths = match self.paths {
            Some(paths) if !paths.is_empty() => paths,
            Some(_) => {
                return Err(Error::configuration(format!(
                    "method {} was given an empty path list",
                    name
                )));
            }
            None => vec![name.derived_path()?],
        };
        if let Some(path) = paths.iter().find(|path| !path.starts_with('/')) {
            return Err(Error::configuration(format!(
                "path '{}' of method {} must start with '/'",
                path, name
            )));
        }

        let record = MappingRecord {
            name,
            methods,
            paths,
            middleware: self.middleware,
            params: H::params(),
            handle: MethodHandle::new(handler),
        };

        let class = ClassId::of::<C>();
        let mut records = store
            .take::<Vec<MappingRecord<C>>>(Slot::Mappings, class)
            .unwrap_or_default();
        records.push(record);
        store.define(Slot::Mappings, class, records);
        Ok(())
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("methods", &self.methods)
            .field("paths", &self.paths)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Mapping records of `C`, in registration order
pub fn records_of<C: Send + Sync + 'static>(store: &MetadataStore) -> &[MappingRecord<C>] {
    store
        .get::<Vec<MappingRecord<C>>>(Slot::Mappings, ClassId::of::<C>())
        .map(Vec::as_slice)
        .unwrap_or_default()
}
