//! Controller discovery
//!
//! Controller modules announce their exported types with [`controllers!`].
//! At setup the controller plugin keeps the modules whose path lies under one
//! of the configured `discover_paths` and feeds every export to the binder.
//!
//! A discover path is either a source directory relative to the crate's
//! `src/` (`./controller`, `src/controller/admin`) or a module path
//! (`controller::admin`).
//!
//! [`controllers!`]: crate::controllers

use crate::controller::{Annotate, add_to_router};
use crate::error::{Error, Result};
use crate::metadata::{ClassId, MetadataStore};
use crate::router::Router;
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// One exported type of a controller module
#[derive(Clone, Copy)]
pub struct Export {
    class: ClassId,
    annotate: fn(&mut MetadataStore) -> Result<()>,
    bind: fn(&mut Router, &MetadataStore) -> Result<usize>,
}

impl Export {
    pub fn of<T: Annotate>() -> Self {
        Self {
            class: ClassId::of::<T>(),
            annotate: T::annotate,
            bind: add_to_router::<T>,
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Record the type's metadata
    pub fn annotate(&self, store: &mut MetadataStore) -> Result<()> {
        (self.annotate)(store)
    }

    /// Mount the type's recorded routes
    pub fn bind(&self, router: &mut Router, store: &MetadataStore) -> Result<usize> {
        (self.bind)(router, store)
    }
}

impl std::fmt::Debug for Export {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Export({})", self.class)
    }
}

/// A module that exports controller types
pub struct ControllerModule {
    module_path: &'static str,
    exports: &'static [fn() -> Export],
}

impl ControllerModule {
    pub const fn new(module_path: &'static str, exports: &'static [fn() -> Export]) -> Self {
        Self {
            module_path,
            exports,
        }
    }

    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    pub fn exports(&self) -> impl Iterator<Item = Export> + '_ {
        self.exports.iter().map(|export| export())
    }
}

inventory::collect!(ControllerModule);

/// Announce the controller types exported by the current module
///
/// ```ignore
/// wiremount::controllers!(UserController, RequestController);
/// ```
#[macro_export]
macro_rules! controllers {
    ($($ty:ty),+ $(,)?) => {
        const _: () = {
            const EXPORTS: &[fn() -> $crate::discovery::Export] =
                &[$($crate::discovery::Export::of::<$ty>),+];

            $crate::inventory::submit! {
                $crate::discovery::ControllerModule::new(module_path!(), EXPORTS)
            }
        };
    };
}

/// Module path segments a discover path stands for
///
/// Returns `None` for a directory outside the current working directory,
/// which can hold no module of this crate.
pub fn path_segments(path: &str) -> Result<Option<Vec<String>>> {
    let path = path.trim();
    if path.is_empty() {
        return Err(Error::configuration("discover path must not be empty"));
    }

    if path.contains("::") {
        return Ok(Some(
            path.split("::")
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        ));
    }

    let path = Path::new(path);
    let relative = if path.is_absolute() {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::configuration(format!("cannot read working directory: {}", e)))?;
        match path.strip_prefix(&cwd) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => return Ok(None),
        }
    } else {
        path.to_path_buf()
    };

    let mut segments: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                let part = part.strip_suffix(".rs").unwrap_or(&part);
                segments.push(part.to_string());
            }
            Component::ParentDir => {
                segments.pop();
            }
            _ => {}
        }
    }
    if segments.first().map(String::as_str) == Some("src") {
        segments.remove(0);
    }
    if segments.last().map(String::as_str) == Some("mod") {
        segments.pop();
    }
    Ok(Some(segments))
}

/// Whether `module_path` lies under the module described by `segments`
///
/// The leading crate name of `module_path` is ignored.
pub fn module_matches(module_path: &str, segments: &[String]) -> bool {
    let mut parts = module_path.split("::").skip(1);
    segments
        .iter()
        .all(|segment| parts.next() == Some(segment.as_str()))
}

/// Controller modules under the given discover paths, ordered by module path
pub fn discover(discover_paths: &[String]) -> Result<Vec<&'static ControllerModule>> {
    let mut targets = Vec::with_capacity(discover_paths.len());
    for path in discover_paths {
        match path_segments(path)? {
            Some(segments) => targets.push(segments),
            None => tracing::warn!("discover path {} is outside the working directory", path),
        }
    }

    let mut found: BTreeMap<&'static str, &'static ControllerModule> = BTreeMap::new();
    for module in inventory::iter::<ControllerModule> {
        if targets
            .iter()
            .any(|segments| module_matches(module.module_path, segments))
        {
            found.entry(module.module_path).or_insert(module);
        }
    }
    Ok(found.into_values().collect())
}
