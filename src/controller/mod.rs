//! Controller registration and dispatch
//!
//! Controllers record their routes into a [`MetadataStore`] with
//! [`mapping`] and [`controller`], usually from [`Annotate::annotate`].
//! [`add_to_router`] then turns the recorded metadata into router
//! registrations whose terminal step is a [`DispatchAdapter`].
//!
//! [`MetadataStore`]: crate::metadata::MetadataStore

mod base;
mod binder;
mod crud;
mod dispatch;
mod handler;
mod mapping;
mod options;

pub use base::{Annotate, Controller};
pub use binder::add_to_router;
pub use crud::{Crud, CrudController, crud_controller};
pub use dispatch::DispatchAdapter;
pub use handler::{MethodHandle, MethodHandler, ParamType};
pub use mapping::{Mapping, MappingRecord, MethodKey, mapping, records_of};
pub use options::{ControllerOptions, controller, options_of};
