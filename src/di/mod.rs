mod builder;
mod container;
mod injectable;
mod injector;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use injectable::{Injectable, Scope};
pub use injector::Injector;

pub use container::Instance;
