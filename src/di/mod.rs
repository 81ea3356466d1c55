//! The dependency injection runtime.
//!
//! Boot happens in three phases. The [`scanner::DependenciesScanner`] walks
//! the root module's descriptor tree and populates the
//! [`container::Container`] with one [`module::ModuleRecord`] per distinct
//! module. The [`loader::InstanceLoader`] then allocates a prototype wrapper
//! per token and constructs every instance, delegating individual
//! constructions to the [`injector::Injector`], which resolves dependency
//! edges honoring module export visibility. Finally the scanner pushes
//! resolved global providers into the
//! [`ApplicationConfig`](crate::config::ApplicationConfig).

pub mod container;
pub mod deferred;
pub mod injector;
pub mod loader;
pub mod module;
pub mod scanner;
pub mod wrapper;

pub use container::Container;
pub use deferred::{Deferred, DeferredRef};
pub use injector::Injector;
pub use loader::InstanceLoader;
pub use module::ModuleRecord;
pub use scanner::{DependenciesScanner, GlobalProviderKind, GlobalProviderRecord};
pub use wrapper::{Injected, InstanceRef, InstanceWrapper};
