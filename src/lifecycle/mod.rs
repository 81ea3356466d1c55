//! Application lifecycle.
//!
//! Boot runs scan, instantiation, and global-provider application, then the
//! init and bootstrap hooks; teardown runs shutdown hooks followed by destroy
//! hooks in reverse registration order:
//!
//! ```text
//! scan  →  instantiate  →  apply globals  →  OnModuleInit
//!     →  OnApplicationBootstrap  →  [running]
//!     →  OnApplicationShutdown  →  OnModuleDestroy (reversed)
//! ```

mod application;
mod error;
mod manager;
mod shutdown;
mod traits;

pub use application::{Application, ApplicationBuilder};
pub use error::{LifecycleError, Result};
pub use manager::LifecycleManager;
pub use shutdown::shutdown_signal;
pub use traits::{OnApplicationBootstrap, OnApplicationShutdown, OnModuleDestroy, OnModuleInit};
