//! Lifecycle hook traits.
//!
//! Hooks take `&self`: instances live in the container as shared handles, so
//! a service that mutates state in a hook does it through interior
//! mutability, the same way it would at request time.

use async_trait::async_trait;

use super::LifecycleError;

/// Called once the owning module's dependencies are resolved, before the
/// application accepts requests. Open connections, warm caches, subscribe to
/// queues here.
#[async_trait]
pub trait OnModuleInit: Send + Sync {
    async fn on_module_init(&self) -> Result<(), LifecycleError>;
}

/// Called after every module finished initializing. The last hook before the
/// application starts serving; start background tasks and schedulers here.
#[async_trait]
pub trait OnApplicationBootstrap: Send + Sync {
    async fn on_application_bootstrap(&self) -> Result<(), LifecycleError>;
}

/// Called when a shutdown signal arrives, before modules are destroyed. Stop
/// accepting work and drain what is in flight.
#[async_trait]
pub trait OnApplicationShutdown: Send + Sync {
    async fn on_application_shutdown(&self) -> Result<(), LifecycleError>;
}

/// Called during teardown, after [`OnApplicationShutdown`]. Services are
/// destroyed in reverse registration order so dependents go before their
/// dependencies. Release connections and resources here.
#[async_trait]
pub trait OnModuleDestroy: Send + Sync {
    async fn on_module_destroy(&self) -> Result<(), LifecycleError>;
}
