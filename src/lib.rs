//! # Armature
//!
//! A dependency-injection engine for server-side Rust applications.
//!
//! Armature resolves a graph of modules, providers, controllers, and
//! injectables declared as plain descriptor structs — no runtime reflection —
//! and instantiates everything in dependency order, with async factories,
//! circular-reference resolution through deferred handles, and global
//! cross-cutting providers (guards, interceptors, pipes, filters).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use armature::prelude::*;
//!
//! struct UserRepository;
//!
//! struct UserService {
//!     repository: Arc<UserRepository>,
//! }
//!
//! fn app_module() -> ModuleDescriptor {
//!     ModuleDescriptor::new("AppModule")
//!         .provider(ProviderDescriptor::class::<UserRepository, _>(
//!             Vec::new(),
//!             |_| Ok(UserRepository),
//!         ))
//!         .provider(ProviderDescriptor::class::<UserService, _>(
//!             vec![Dependency::on::<UserRepository>()],
//!             |deps| {
//!                 Ok(UserService {
//!                     repository: deps[0].downcast::<UserRepository>()?,
//!                 })
//!             },
//!         ))
//! }
//!
//! #[tokio::main]
//! async fn main() -> armature::error::Result<()> {
//!     let app = Application::builder(app_module()).build().await?;
//!     let users = app.get::<UserService>(Token::of::<UserService>())?;
//!
//!     // Serve your app, then:
//!     app.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod cache;
pub mod config;
pub mod constants;
pub mod di;
pub mod error;
pub mod exception;
pub mod guard;
pub mod interceptor;
pub mod lifecycle;
pub mod metadata;
pub mod module;
pub mod pipe;
pub mod provider;
pub mod token;

// Re-export core types
pub use config::ApplicationConfig;
pub use di::{Container, Deferred, DependenciesScanner, Injected, InstanceLoader, InstanceRef};
pub use error::{ArmatureError, Result};
pub use lifecycle::{Application, ApplicationBuilder};
pub use module::ModuleDescriptor;
pub use provider::{ClassDescriptor, ControllerDescriptor, Dependency, ProviderDescriptor};
pub use token::Token;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use armature::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::HttpAdapterHost;
    pub use crate::cache::{CacheOptions, CacheStore, CacheStoreFactory};
    pub use crate::config::ApplicationConfig;
    pub use crate::constants::{APP_FILTER, APP_GUARD, APP_INTERCEPTOR, APP_PIPE};
    pub use crate::di::{
        Container, Deferred, DependenciesScanner, Injected, InstanceLoader, InstanceRef,
    };
    pub use crate::error::{ArmatureError, Result};
    pub use crate::exception::{ExceptionFilter, HttpException, HttpExceptionFilter};
    pub use crate::guard::{Guard, GuardError, GuardResult};
    pub use crate::interceptor::{Interceptor, InterceptorResult, Next};
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, LifecycleError, LifecycleManager, OnApplicationBootstrap,
        OnApplicationShutdown, OnModuleDestroy, OnModuleInit, shutdown_signal,
    };
    pub use crate::metadata::{ClassMetadata, MetadataKey, MetadataScanner, MethodMetadata};
    pub use crate::module::{ExportTarget, ForwardRef, ModuleDescriptor, ModuleRef, forward_ref};
    pub use crate::pipe::{Pipe, PipeError, PipeResult};
    pub use crate::provider::{
        ClassDescriptor, ControllerDescriptor, Dependency, ProviderDescriptor,
    };
    pub use crate::token::Token;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
