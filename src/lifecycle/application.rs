//! Application bootstrap.
//!
//! [`ApplicationBuilder`] drives the whole boot sequence: scan the root
//! module's descriptor tree, instantiate the graph, apply global providers,
//! then run init and bootstrap hooks. The resulting [`Application`] hands out
//! typed instances and performs graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use super::{
    LifecycleManager, OnApplicationBootstrap, OnApplicationShutdown, OnModuleDestroy, OnModuleInit,
    shutdown_signal,
};
use crate::config::ApplicationConfig;
use crate::di::{Container, DependenciesScanner, InstanceLoader, InstanceRef};
use crate::error::{ArmatureError, Result};
use crate::metadata::MetadataScanner;
use crate::module::ModuleDescriptor;
use crate::token::Token;

type HookBinding = Box<dyn FnOnce(&Arc<Container>, &mut LifecycleManager) -> Result<()> + Send>;

/// A booted application: the instantiated container, its config, and the
/// lifecycle hooks registered over it.
pub struct Application {
    container: Arc<Container>,
    config: Arc<ApplicationConfig>,
    lifecycle_manager: Arc<LifecycleManager>,
}

impl Application {
    pub fn builder(root: ModuleDescriptor) -> ApplicationBuilder {
        ApplicationBuilder::new(root)
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn config(&self) -> &Arc<ApplicationConfig> {
        &self.config
    }

    pub fn lifecycle_manager(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle_manager
    }

    /// Fetch a constructed instance by token, typed.
    pub fn get<T: Send + Sync + 'static>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
        find_typed::<T>(&self.container, &token.into())
    }

    /// Graceful shutdown: `OnApplicationShutdown` hooks, then
    /// `OnModuleDestroy` in reverse registration order.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down application");
        self.lifecycle_manager.call_application_shutdown().await?;
        self.lifecycle_manager.call_module_destroy().await?;
        tracing::info!("application shutdown complete");
        Ok(())
    }

    /// Block until SIGTERM or Ctrl+C, then shut down gracefully.
    pub async fn run_until_shutdown(&self) -> Result<()> {
        shutdown_signal().await;
        self.shutdown().await
    }
}

/// Fluent boot configuration. Hook registrations are recorded as tokens and
/// bound to the resolved instances once the graph is instantiated.
pub struct ApplicationBuilder {
    root: ModuleDescriptor,
    bindings: Vec<HookBinding>,
    init_timeout: Option<Duration>,
    bootstrap_timeout: Option<Duration>,
}

impl ApplicationBuilder {
    pub fn new(root: ModuleDescriptor) -> Self {
        Self {
            root,
            bindings: Vec::new(),
            init_timeout: None,
            bootstrap_timeout: None,
        }
    }

    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = Some(timeout);
        self
    }

    pub fn bootstrap_timeout(mut self, timeout: Duration) -> Self {
        self.bootstrap_timeout = Some(timeout);
        self
    }

    /// Register the instance behind `token` for `OnModuleInit`.
    pub fn on_init<T>(mut self, token: impl Into<Token>) -> Self
    where
        T: OnModuleInit + Send + Sync + 'static,
    {
        let token = token.into();
        self.bindings.push(Box::new(move |container, manager| {
            let service = find_typed::<T>(container, &token)?;
            manager.register_init(service, token.to_string());
            Ok(())
        }));
        self
    }

    /// Register the instance behind `token` for `OnApplicationBootstrap`.
    pub fn on_bootstrap<T>(mut self, token: impl Into<Token>) -> Self
    where
        T: OnApplicationBootstrap + Send + Sync + 'static,
    {
        let token = token.into();
        self.bindings.push(Box::new(move |container, manager| {
            let service = find_typed::<T>(container, &token)?;
            manager.register_bootstrap(service, token.to_string());
            Ok(())
        }));
        self
    }

    /// Register the instance behind `token` for `OnApplicationShutdown`.
    pub fn on_shutdown<T>(mut self, token: impl Into<Token>) -> Self
    where
        T: OnApplicationShutdown + Send + Sync + 'static,
    {
        let token = token.into();
        self.bindings.push(Box::new(move |container, manager| {
            let service = find_typed::<T>(container, &token)?;
            manager.register_shutdown(service, token.to_string());
            Ok(())
        }));
        self
    }

    /// Register the instance behind `token` for `OnModuleDestroy`.
    pub fn on_destroy<T>(mut self, token: impl Into<Token>) -> Self
    where
        T: OnModuleDestroy + Send + Sync + 'static,
    {
        let token = token.into();
        self.bindings.push(Box::new(move |container, manager| {
            let service = find_typed::<T>(container, &token)?;
            manager.register_destroy(service, token.to_string());
            Ok(())
        }));
        self
    }

    /// Convenience: register for both init and destroy.
    pub fn register_lifecycle<T>(self, token: impl Into<Token>) -> Self
    where
        T: OnModuleInit + OnModuleDestroy + Send + Sync + 'static,
    {
        let token = token.into();
        self.on_init::<T>(token.clone()).on_destroy::<T>(token)
    }

    /// Boot the application.
    ///
    /// Scans the root module, instantiates the whole graph, applies global
    /// providers to the config, binds and runs `OnModuleInit` then
    /// `OnApplicationBootstrap` hooks. Any failure aborts the boot; nothing
    /// starts partially.
    pub async fn build(self) -> Result<Application> {
        tracing::info!("starting application initialization");

        let container = Arc::new(Container::new());
        let config = Arc::new(ApplicationConfig::new());
        let mut scanner =
            DependenciesScanner::new(container.clone(), MetadataScanner::new(), config.clone());
        scanner.scan(self.root)?;

        InstanceLoader::new(container.clone())
            .create_instances_of_dependencies()
            .await?;
        scanner.apply_application_providers()?;

        let mut manager = LifecycleManager::new();
        for binding in self.bindings {
            binding(&container, &mut manager)?;
        }

        if let Some(timeout) = self.init_timeout {
            manager.call_module_init_with_timeout(timeout).await?;
        } else {
            manager.call_module_init().await?;
        }
        if let Some(timeout) = self.bootstrap_timeout {
            manager
                .call_application_bootstrap_with_timeout(timeout)
                .await?;
        } else {
            manager.call_application_bootstrap().await?;
        }

        tracing::info!("application initialization complete");
        Ok(Application {
            container,
            config,
            lifecycle_manager: Arc::new(manager),
        })
    }
}

fn find_instance(container: &Container, token: &Token) -> Result<InstanceRef> {
    for module in container.get_modules() {
        let wrapper = module
            .provider(token)
            .or_else(|| {
                module
                    .injectables_map()
                    .get(token)
                    .map(|entry| entry.value().clone())
            })
            .or_else(|| {
                module
                    .controllers_map()
                    .get(token)
                    .map(|entry| entry.value().clone())
            });
        if let Some(wrapper) = wrapper {
            return wrapper.instance().ok_or_else(|| {
                ArmatureError::Internal(format!("'{token}' has not been instantiated"))
            });
        }
    }
    Err(ArmatureError::UnknownDependency {
        requester: "application".to_string(),
        token: token.to_string(),
    })
}

fn find_typed<T: Send + Sync + 'static>(container: &Container, token: &Token) -> Result<Arc<T>> {
    find_instance(container, token)?.downcast::<T>()
}
