//! Registration and execution of lifecycle hooks.

use std::sync::Arc;
use std::time::Duration;

use super::{
    LifecycleError, OnApplicationBootstrap, OnApplicationShutdown, OnModuleDestroy, OnModuleInit,
    Result,
};

struct LifecycleHook<T: ?Sized> {
    service: Arc<T>,
    name: String,
}

impl<T: ?Sized> LifecycleHook<T> {
    fn new(service: Arc<T>, name: impl Into<String>) -> Self {
        Self {
            service,
            name: name.into(),
        }
    }
}

/// Executes registered lifecycle hooks in phase order.
///
/// Init and bootstrap hooks run in registration order and abort the boot on
/// the first failure. Shutdown and destroy hooks log failures and keep going,
/// so one broken service cannot block teardown of the rest; destroy runs in
/// reverse registration order.
#[derive(Default)]
pub struct LifecycleManager {
    on_init_hooks: Vec<LifecycleHook<dyn OnModuleInit>>,
    on_bootstrap_hooks: Vec<LifecycleHook<dyn OnApplicationBootstrap>>,
    on_shutdown_hooks: Vec<LifecycleHook<dyn OnApplicationShutdown>>,
    on_destroy_hooks: Vec<LifecycleHook<dyn OnModuleDestroy>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_init<T>(&mut self, service: Arc<T>, name: impl Into<String>)
    where
        T: OnModuleInit + 'static,
    {
        self.on_init_hooks.push(LifecycleHook::new(service, name));
    }

    pub fn register_bootstrap<T>(&mut self, service: Arc<T>, name: impl Into<String>)
    where
        T: OnApplicationBootstrap + 'static,
    {
        self.on_bootstrap_hooks
            .push(LifecycleHook::new(service, name));
    }

    pub fn register_shutdown<T>(&mut self, service: Arc<T>, name: impl Into<String>)
    where
        T: OnApplicationShutdown + 'static,
    {
        self.on_shutdown_hooks
            .push(LifecycleHook::new(service, name));
    }

    pub fn register_destroy<T>(&mut self, service: Arc<T>, name: impl Into<String>)
    where
        T: OnModuleDestroy + 'static,
    {
        self.on_destroy_hooks
            .push(LifecycleHook::new(service, name));
    }

    /// Run every `OnModuleInit` hook, in registration order.
    pub async fn call_module_init(&self) -> Result<()> {
        for hook in &self.on_init_hooks {
            tracing::debug!("initializing {}", hook.name);
            hook.service.on_module_init().await.map_err(|e| {
                tracing::error!("OnModuleInit failed for {}: {e}", hook.name);
                LifecycleError::hook_failed(&hook.name, e.to_string())
            })?;
        }
        tracing::info!(
            "OnModuleInit complete ({} hooks executed)",
            self.on_init_hooks.len()
        );
        Ok(())
    }

    pub async fn call_module_init_with_timeout(&self, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.call_module_init())
            .await
            .map_err(|_| {
                LifecycleError::timeout("OnModuleInit", format!("Timeout after {timeout:?}"))
            })?
    }

    /// Run every `OnApplicationBootstrap` hook, in registration order.
    pub async fn call_application_bootstrap(&self) -> Result<()> {
        for hook in &self.on_bootstrap_hooks {
            tracing::debug!("bootstrapping {}", hook.name);
            hook.service.on_application_bootstrap().await.map_err(|e| {
                tracing::error!("OnApplicationBootstrap failed for {}: {e}", hook.name);
                LifecycleError::hook_failed(&hook.name, e.to_string())
            })?;
        }
        tracing::info!(
            "OnApplicationBootstrap complete ({} hooks executed)",
            self.on_bootstrap_hooks.len()
        );
        Ok(())
    }

    pub async fn call_application_bootstrap_with_timeout(&self, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.call_application_bootstrap())
            .await
            .map_err(|_| {
                LifecycleError::timeout(
                    "OnApplicationBootstrap",
                    format!("Timeout after {timeout:?}"),
                )
            })?
    }

    /// Run every `OnApplicationShutdown` hook. Failures are logged, not
    /// propagated.
    pub async fn call_application_shutdown(&self) -> Result<()> {
        for hook in &self.on_shutdown_hooks {
            tracing::debug!("shutting down {}", hook.name);
            if let Err(e) = hook.service.on_application_shutdown().await {
                tracing::error!("OnApplicationShutdown failed for {}: {e}", hook.name);
            }
        }
        tracing::info!(
            "OnApplicationShutdown complete ({} hooks executed)",
            self.on_shutdown_hooks.len()
        );
        Ok(())
    }

    /// Run every `OnModuleDestroy` hook, in reverse registration order.
    /// Failures are logged, not propagated.
    pub async fn call_module_destroy(&self) -> Result<()> {
        for hook in self.on_destroy_hooks.iter().rev() {
            tracing::debug!("destroying {}", hook.name);
            if let Err(e) = hook.service.on_module_destroy().await {
                tracing::error!("OnModuleDestroy failed for {}: {e}", hook.name);
            }
        }
        tracing::info!(
            "OnModuleDestroy complete ({} hooks executed)",
            self.on_destroy_hooks.len()
        );
        Ok(())
    }

    pub fn init_hook_count(&self) -> usize {
        self.on_init_hooks.len()
    }

    pub fn destroy_hook_count(&self) -> usize {
        self.on_destroy_hooks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct TestService {
        initialized: AtomicBool,
        bootstrapped: AtomicBool,
        shut_down: AtomicBool,
        destroyed: AtomicBool,
    }

    #[async_trait::async_trait]
    impl OnModuleInit for TestService {
        async fn on_module_init(&self) -> Result<()> {
            self.initialized.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl OnApplicationBootstrap for TestService {
        async fn on_application_bootstrap(&self) -> Result<()> {
            self.bootstrapped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl OnApplicationShutdown for TestService {
        async fn on_application_shutdown(&self) -> Result<()> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl OnModuleDestroy for TestService {
        async fn on_module_destroy(&self) -> Result<()> {
            self.destroyed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn every_phase_reaches_the_service() {
        let service = Arc::new(TestService::default());

        let mut manager = LifecycleManager::new();
        manager.register_init(service.clone(), "TestService");
        manager.register_bootstrap(service.clone(), "TestService");
        manager.register_shutdown(service.clone(), "TestService");
        manager.register_destroy(service.clone(), "TestService");

        manager.call_module_init().await.unwrap();
        assert!(service.initialized.load(Ordering::SeqCst));

        manager.call_application_bootstrap().await.unwrap();
        assert!(service.bootstrapped.load(Ordering::SeqCst));

        manager.call_application_shutdown().await.unwrap();
        assert!(service.shut_down.load(Ordering::SeqCst));

        manager.call_module_destroy().await.unwrap();
        assert!(service.destroyed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn destroy_runs_in_reverse_order() {
        struct OrderedService {
            id: usize,
            order: Arc<Mutex<Vec<usize>>>,
        }

        #[async_trait::async_trait]
        impl OnModuleDestroy for OrderedService {
            async fn on_module_destroy(&self) -> Result<()> {
                self.order.lock().unwrap().push(self.id);
                Ok(())
            }
        }

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        for id in 0..3 {
            manager.register_destroy(
                Arc::new(OrderedService {
                    id,
                    order: order.clone(),
                }),
                format!("Service{id}"),
            );
        }

        manager.call_module_destroy().await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn a_failing_init_hook_aborts_the_phase() {
        struct Broken;

        #[async_trait::async_trait]
        impl OnModuleInit for Broken {
            async fn on_module_init(&self) -> Result<()> {
                Err(LifecycleError::init_failed("no database"))
            }
        }

        let mut manager = LifecycleManager::new();
        manager.register_init(Arc::new(Broken), "Broken");
        let err = manager.call_module_init().await.unwrap_err();
        assert!(matches!(err, LifecycleError::HookFailed { .. }));
    }
}
