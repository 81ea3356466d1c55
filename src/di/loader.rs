use std::sync::Arc;

use futures::future::try_join_all;

use crate::di::container::Container;
use crate::di::injector::Injector;
use crate::di::module::ModuleRecord;
use crate::error::Result;

/// Drives the container through its two instantiation passes.
///
/// The prototype pass walks every collection synchronously so each token has
/// exactly one wrapper before any constructor runs. The instance pass then
/// fans out across modules concurrently; inside a module, providers are
/// constructed before injectables, and injectables before routes, because the
/// later phases may consume anything the earlier ones produced. Within a
/// sub-phase the wrappers themselves load concurrently too.
pub struct InstanceLoader {
    container: Arc<Container>,
    injector: Injector,
}

impl InstanceLoader {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            injector: Injector::new(),
        }
    }

    pub async fn create_instances_of_dependencies(&self) -> Result<()> {
        self.create_prototypes();
        self.create_instances().await
    }

    fn create_prototypes(&self) {
        for module in self.container.get_modules() {
            for wrapper in module.providers() {
                self.injector
                    .load_prototype_of_instance(&wrapper, module.providers_map());
            }
            for wrapper in module.injectables() {
                self.injector
                    .load_prototype_of_instance(&wrapper, module.injectables_map());
            }
            for wrapper in module.controllers() {
                self.injector
                    .load_prototype_of_instance(&wrapper, module.controllers_map());
            }
        }
    }

    async fn create_instances(&self) -> Result<()> {
        let modules = self.container.get_modules();
        try_join_all(
            modules
                .iter()
                .map(|module| self.create_instances_of_module(module)),
        )
        .await?;
        Ok(())
    }

    async fn create_instances_of_module(&self, module: &Arc<ModuleRecord>) -> Result<()> {
        self.create_instances_of_providers(module).await?;
        self.create_instances_of_injectables(module).await?;
        self.create_instances_of_routes(module).await?;
        tracing::info!("{} dependencies initialized", module.name());
        Ok(())
    }

    async fn create_instances_of_providers(&self, module: &Arc<ModuleRecord>) -> Result<()> {
        let wrappers = module.providers();
        try_join_all(
            wrappers
                .iter()
                .map(|wrapper| self.injector.load_instance_of_provider(wrapper, module)),
        )
        .await?;
        Ok(())
    }

    async fn create_instances_of_injectables(&self, module: &Arc<ModuleRecord>) -> Result<()> {
        let wrappers = module.injectables();
        try_join_all(
            wrappers
                .iter()
                .map(|wrapper| self.injector.load_instance_of_injectable(wrapper, module)),
        )
        .await?;
        Ok(())
    }

    async fn create_instances_of_routes(&self, module: &Arc<ModuleRecord>) -> Result<()> {
        let wrappers = module.controllers();
        try_join_all(
            wrappers
                .iter()
                .map(|wrapper| self.injector.load_instance_of_route(wrapper, module)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::config::ApplicationConfig;
    use crate::di::deferred::Deferred;
    use crate::di::scanner::DependenciesScanner;
    use crate::metadata::MetadataScanner;
    use crate::module::ModuleDescriptor;
    use crate::provider::{ClassDescriptor, ControllerDescriptor, Dependency, ProviderDescriptor};
    use crate::token::Token;

    #[derive(Clone)]
    struct BootLog(Arc<Mutex<Vec<&'static str>>>);

    impl BootLog {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Vec::new())))
        }

        fn record(&self, step: &'static str) {
            self.0.lock().unwrap().push(step);
        }

        fn steps(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct CatsService;
    struct CatsGuardHelper;
    struct CatsController;

    async fn boot(root: ModuleDescriptor) -> Arc<Container> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let container = Arc::new(Container::new());
        let config = Arc::new(ApplicationConfig::new());
        let mut scanner =
            DependenciesScanner::new(container.clone(), MetadataScanner::new(), config);
        scanner.scan(root).unwrap();
        InstanceLoader::new(container.clone())
            .create_instances_of_dependencies()
            .await
            .unwrap();
        container
    }

    #[tokio::test]
    async fn providers_then_injectables_then_routes() {
        let log = BootLog::new();
        let (for_provider, for_injectable, for_route) = (log.clone(), log.clone(), log.clone());

        let root = ModuleDescriptor::new("AppModule")
            .provider(ProviderDescriptor::class::<CatsService, _>(
                Vec::new(),
                move |_| {
                    for_provider.record("provider");
                    Ok(CatsService)
                },
            ))
            .controller(ControllerDescriptor::new::<CatsController, _>(
                Vec::new(),
                move |_| {
                    for_route.record("route");
                    Ok(CatsController)
                },
            ));
        let container = boot(root).await;

        // Inject the injectable through the scanner path: attach it as method
        // metadata so it lands in the injectables collection.
        let module = container.get_module(&Token::named("AppModule")).unwrap();
        module.add_injectable(ClassDescriptor::new::<CatsGuardHelper, _>(
            Vec::new(),
            move |_| {
                for_injectable.record("injectable");
                Ok(CatsGuardHelper)
            },
        ));
        InstanceLoader::new(container.clone())
            .create_instances_of_dependencies()
            .await
            .unwrap();

        assert_eq!(log.steps(), vec!["provider", "route", "injectable"]);
    }

    #[tokio::test]
    async fn loading_twice_constructs_nothing_twice() {
        let log = BootLog::new();
        let counted = log.clone();
        let root = ModuleDescriptor::new("AppModule").provider(ProviderDescriptor::class::<
            CatsService,
            _,
        >(Vec::new(), move |_| {
            counted.record("constructed");
            Ok(CatsService)
        }));

        let container = boot(root).await;
        InstanceLoader::new(container.clone())
            .create_instances_of_dependencies()
            .await
            .unwrap();

        assert_eq!(log.steps(), vec!["constructed"]);
    }

    struct OrdersService {
        shipping: Deferred<ShippingService>,
    }

    struct ShippingService {
        orders: Deferred<OrdersService>,
    }

    fn orders_module() -> ModuleDescriptor {
        ModuleDescriptor::new("OrdersModule")
            .import_forward(shipping_module)
            .provider(ProviderDescriptor::class::<OrdersService, _>(
                vec![Dependency::on::<ShippingService>()],
                |deps| {
                    Ok(OrdersService {
                        shipping: deps[0].deferred::<ShippingService>(),
                    })
                },
            ))
            .export(Token::of::<OrdersService>())
    }

    fn shipping_module() -> ModuleDescriptor {
        ModuleDescriptor::new("ShippingModule")
            .import_forward(orders_module)
            .provider(ProviderDescriptor::class::<ShippingService, _>(
                vec![Dependency::forward(|| Token::of::<OrdersService>())],
                |deps| {
                    Ok(ShippingService {
                        orders: deps[0].deferred::<OrdersService>(),
                    })
                },
            ))
            .export(Token::of::<ShippingService>())
    }

    #[tokio::test]
    async fn forward_cycles_boot_across_concurrently_loaded_modules() {
        let root = ModuleDescriptor::new("AppModule").import(orders_module());
        let container = boot(root).await;

        let orders = container
            .get_module(&Token::named("OrdersModule"))
            .unwrap()
            .provider(&Token::of::<OrdersService>())
            .unwrap()
            .instance()
            .unwrap()
            .downcast::<OrdersService>()
            .unwrap();

        // Whichever module's load reached the cycle first, both ends resolve
        // to the same pair of instances.
        let shipping = orders.shipping.get().unwrap();
        assert!(Arc::ptr_eq(&shipping.orders.get().unwrap(), &orders));
    }

    #[tokio::test]
    async fn cross_module_dependencies_survive_concurrent_module_loads() {
        struct SharedConfig;
        struct ReaderOne;
        struct ReaderTwo;

        let shared = ModuleDescriptor::new("SharedModule")
            .provider(ProviderDescriptor::class::<SharedConfig, _>(
                Vec::new(),
                |_| Ok(SharedConfig),
            ))
            .export(Token::of::<SharedConfig>());
        let one = ModuleDescriptor::new("OneModule")
            .import(shared.clone())
            .provider(ProviderDescriptor::class::<ReaderOne, _>(
                vec![Dependency::on::<SharedConfig>()],
                |deps| {
                    deps[0].downcast::<SharedConfig>()?;
                    Ok(ReaderOne)
                },
            ));
        let two = ModuleDescriptor::new("TwoModule")
            .import(shared.clone())
            .provider(ProviderDescriptor::class::<ReaderTwo, _>(
                vec![Dependency::on::<SharedConfig>()],
                |deps| {
                    deps[0].downcast::<SharedConfig>()?;
                    Ok(ReaderTwo)
                },
            ));
        let root = ModuleDescriptor::new("AppModule").import(one).import(two);

        let container = boot(root).await;
        let shared = container.get_module(&Token::named("SharedModule")).unwrap();
        assert!(
            shared
                .provider(&Token::of::<SharedConfig>())
                .unwrap()
                .is_resolved()
        );
    }
}
