use std::sync::Arc;

use uuid::Uuid;

use crate::config::ApplicationConfig;
use crate::constants::{APP_FILTER, APP_GUARD, APP_INTERCEPTOR, APP_PIPE};
use crate::di::container::Container;
use crate::error::{ArmatureError, Result};
use crate::metadata::{MetadataKey, MetadataScanner};
use crate::module::{ExportTarget, ModuleDescriptor, ModuleRef};
use crate::provider::{ClassDescriptor, ControllerDescriptor, ProviderDescriptor};
use crate::token::Token;

/// Which application-wide sequence a global provider joins.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GlobalProviderKind {
    Guard,
    Interceptor,
    Pipe,
    Filter,
}

impl GlobalProviderKind {
    fn of(token: &Token) -> Option<Self> {
        match token.as_str() {
            APP_GUARD => Some(Self::Guard),
            APP_INTERCEPTOR => Some(Self::Interceptor),
            APP_PIPE => Some(Self::Pipe),
            APP_FILTER => Some(Self::Filter),
            _ => None,
        }
    }
}

/// A provider declared under a reserved token, remembered until the graph is
/// instantiated and the resolved instance can be pushed into the
/// [`ApplicationConfig`].
#[derive(Clone, Debug)]
pub struct GlobalProviderRecord {
    pub module_token: Token,
    pub provider_token: Token,
    pub kind: GlobalProviderKind,
}

/// Walks a root module's descriptor tree and populates the [`Container`].
///
/// The walk is depth-first and cycle-safe: a module already registered is not
/// visited again, which is what makes cyclic imports (declared through
/// forward references) terminate.
pub struct DependenciesScanner {
    container: Arc<Container>,
    metadata_scanner: MetadataScanner,
    application_config: Arc<ApplicationConfig>,
    application_providers_apply_map: Vec<GlobalProviderRecord>,
}

impl DependenciesScanner {
    pub fn new(
        container: Arc<Container>,
        metadata_scanner: MetadataScanner,
        application_config: Arc<ApplicationConfig>,
    ) -> Self {
        Self {
            container,
            metadata_scanner,
            application_config,
            application_providers_apply_map: Vec::new(),
        }
    }

    /// Register the root module and everything reachable from it.
    pub fn scan(&mut self, root: ModuleDescriptor) -> Result<()> {
        let mut scanned = Vec::new();
        self.store_module(root, None, &mut scanned)?;
        self.scan_modules_for_dependencies(&scanned)?;
        tracing::debug!("{} modules scanned", scanned.len());
        Ok(())
    }

    fn store_module(
        &mut self,
        descriptor: ModuleDescriptor,
        parent: Option<&Token>,
        scanned: &mut Vec<(Token, ModuleDescriptor)>,
    ) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(ArmatureError::InvalidModule {
                parent: parent
                    .map(|token| token.to_string())
                    .unwrap_or_else(|| "the application root".to_string()),
            });
        }
        let token = descriptor.token();
        if self.container.has_module(&token) {
            return Ok(());
        }
        self.container.add_module(token.clone());

        let related: Vec<ModuleDescriptor> =
            descriptor.imports.iter().map(ModuleRef::resolve).collect();
        scanned.push((token.clone(), descriptor));
        for module in related {
            self.store_module(module, Some(&token), scanned)?;
        }
        Ok(())
    }

    fn scan_modules_for_dependencies(
        &mut self,
        scanned: &[(Token, ModuleDescriptor)],
    ) -> Result<()> {
        for (token, descriptor) in scanned {
            for import in &descriptor.imports {
                self.store_related_module(import, token)?;
            }
            for provider in &descriptor.providers {
                self.store_provider(provider, token)?;
            }
            for controller in &descriptor.controllers {
                self.store_route(controller, token)?;
                self.reflect_dynamic_metadata(controller, token)?;
            }
            // Flatten each import's export surface once; every exported token
            // of this module is validated against the same sets.
            let import_exports = descriptor
                .imports
                .iter()
                .map(|import| module_export_tokens(&import.resolve()))
                .collect::<Result<Vec<_>>>()?;
            for export in &descriptor.exports {
                self.store_exported_provider(export, descriptor, &import_exports, token)?;
            }
        }
        Ok(())
    }

    fn store_related_module(&self, related: &ModuleRef, module: &Token) -> Result<()> {
        let descriptor = related.resolve();
        if descriptor.name.is_empty() {
            return Err(ArmatureError::InvalidModule {
                parent: module.to_string(),
            });
        }
        self.container.add_related_module(&descriptor.token(), module)
    }

    /// Register one provider. A provider bound to a reserved token is given a
    /// unique registration token (so several declarations of the same kind
    /// coexist) and remembered in the apply map; any other provider, custom
    /// or not, is reachable only through standard token lookup.
    fn store_provider(&mut self, provider: &ProviderDescriptor, module: &Token) -> Result<Token> {
        if let Some(kind) = GlobalProviderKind::of(provider.token()) {
            let unique = Token::named(format!("{} ({})", provider.token(), Uuid::new_v4()));
            let token = self
                .container
                .add_provider(provider.clone().with_token(unique), module)?;
            self.application_providers_apply_map
                .push(GlobalProviderRecord {
                    module_token: module.clone(),
                    provider_token: token.clone(),
                    kind,
                });
            return Ok(token);
        }
        self.container.add_provider(provider.clone(), module)
    }

    fn store_route(&self, controller: &ControllerDescriptor, module: &Token) -> Result<Token> {
        self.container.add_controller(controller.clone(), module)
    }

    pub fn store_injectable(&self, injectable: ClassDescriptor, module: &Token) -> Result<Token> {
        self.container.add_injectable(injectable, module)
    }

    /// Register the guards, interceptors, and pipes attached to a
    /// controller's methods as injectables scoped to the module. A controller
    /// declared without metadata has nothing to reflect.
    pub fn reflect_dynamic_metadata(
        &self,
        controller: &ControllerDescriptor,
        module: &Token,
    ) -> Result<()> {
        let Some(metadata) = &controller.metadata else {
            return Ok(());
        };
        for enhancer in metadata.enhancers() {
            self.store_injectable(enhancer.clone(), module)?;
        }
        Ok(())
    }

    /// Tokens attached to one controller method under a metadata key, or
    /// `None` when the method carries none.
    pub fn reflect_key_metadata(
        &self,
        controller: &ControllerDescriptor,
        key: MetadataKey,
        method: &str,
    ) -> Option<Vec<Token>> {
        controller
            .metadata
            .as_ref()
            .and_then(|metadata| self.metadata_scanner.key_metadata(metadata, key, method))
    }

    fn store_exported_provider(
        &self,
        export: &ExportTarget,
        descriptor: &ModuleDescriptor,
        import_exports: &[Vec<Token>],
        module: &Token,
    ) -> Result<()> {
        match export {
            ExportTarget::Provider(exported) => {
                let local = descriptor
                    .providers
                    .iter()
                    .any(|provider| provider.token() == exported);
                let re_exported = import_exports.iter().any(|set| set.contains(exported));
                if !local && !re_exported {
                    return Err(ArmatureError::UnknownExport {
                        token: exported.to_string(),
                        module: descriptor.name.clone(),
                    });
                }
                self.container.add_exported_provider(exported, module)
            }
            ExportTarget::Module(forward) => {
                for token in module_export_tokens(&forward.resolve())? {
                    self.container.add_exported_provider(&token, module)?;
                }
                Ok(())
            }
        }
    }

    /// Push every resolved global provider into the application config. Run
    /// once, after all modules are instantiated.
    pub fn apply_application_providers(&self) -> Result<()> {
        for record in &self.application_providers_apply_map {
            let module = self.container.get_module(&record.module_token).ok_or_else(|| {
                ArmatureError::UnknownModule {
                    token: record.module_token.to_string(),
                }
            })?;
            let wrapper = module.provider(&record.provider_token).ok_or_else(|| {
                ArmatureError::Internal(format!(
                    "global provider '{}' is missing from module '{}'",
                    record.provider_token, record.module_token
                ))
            })?;
            let instance = wrapper.instance().ok_or_else(|| {
                ArmatureError::Internal(format!(
                    "global provider '{}' was applied before instantiation",
                    record.provider_token
                ))
            })?;
            match record.kind {
                GlobalProviderKind::Guard => self.application_config.add_global_guard(instance),
                GlobalProviderKind::Interceptor => {
                    self.application_config.add_global_interceptor(instance)
                }
                GlobalProviderKind::Pipe => self.application_config.add_global_pipe(instance),
                GlobalProviderKind::Filter => self.application_config.add_global_filter(instance),
            }
        }
        Ok(())
    }

    /// The recorded global providers, in declaration order.
    pub fn application_providers(&self) -> &[GlobalProviderRecord] {
        &self.application_providers_apply_map
    }
}

/// A module's exported tokens, flattening module re-exports transitively.
///
/// Re-export chains that loop back onto a module already being flattened are
/// rejected; sharing a module from several branches of the tree is fine, as
/// each branch enters and leaves it before the next.
fn module_export_tokens(descriptor: &ModuleDescriptor) -> Result<Vec<Token>> {
    let mut out = Vec::new();
    let mut in_progress = Vec::new();
    collect_export_tokens(descriptor, &mut in_progress, &mut out)?;
    Ok(out)
}

fn collect_export_tokens(
    descriptor: &ModuleDescriptor,
    in_progress: &mut Vec<Token>,
    out: &mut Vec<Token>,
) -> Result<()> {
    let token = descriptor.token();
    if in_progress.contains(&token) {
        return Err(ArmatureError::CircularModuleExport {
            module: descriptor.name.clone(),
        });
    }
    in_progress.push(token);
    for export in &descriptor.exports {
        match export {
            ExportTarget::Provider(exported) => {
                if !out.contains(exported) {
                    out.push(exported.clone());
                }
            }
            ExportTarget::Module(forward) => {
                collect_export_tokens(&forward.resolve(), in_progress, out)?;
            }
        }
    }
    in_progress.pop();
    Ok(())
}
