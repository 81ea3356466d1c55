use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::di::module::ModuleRecord;
use crate::error::{ArmatureError, Result};
use crate::provider::{ClassDescriptor, ControllerDescriptor, ProviderDescriptor};
use crate::token::Token;

/// The application's object graph: module token to module record.
///
/// Populated by the scanner, read by the instance loader and injector. After
/// boot completes the graph is treated as immutable for the lifetime of the
/// application.
pub struct Container {
    modules: DashMap<Token, Arc<ModuleRecord>>,
    // Scan insertion order, for deterministic iteration.
    order: Mutex<Vec<Token>>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Register a module, or return the existing record for its token.
    pub fn add_module(&self, token: Token) -> Arc<ModuleRecord> {
        if let Some(existing) = self.modules.get(&token) {
            return existing.value().clone();
        }
        let record = Arc::new(ModuleRecord::new(token.clone()));
        self.modules.insert(token.clone(), record.clone());
        self.order.lock().expect("order lock poisoned").push(token);
        record
    }

    pub fn has_module(&self, token: &Token) -> bool {
        self.modules.contains_key(token)
    }

    pub fn get_module(&self, token: &Token) -> Option<Arc<ModuleRecord>> {
        self.modules.get(token).map(|entry| entry.value().clone())
    }

    /// Every registered module, in scan order.
    pub fn get_modules(&self) -> Vec<Arc<ModuleRecord>> {
        let order = self.order.lock().expect("order lock poisoned");
        order
            .iter()
            .filter_map(|token| self.get_module(token))
            .collect()
    }

    /// Record an import edge from `target` to `related`. Both modules must
    /// already be registered.
    pub fn add_related_module(&self, related: &Token, target: &Token) -> Result<()> {
        let related_record = self.get_module(related).ok_or_else(|| {
            ArmatureError::UnknownModule {
                token: related.to_string(),
            }
        })?;
        let target_record = self
            .get_module(target)
            .ok_or_else(|| ArmatureError::UnknownModule {
                token: target.to_string(),
            })?;
        target_record.add_import(related_record);
        Ok(())
    }

    pub fn add_provider(&self, provider: ProviderDescriptor, module: &Token) -> Result<Token> {
        let record = self
            .get_module(module)
            .ok_or_else(|| ArmatureError::UnknownModule {
                token: module.to_string(),
            })?;
        Ok(record.add_provider(provider))
    }

    pub fn add_controller(&self, controller: ControllerDescriptor, module: &Token) -> Result<Token> {
        let record = self
            .get_module(module)
            .ok_or_else(|| ArmatureError::UnknownModule {
                token: module.to_string(),
            })?;
        Ok(record.add_controller(controller))
    }

    pub fn add_injectable(&self, injectable: ClassDescriptor, module: &Token) -> Result<Token> {
        let record = self
            .get_module(module)
            .ok_or_else(|| ArmatureError::UnknownModule {
                token: module.to_string(),
            })?;
        Ok(record.add_injectable(injectable))
    }

    /// Mark a provider token exported from `module`. Visibility of the token
    /// itself is validated by the scanner against the declaring descriptors.
    pub fn add_exported_provider(&self, token: &Token, module: &Token) -> Result<()> {
        let record = self
            .get_module(module)
            .ok_or_else(|| ArmatureError::UnknownModule {
                token: module.to_string(),
            })?;
        record.add_exported_provider(token.clone());
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_module_is_idempotent_per_token() {
        let container = Container::new();
        let first = container.add_module(Token::named("AppModule"));
        let second = container.add_module(Token::named("AppModule"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(container.get_modules().len(), 1);
    }

    #[test]
    fn related_modules_must_be_registered() {
        let container = Container::new();
        container.add_module(Token::named("AppModule"));
        let err = container
            .add_related_module(&Token::named("Ghost"), &Token::named("AppModule"))
            .unwrap_err();
        assert!(matches!(err, ArmatureError::UnknownModule { .. }));
    }

    #[test]
    fn modules_iterate_in_scan_order() {
        let container = Container::new();
        container.add_module(Token::named("AppModule"));
        container.add_module(Token::named("CatsModule"));
        let names: Vec<_> = container
            .get_modules()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["AppModule", "CatsModule"]);
    }
}
