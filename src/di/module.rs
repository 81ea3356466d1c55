use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::di::wrapper::InstanceWrapper;
use crate::provider::{ClassDescriptor, ControllerDescriptor, ProviderDescriptor};
use crate::token::Token;

/// Mutable registry scoped to one module.
///
/// Holds the module's providers, controllers, and injectables keyed by token,
/// the ordered list of imported modules, and the set of provider tokens
/// visible to importers. Records are created once per distinct module during
/// the scan and live for the process lifetime; import edges between records
/// may form reference cycles, which is accepted for the same reason.
pub struct ModuleRecord {
    token: Token,
    providers: DashMap<Token, Arc<InstanceWrapper>>,
    controllers: DashMap<Token, Arc<InstanceWrapper>>,
    injectables: DashMap<Token, Arc<InstanceWrapper>>,
    imports: RwLock<Vec<Arc<ModuleRecord>>>,
    exports: RwLock<Vec<Token>>,
}

impl ModuleRecord {
    pub(crate) fn new(token: Token) -> Self {
        Self {
            token,
            providers: DashMap::new(),
            controllers: DashMap::new(),
            injectables: DashMap::new(),
            imports: RwLock::new(Vec::new()),
            exports: RwLock::new(Vec::new()),
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn name(&self) -> &str {
        self.token.as_str()
    }

    pub(crate) fn add_provider(&self, descriptor: ProviderDescriptor) -> Token {
        let wrapper = Arc::new(InstanceWrapper::from_provider(descriptor));
        let token = wrapper.token().clone();
        self.providers.insert(token.clone(), wrapper);
        token
    }

    pub(crate) fn add_controller(&self, descriptor: ControllerDescriptor) -> Token {
        let wrapper = Arc::new(InstanceWrapper::from_class(descriptor.class));
        let token = wrapper.token().clone();
        self.controllers.insert(token.clone(), wrapper);
        token
    }

    pub(crate) fn add_injectable(&self, descriptor: ClassDescriptor) -> Token {
        let wrapper = Arc::new(InstanceWrapper::from_class(descriptor));
        let token = wrapper.token().clone();
        self.injectables.insert(token.clone(), wrapper);
        token
    }

    pub(crate) fn add_import(&self, related: Arc<ModuleRecord>) {
        let mut imports = self.imports.write().expect("imports lock poisoned");
        if !imports.iter().any(|m| m.token() == related.token()) {
            imports.push(related);
        }
    }

    pub(crate) fn add_exported_provider(&self, token: Token) {
        let mut exports = self.exports.write().expect("exports lock poisoned");
        if !exports.contains(&token) {
            exports.push(token);
        }
    }

    pub fn provider(&self, token: &Token) -> Option<Arc<InstanceWrapper>> {
        self.providers.get(token).map(|entry| entry.value().clone())
    }

    pub fn has_provider(&self, token: &Token) -> bool {
        self.providers.contains_key(token)
    }

    pub fn providers(&self) -> Vec<Arc<InstanceWrapper>> {
        self.providers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn controllers(&self) -> Vec<Arc<InstanceWrapper>> {
        self.controllers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn injectables(&self) -> Vec<Arc<InstanceWrapper>> {
        self.injectables
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub(crate) fn providers_map(&self) -> &DashMap<Token, Arc<InstanceWrapper>> {
        &self.providers
    }

    pub(crate) fn controllers_map(&self) -> &DashMap<Token, Arc<InstanceWrapper>> {
        &self.controllers
    }

    pub(crate) fn injectables_map(&self) -> &DashMap<Token, Arc<InstanceWrapper>> {
        &self.injectables
    }

    /// Imported modules in declaration order.
    pub fn imports(&self) -> Vec<Arc<ModuleRecord>> {
        self.imports.read().expect("imports lock poisoned").clone()
    }

    /// Exported provider tokens in registration order.
    pub fn exports(&self) -> Vec<Token> {
        self.exports.read().expect("exports lock poisoned").clone()
    }

    pub fn exports_token(&self, token: &Token) -> bool {
        self.exports
            .read()
            .expect("exports lock poisoned")
            .contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderDescriptor;

    struct CatsService;

    #[test]
    fn providers_are_keyed_by_token() {
        let record = ModuleRecord::new(Token::named("CatsModule"));
        let token =
            record.add_provider(ProviderDescriptor::class::<CatsService, _>(Vec::new(), |_| {
                Ok(CatsService)
            }));
        assert!(record.has_provider(&token));
        assert_eq!(record.providers().len(), 1);
    }

    #[test]
    fn exports_are_deduplicated_and_ordered() {
        let record = ModuleRecord::new(Token::named("CatsModule"));
        record.add_exported_provider(Token::named("A"));
        record.add_exported_provider(Token::named("B"));
        record.add_exported_provider(Token::named("A"));
        assert_eq!(record.exports(), vec![Token::named("A"), Token::named("B")]);
    }
}
