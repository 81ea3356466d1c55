//! Module descriptors.
//!
//! A module is declared as a descriptor tree: imports, providers,
//! controllers, and exports, all plain data. Import cycles are legal when at
//! least one edge is a [`ForwardRef`] thunk; the scanner resolves thunks
//! during the walk and stops at modules it has already registered.

use crate::provider::{ControllerDescriptor, ProviderDescriptor};
use crate::token::Token;

/// Thunk deferring evaluation of a module reference, used to break
/// declaration-order and import cycles.
#[derive(Clone, Copy)]
pub struct ForwardRef {
    resolve: fn() -> ModuleDescriptor,
}

impl ForwardRef {
    pub fn new(resolve: fn() -> ModuleDescriptor) -> Self {
        Self { resolve }
    }

    pub fn resolve(&self) -> ModuleDescriptor {
        (self.resolve)()
    }
}

/// Convenience constructor matching the declaration-site reading:
/// `forward_ref(users_module)`.
pub fn forward_ref(resolve: fn() -> ModuleDescriptor) -> ForwardRef {
    ForwardRef::new(resolve)
}

/// Reference to an imported module.
#[derive(Clone)]
pub enum ModuleRef {
    Static(Box<ModuleDescriptor>),
    Forward(ForwardRef),
}

impl ModuleRef {
    pub fn resolve(&self) -> ModuleDescriptor {
        match self {
            Self::Static(descriptor) => (**descriptor).clone(),
            Self::Forward(forward) => forward.resolve(),
        }
    }
}

/// One entry of a module's export list.
#[derive(Clone)]
pub enum ExportTarget {
    /// Make a locally registered (or re-exported) provider token visible to
    /// importing modules.
    Provider(Token),
    /// Re-export another module: all of its exports are forwarded
    /// transitively.
    Module(ForwardRef),
}

/// Declarative description of one module.
#[derive(Clone, Default)]
pub struct ModuleDescriptor {
    pub name: String,
    pub imports: Vec<ModuleRef>,
    pub providers: Vec<ProviderDescriptor>,
    pub controllers: Vec<ControllerDescriptor>,
    pub exports: Vec<ExportTarget>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The module's token. Two descriptors with the same name denote the same
    /// module; this is what terminates cyclic forward imports.
    pub fn token(&self) -> Token {
        Token::named(&self.name)
    }

    pub fn import(mut self, module: ModuleDescriptor) -> Self {
        self.imports.push(ModuleRef::Static(Box::new(module)));
        self
    }

    pub fn import_forward(mut self, resolve: fn() -> ModuleDescriptor) -> Self {
        self.imports.push(ModuleRef::Forward(ForwardRef::new(resolve)));
        self
    }

    pub fn provider(mut self, provider: ProviderDescriptor) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn controller(mut self, controller: ControllerDescriptor) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn export(mut self, token: impl Into<Token>) -> Self {
        self.exports.push(ExportTarget::Provider(token.into()));
        self
    }

    pub fn export_module(mut self, resolve: fn() -> ModuleDescriptor) -> Self {
        self.exports.push(ExportTarget::Module(ForwardRef::new(resolve)));
        self
    }
}
