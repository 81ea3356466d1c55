//! Provider and controller descriptors.
//!
//! Units are declared to the framework as plain data: a descriptor names the
//! token, the dependencies to inject, and how to construct the instance. The
//! scanner turns a descriptor tree into the container graph without any
//! runtime reflection.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};

use crate::di::wrapper::{Injected, InstanceRef};
use crate::error::Result;
use crate::metadata::ClassMetadata;
use crate::token::Token;

/// Constructor shared by class providers, factory providers, and injectables:
/// takes the resolved dependencies in declaration order, yields the instance.
pub type ProviderFactory =
    Arc<dyn Fn(Vec<Injected>) -> BoxFuture<'static, Result<InstanceRef>> + Send + Sync>;

/// One dependency edge of a descriptor.
#[derive(Clone)]
pub enum Dependency {
    /// Resolve the token eagerly, depth-first.
    Token(Token),
    /// Forward reference: the token is produced by a thunk and the edge is
    /// allowed to close a construction cycle.
    Forward(fn() -> Token),
}

impl Dependency {
    /// Depend on a unit by its type identity.
    pub fn on<T: ?Sized + 'static>() -> Self {
        Self::Token(Token::of::<T>())
    }

    /// Depend on a unit by token.
    pub fn token(token: impl Into<Token>) -> Self {
        Self::Token(token.into())
    }

    /// Depend on a unit through a forward reference, breaking a cycle.
    pub fn forward(resolve: fn() -> Token) -> Self {
        Self::Forward(resolve)
    }

    pub(crate) fn resolve(&self) -> Token {
        match self {
            Self::Token(token) => token.clone(),
            Self::Forward(resolve) => resolve(),
        }
    }

    pub(crate) fn is_forward(&self) -> bool {
        matches!(self, Self::Forward(_))
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "Dependency::Token({token})"),
            Self::Forward(_) => f.write_str("Dependency::Forward(..)"),
        }
    }
}

fn sync_factory<T, F>(construct: F) -> ProviderFactory
where
    T: Send + Sync + 'static,
    F: Fn(Vec<Injected>) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(move |deps| {
        let built = construct(deps).map(InstanceRef::new);
        Box::pin(future::ready(built))
    })
}

/// Descriptor for a unit constructed from its class: a token derived from the
/// type, the dependency list, and a constructor.
///
/// Also the shape of method-level enhancers (guards, interceptors, pipes)
/// attached through [`ClassMetadata`].
#[derive(Clone)]
pub struct ClassDescriptor {
    pub token: Token,
    pub inject: Vec<Dependency>,
    pub construct: ProviderFactory,
}

impl ClassDescriptor {
    pub fn new<T, F>(inject: Vec<Dependency>, construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Vec<Injected>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            token: Token::of::<T>(),
            inject,
            construct: sync_factory(construct),
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }
}

/// A provider declaration: a tagged variant with one case per provider kind.
#[derive(Clone)]
pub enum ProviderDescriptor {
    /// A plain class provider.
    Class(ClassDescriptor),
    /// `useValue`: bind an already-built value to a token.
    Value { token: Token, value: InstanceRef },
    /// `useFactory`: bind a factory (optionally async) to a token.
    Factory {
        token: Token,
        inject: Vec<Dependency>,
        factory: ProviderFactory,
    },
    /// `useExisting`: alias a token to another registered token.
    Existing { token: Token, target: Token },
}

impl ProviderDescriptor {
    pub fn class<T, F>(inject: Vec<Dependency>, construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Vec<Injected>) -> Result<T> + Send + Sync + 'static,
    {
        Self::Class(ClassDescriptor::new(inject, construct))
    }

    pub fn value<T: Send + Sync + 'static>(token: impl Into<Token>, value: T) -> Self {
        Self::Value {
            token: token.into(),
            value: InstanceRef::new(value),
        }
    }

    pub fn factory<T, F>(token: impl Into<Token>, inject: Vec<Dependency>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Vec<Injected>) -> Result<T> + Send + Sync + 'static,
    {
        Self::Factory {
            token: token.into(),
            inject,
            factory: sync_factory(factory),
        }
    }

    /// Factory provider whose construction awaits asynchronous setup. The
    /// loader suspends at these points and interleaves independent providers.
    pub fn async_factory<T, F, Fut>(
        token: impl Into<Token>,
        inject: Vec<Dependency>,
        factory: F,
    ) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Vec<Injected>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self::Factory {
            token: token.into(),
            inject,
            factory: Arc::new(move |deps| {
                let building = factory(deps);
                Box::pin(async move { building.await.map(InstanceRef::new) })
            }),
        }
    }

    pub fn existing(token: impl Into<Token>, target: impl Into<Token>) -> Self {
        Self::Existing {
            token: token.into(),
            target: target.into(),
        }
    }

    pub fn token(&self) -> &Token {
        match self {
            Self::Class(class) => &class.token,
            Self::Value { token, .. } => token,
            Self::Factory { token, .. } => token,
            Self::Existing { token, .. } => token,
        }
    }

    /// Everything except a plain class provider is a custom provider.
    pub fn is_custom(&self) -> bool {
        !matches!(self, Self::Class(_))
    }

    pub(crate) fn with_token(self, token: Token) -> Self {
        match self {
            Self::Class(mut class) => {
                class.token = token;
                Self::Class(class)
            }
            Self::Value { value, .. } => Self::Value { token, value },
            Self::Factory {
                inject, factory, ..
            } => Self::Factory {
                token,
                inject,
                factory,
            },
            Self::Existing { target, .. } => Self::Existing { token, target },
        }
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Class(_) => "class",
            Self::Value { .. } => "value",
            Self::Factory { .. } => "factory",
            Self::Existing { .. } => "existing",
        };
        write!(f, "ProviderDescriptor::{kind}({})", self.token())
    }
}

/// A controller declaration: construction plus optional method metadata
/// (guards, interceptors, pipes attached per method).
#[derive(Clone)]
pub struct ControllerDescriptor {
    pub class: ClassDescriptor,
    pub metadata: Option<ClassMetadata>,
}

impl ControllerDescriptor {
    pub fn new<T, F>(inject: Vec<Dependency>, construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Vec<Injected>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            class: ClassDescriptor::new(inject, construct),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ClassMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn token(&self) -> &Token {
        &self.class.token
    }
}
