use std::any::{Any, type_name};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;
use tokio::sync::futures::Notified;

use crate::di::deferred::{Deferred, DeferredRef};
use crate::error::{ArmatureError, Result};
use crate::provider::{ClassDescriptor, Dependency, ProviderDescriptor, ProviderFactory};
use crate::token::Token;

/// Shared handle to a constructed instance.
///
/// The concrete type is erased; consumers recover it with
/// [`InstanceRef::downcast`].
#[derive(Clone)]
pub struct InstanceRef(Arc<dyn Any + Send + Sync>);

impl InstanceRef {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self(value)
    }

    pub fn downcast<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.0
            .clone()
            .downcast::<T>()
            .map_err(|_| ArmatureError::DowncastFailed {
                type_name: type_name::<T>().to_string(),
            })
    }
}

impl fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InstanceRef")
    }
}

/// One resolved dependency, as handed to a provider factory.
///
/// Acyclic dependencies arrive as [`Injected::Instance`]. A dependency edge
/// declared with [`Dependency::forward`] that closes a construction cycle
/// arrives as [`Injected::Deferred`] instead; store it via
/// [`Injected::deferred`] and dereference after boot.
pub enum Injected {
    Instance(InstanceRef),
    Deferred(DeferredRef),
}

impl Injected {
    /// Recover the concrete instance.
    ///
    /// Fails for deferred references: those are only accessible through
    /// [`Injected::deferred`], since the target is still mid-construction.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        match self {
            Self::Instance(instance) => instance.downcast(),
            Self::Deferred(deferred) => Err(ArmatureError::Internal(format!(
                "dependency '{}' is part of a construction cycle; hold it as a Deferred<T> instead",
                deferred.token()
            ))),
        }
    }

    /// Wrap the dependency in a lazily-resolved typed handle.
    ///
    /// Works for both variants, so a constructor written against
    /// `Deferred<T>` behaves identically whether or not the cycle was active
    /// when it ran.
    pub fn deferred<T: Send + Sync + 'static>(&self) -> Deferred<T> {
        match self {
            Self::Instance(instance) => Deferred::ready(instance.clone()),
            Self::Deferred(deferred) => Deferred::pending(deferred.clone()),
        }
    }
}

/// How a wrapper obtains its instance.
#[derive(Clone)]
pub(crate) enum ProviderSource {
    /// Run a (possibly asynchronous) factory over the resolved dependencies.
    Factory(ProviderFactory),
    /// A pre-resolved value; instantiation just publishes it.
    Value(InstanceRef),
    /// Alias of another token in the same visibility scope.
    Alias(Token),
}

/// Registry record for one injectable unit.
///
/// Created during the prototype pass; its `instance` cell transitions from
/// unset to a concrete value exactly once during the instantiation pass. The
/// in-flight flag lets the injector detect re-entrant construction of the
/// same wrapper, which is how circular chains are caught (or, with a forward
/// edge, resolved).
pub struct InstanceWrapper {
    token: Token,
    source: ProviderSource,
    inject: Vec<Dependency>,
    instance: OnceLock<InstanceRef>,
    resolving: AtomicBool,
    prototype: AtomicBool,
    done: Notify,
}

impl InstanceWrapper {
    pub(crate) fn new(token: Token, source: ProviderSource, inject: Vec<Dependency>) -> Self {
        Self {
            token,
            source,
            inject,
            instance: OnceLock::new(),
            resolving: AtomicBool::new(false),
            prototype: AtomicBool::new(false),
            done: Notify::new(),
        }
    }

    pub(crate) fn from_provider(descriptor: ProviderDescriptor) -> Self {
        match descriptor {
            ProviderDescriptor::Class(class) => Self::from_class(class),
            ProviderDescriptor::Value { token, value } => {
                Self::new(token, ProviderSource::Value(value), Vec::new())
            }
            ProviderDescriptor::Factory {
                token,
                inject,
                factory,
            } => Self::new(token, ProviderSource::Factory(factory), inject),
            ProviderDescriptor::Existing { token, target } => {
                Self::new(token, ProviderSource::Alias(target), Vec::new())
            }
        }
    }

    pub(crate) fn from_class(descriptor: ClassDescriptor) -> Self {
        Self::new(
            descriptor.token,
            ProviderSource::Factory(descriptor.construct),
            descriptor.inject,
        )
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The constructed instance, if the instantiation pass reached it.
    pub fn instance(&self) -> Option<InstanceRef> {
        self.instance.get().cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }

    pub(crate) fn set_instance(&self, instance: InstanceRef) {
        // OnceLock: a second set is a no-op, preserving first-write-wins.
        let _ = self.instance.set(instance);
    }

    /// Claim the in-flight flag. Returns false if construction already began.
    pub(crate) fn begin_resolving(&self) -> bool {
        !self.resolving.swap(true, Ordering::AcqRel)
    }

    /// Whether construction is currently in flight, on any task.
    pub(crate) fn is_resolving(&self) -> bool {
        self.resolving.load(Ordering::Acquire)
    }

    pub(crate) fn finish_resolving(&self) {
        self.resolving.store(false, Ordering::Release);
        self.done.notify_waiters();
    }

    pub(crate) fn done_signal(&self) -> Notified<'_> {
        self.done.notified()
    }

    /// Mark the prototype placeholder allocated. Returns true on first call.
    pub(crate) fn mark_prototype(&self) -> bool {
        !self.prototype.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn has_prototype(&self) -> bool {
        self.prototype.load(Ordering::Acquire)
    }

    pub(crate) fn source(&self) -> &ProviderSource {
        &self.source
    }

    pub(crate) fn inject(&self) -> &[Dependency] {
        &self.inject
    }
}

impl fmt::Debug for InstanceWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceWrapper")
            .field("token", &self.token)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Config {
        url: String,
    }

    #[test]
    fn downcast_recovers_the_concrete_type() {
        let instance = InstanceRef::new(Config {
            url: "localhost".into(),
        });
        let config = instance.downcast::<Config>().unwrap();
        assert_eq!(config.url, "localhost");
    }

    #[test]
    fn downcast_to_wrong_type_fails() {
        let instance = InstanceRef::new(42u32);
        let err = instance.downcast::<Config>().unwrap_err();
        assert!(matches!(err, ArmatureError::DowncastFailed { .. }));
    }

    #[test]
    fn instance_is_set_exactly_once() {
        let wrapper = InstanceWrapper::new(
            Token::named("CONFIG"),
            ProviderSource::Value(InstanceRef::new(1u32)),
            Vec::new(),
        );
        wrapper.set_instance(InstanceRef::new(1u32));
        wrapper.set_instance(InstanceRef::new(2u32));
        let held = wrapper.instance().unwrap().downcast::<u32>().unwrap();
        assert_eq!(*held, 1);
    }

    #[test]
    fn prototype_flag_is_claimed_once() {
        let wrapper = InstanceWrapper::new(
            Token::named("SERVICE"),
            ProviderSource::Value(InstanceRef::new(())),
            Vec::new(),
        );
        assert!(!wrapper.has_prototype());
        assert!(wrapper.mark_prototype());
        assert!(!wrapper.mark_prototype());
        assert!(wrapper.has_prototype());
    }

    #[test]
    fn in_flight_flag_is_claimed_once() {
        let wrapper = InstanceWrapper::new(
            Token::named("SERVICE"),
            ProviderSource::Value(InstanceRef::new(())),
            Vec::new(),
        );
        assert!(wrapper.begin_resolving());
        assert!(!wrapper.begin_resolving());
        wrapper.finish_resolving();
        assert!(wrapper.begin_resolving());
    }
}
