use std::sync::{Arc, OnceLock};

use crate::di::wrapper::{InstanceRef, InstanceWrapper};
use crate::error::{ArmatureError, Result};
use crate::token::Token;

/// Untyped handle to a wrapper that was mid-construction when it was
/// requested.
///
/// Handed out by the injector across forward-reference edges. It resolves to
/// the finished instance once the boot sequence has completed the cycle.
#[derive(Clone)]
pub struct DeferredRef {
    wrapper: Arc<InstanceWrapper>,
}

impl DeferredRef {
    pub(crate) fn new(wrapper: Arc<InstanceWrapper>) -> Self {
        Self { wrapper }
    }

    pub fn token(&self) -> &Token {
        self.wrapper.token()
    }

    pub fn resolve(&self) -> Result<InstanceRef> {
        self.wrapper.instance().ok_or_else(|| {
            ArmatureError::Internal(format!(
                "'{}' has not been constructed yet; deferred references resolve once boot completes",
                self.wrapper.token()
            ))
        })
    }
}

#[derive(Clone)]
enum Source {
    Ready(InstanceRef),
    Pending(DeferredRef),
}

/// Typed lazily-resolved dependency handle.
///
/// A service on the receiving end of a circular dependency stores one of
/// these instead of an `Arc<T>`. The first `get()` after boot resolves and
/// memoizes the target; later calls are a cheap clone.
pub struct Deferred<T> {
    source: Source,
    cell: OnceLock<Arc<T>>,
}

impl<T: Send + Sync + 'static> Deferred<T> {
    pub(crate) fn ready(instance: InstanceRef) -> Self {
        Self {
            source: Source::Ready(instance),
            cell: OnceLock::new(),
        }
    }

    pub(crate) fn pending(deferred: DeferredRef) -> Self {
        Self {
            source: Source::Pending(deferred),
            cell: OnceLock::new(),
        }
    }

    /// Resolve the target instance.
    ///
    /// Fails if called before the cycle finished constructing, or if the
    /// target is not a `T`.
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(held) = self.cell.get() {
            return Ok(held.clone());
        }
        let instance = match &self.source {
            Source::Ready(instance) => instance.clone(),
            Source::Pending(deferred) => deferred.resolve()?,
        };
        let typed = instance.downcast::<T>()?;
        let _ = self.cell.set(typed.clone());
        Ok(typed)
    }
}

impl<T: Send + Sync + 'static> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some(held) = self.cell.get() {
            let _ = cell.set(held.clone());
        }
        Self {
            source: self.source.clone(),
            cell,
        }
    }
}
