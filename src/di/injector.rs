use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::di::deferred::DeferredRef;
use crate::di::module::ModuleRecord;
use crate::di::wrapper::{Injected, InstanceRef, InstanceWrapper, ProviderSource};
use crate::error::{ArmatureError, Result};
use crate::token::Token;

/// One hop of the resolution path, marked by the kind of edge that entered
/// it.
#[derive(Clone)]
struct PathHop {
    token: Token,
    via_forward: bool,
}

impl PathHop {
    fn origin(token: Token) -> Self {
        Self {
            token,
            via_forward: false,
        }
    }
}

/// Instantiates wrappers against their owning module.
///
/// Dependencies are resolved by token against the owning module's providers,
/// then against each imported module in declaration order, restricted to
/// exported tokens (recursing through re-exports); first match wins.
/// Requesting an uninstantiated dependency triggers its construction inline,
/// so instantiation order falls out as a depth-first post-order walk of the
/// dependency graph without a separate topological sort.
///
/// Cycles are caught through the wrappers' in-flight state. A forward edge
/// pointed at anything mid-construction hands the factory a deferred
/// reference, whichever side of the cycle resolution entered from and
/// whichever task holds the other side. A plain edge closing the current
/// branch's path is an error unless some hop of that cycle was entered
/// through a forward edge, in which case the plain edge defers as well.
#[derive(Default)]
pub struct Injector;

impl Injector {
    pub fn new() -> Self {
        Self
    }

    /// Prototype step: make sure the collection holds exactly one wrapper for
    /// the token and mark its placeholder allocated. Idempotent; dependencies
    /// are not touched.
    pub fn load_prototype_of_instance(
        &self,
        wrapper: &Arc<InstanceWrapper>,
        collection: &DashMap<Token, Arc<InstanceWrapper>>,
    ) -> Arc<InstanceWrapper> {
        if let Some(existing) = collection.get(wrapper.token()) {
            let existing = existing.value().clone();
            existing.mark_prototype();
            return existing;
        }
        collection.insert(wrapper.token().clone(), wrapper.clone());
        wrapper.mark_prototype();
        wrapper.clone()
    }

    pub async fn load_instance_of_provider(
        &self,
        wrapper: &Arc<InstanceWrapper>,
        module: &Arc<ModuleRecord>,
    ) -> Result<InstanceRef> {
        let path = vec![PathHop::origin(wrapper.token().clone())];
        self.load_instance(wrapper.clone(), module.clone(), path)
            .await
    }

    pub async fn load_instance_of_injectable(
        &self,
        wrapper: &Arc<InstanceWrapper>,
        module: &Arc<ModuleRecord>,
    ) -> Result<InstanceRef> {
        let path = vec![PathHop::origin(wrapper.token().clone())];
        self.load_instance(wrapper.clone(), module.clone(), path)
            .await
    }

    pub async fn load_instance_of_route(
        &self,
        wrapper: &Arc<InstanceWrapper>,
        module: &Arc<ModuleRecord>,
    ) -> Result<InstanceRef> {
        let path = vec![PathHop::origin(wrapper.token().clone())];
        self.load_instance(wrapper.clone(), module.clone(), path)
            .await
    }

    /// Construct one wrapper, memoized. `path` is the chain of wrappers under
    /// construction on this branch, ending with this one. A wrapper already
    /// in flight on a *different* branch is awaited; cycle edges never reach
    /// this point, [`Injector::resolve_dependencies`] defers them instead.
    fn load_instance(
        &self,
        wrapper: Arc<InstanceWrapper>,
        module: Arc<ModuleRecord>,
        path: Vec<PathHop>,
    ) -> BoxFuture<'_, Result<InstanceRef>> {
        Box::pin(async move {
            loop {
                if let Some(instance) = wrapper.instance() {
                    return Ok(instance);
                }
                if wrapper.begin_resolving() {
                    break;
                }
                let done = wrapper.done_signal();
                if let Some(instance) = wrapper.instance() {
                    return Ok(instance);
                }
                done.await;
            }

            match self.construct(&wrapper, &module, &path).await {
                Ok(instance) => {
                    wrapper.set_instance(instance.clone());
                    wrapper.finish_resolving();
                    Ok(instance)
                }
                Err(err) => {
                    wrapper.finish_resolving();
                    Err(err)
                }
            }
        })
    }

    async fn construct(
        &self,
        wrapper: &Arc<InstanceWrapper>,
        module: &Arc<ModuleRecord>,
        path: &[PathHop],
    ) -> Result<InstanceRef> {
        match wrapper.source() {
            ProviderSource::Value(value) => Ok(value.clone()),
            ProviderSource::Alias(target) => {
                let (target_wrapper, host) = self.lookup(target, module).ok_or_else(|| {
                    ArmatureError::UnknownDependency {
                        requester: wrapper.token().to_string(),
                        token: target.to_string(),
                    }
                })?;
                if path.iter().any(|hop| hop.token == *target_wrapper.token()) {
                    return Err(ArmatureError::CircularDependency {
                        requester: wrapper.token().to_string(),
                        token: target.to_string(),
                    });
                }
                let mut next = path.to_vec();
                next.push(PathHop::origin(target_wrapper.token().clone()));
                self.load_instance(target_wrapper, host, next).await
            }
            ProviderSource::Factory(factory) => {
                let factory = factory.clone();
                let dependencies = self.resolve_dependencies(wrapper, module, path).await?;
                factory(dependencies).await
            }
        }
    }

    async fn resolve_dependencies(
        &self,
        wrapper: &Arc<InstanceWrapper>,
        module: &Arc<ModuleRecord>,
        path: &[PathHop],
    ) -> Result<Vec<Injected>> {
        let mut resolved = Vec::with_capacity(wrapper.inject().len());
        for dependency in wrapper.inject() {
            let token = dependency.resolve();
            let Some((target, host)) = self.lookup(&token, module) else {
                return Err(ArmatureError::UnknownDependency {
                    requester: wrapper.token().to_string(),
                    token: token.to_string(),
                });
            };
            if let Some(instance) = target.instance() {
                resolved.push(Injected::Instance(instance));
                continue;
            }
            if dependency.is_forward() && target.is_resolving() {
                // The forward edge closes a cycle: the target is under
                // construction, on this branch or on a concurrently loaded
                // one. Hand back a reference that resolves once boot
                // completes.
                resolved.push(Injected::Deferred(DeferredRef::new(target)));
                continue;
            }
            if !dependency.is_forward() {
                if let Some(position) = path
                    .iter()
                    .position(|hop| hop.token == *target.token())
                {
                    if path[position + 1..].iter().any(|hop| hop.via_forward) {
                        // The cycle was entered through a forward edge, so it
                        // is sanctioned no matter which side resolution
                        // started from; this plain edge defers as well.
                        resolved.push(Injected::Deferred(DeferredRef::new(target)));
                        continue;
                    }
                    return Err(ArmatureError::CircularDependency {
                        requester: wrapper.token().to_string(),
                        token: token.to_string(),
                    });
                }
            }
            let mut next = path.to_vec();
            next.push(PathHop {
                token: target.token().clone(),
                via_forward: dependency.is_forward(),
            });
            let instance = self.load_instance(target, host, next).await?;
            resolved.push(Injected::Instance(instance));
        }
        Ok(resolved)
    }

    fn lookup(
        &self,
        token: &Token,
        module: &Arc<ModuleRecord>,
    ) -> Option<(Arc<InstanceWrapper>, Arc<ModuleRecord>)> {
        if let Some(wrapper) = module.provider(token) {
            return Some((wrapper, module.clone()));
        }
        let mut visited = HashSet::new();
        for import in module.imports() {
            if let Some(found) = lookup_exported(&import, token, &mut visited) {
                return Some(found);
            }
        }
        None
    }
}

/// Search an imported module for a token it exports, following re-export
/// chains. Tokens the module holds but does not export stay invisible.
fn lookup_exported(
    module: &Arc<ModuleRecord>,
    token: &Token,
    visited: &mut HashSet<Token>,
) -> Option<(Arc<InstanceWrapper>, Arc<ModuleRecord>)> {
    if !visited.insert(module.token().clone()) {
        return None;
    }
    if !module.exports_token(token) {
        return None;
    }
    if let Some(wrapper) = module.provider(token) {
        return Some((wrapper, module.clone()));
    }
    for import in module.imports() {
        if let Some(found) = lookup_exported(&import, token, visited) {
            return Some(found);
        }
    }
    None
}
