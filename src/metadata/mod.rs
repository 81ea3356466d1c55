//! Declared method metadata and its scanner.
//!
//! Controllers describe their methods as data: which guards, interceptors,
//! and pipes each method carries. [`ClassMetadata`] can extend a parent
//! metadata record to model inherited methods; the [`MetadataScanner`] walks
//! the chain the way a prototype walk would, subclass first.

use crate::provider::ClassDescriptor;
use crate::token::Token;

/// Metadata key under which enhancers attach to a method.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MetadataKey {
    Guards,
    Interceptors,
    Pipes,
}

/// Enhancers attached to one declared method.
#[derive(Clone, Default)]
pub struct MethodMetadata {
    pub name: String,
    pub guards: Vec<ClassDescriptor>,
    pub interceptors: Vec<ClassDescriptor>,
    pub pipes: Vec<ClassDescriptor>,
}

impl MethodMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn guard(mut self, descriptor: ClassDescriptor) -> Self {
        self.guards.push(descriptor);
        self
    }

    pub fn interceptor(mut self, descriptor: ClassDescriptor) -> Self {
        self.interceptors.push(descriptor);
        self
    }

    pub fn pipe(mut self, descriptor: ClassDescriptor) -> Self {
        self.pipes.push(descriptor);
        self
    }

    pub(crate) fn for_key(&self, key: MetadataKey) -> &[ClassDescriptor] {
        match key {
            MetadataKey::Guards => &self.guards,
            MetadataKey::Interceptors => &self.interceptors,
            MetadataKey::Pipes => &self.pipes,
        }
    }
}

/// Declared methods of a class, including an optional inherited chain.
#[derive(Clone, Default)]
pub struct ClassMetadata {
    pub methods: Vec<MethodMetadata>,
    pub extends: Option<Box<ClassMetadata>>,
}

impl ClassMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    pub fn extends(mut self, parent: ClassMetadata) -> Self {
        self.extends = Some(Box::new(parent));
        self
    }

    /// Every enhancer attached anywhere on this class or its ancestors.
    pub(crate) fn enhancers(&self) -> Vec<&ClassDescriptor> {
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(metadata) = current {
            for method in &metadata.methods {
                out.extend(method.guards.iter());
                out.extend(method.interceptors.iter());
                out.extend(method.pipes.iter());
            }
            current = metadata.extends.as_deref();
        }
        out
    }
}

/// Walks declared method metadata, following the inheritance chain.
#[derive(Default)]
pub struct MetadataScanner;

impl MetadataScanner {
    pub fn new() -> Self {
        Self
    }

    /// Declared method names, subclass first, inherited included, without
    /// duplicates (an override shadows the parent's entry).
    pub fn method_names<'a>(&self, metadata: &'a ClassMetadata) -> Vec<&'a str> {
        let mut names: Vec<&str> = Vec::new();
        let mut current = Some(metadata);
        while let Some(class) = current {
            for method in &class.methods {
                if !names.contains(&method.name.as_str()) {
                    names.push(&method.name);
                }
            }
            current = class.extends.as_deref();
        }
        names
    }

    /// Tokens attached to `method` under `key`, or `None` when the method has
    /// no metadata for that key. The nearest declaration in the chain wins.
    pub fn key_metadata(
        &self,
        metadata: &ClassMetadata,
        key: MetadataKey,
        method: &str,
    ) -> Option<Vec<Token>> {
        let mut current = Some(metadata);
        while let Some(class) = current {
            if let Some(found) = class.methods.iter().find(|m| m.name == method) {
                let attached = found.for_key(key);
                if attached.is_empty() {
                    return None;
                }
                return Some(attached.iter().map(|d| d.token.clone()).collect());
            }
            current = class.extends.as_deref();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RolesGuard;

    fn guard_descriptor() -> ClassDescriptor {
        ClassDescriptor::new::<RolesGuard, _>(Vec::new(), |_| Ok(RolesGuard))
    }

    #[test]
    fn method_names_walk_the_chain_subclass_first() {
        let parent = ClassMetadata::new()
            .method(MethodMetadata::new("list"))
            .method(MethodMetadata::new("find"));
        let child = ClassMetadata::new()
            .method(MethodMetadata::new("find"))
            .method(MethodMetadata::new("create"))
            .extends(parent);

        let names = MetadataScanner::new().method_names(&child);
        assert_eq!(names, vec!["find", "create", "list"]);
    }

    #[test]
    fn key_metadata_is_none_without_attachments() {
        let metadata = ClassMetadata::new().method(MethodMetadata::new("list"));
        let scanner = MetadataScanner::new();
        assert!(
            scanner
                .key_metadata(&metadata, MetadataKey::Guards, "list")
                .is_none()
        );
        assert!(
            scanner
                .key_metadata(&metadata, MetadataKey::Guards, "missing")
                .is_none()
        );
    }

    #[test]
    fn key_metadata_returns_the_attached_tokens() {
        let metadata =
            ClassMetadata::new().method(MethodMetadata::new("create").guard(guard_descriptor()));
        let tokens = MetadataScanner::new()
            .key_metadata(&metadata, MetadataKey::Guards, "create")
            .unwrap();
        assert_eq!(tokens, vec![Token::of::<RolesGuard>()]);
    }
}
