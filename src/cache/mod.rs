//! Cache store contracts.
//!
//! The framework defines the store interface and its options; concrete
//! backends live outside the core and plug in through a
//! [`CacheStoreFactory`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Key-value store contract consumed by caching layers.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Store a value under `key`. A `ttl` of `None` means the store's
    /// configured default applies.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<()>;

    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    async fn del(&self, key: &str) -> CacheResult<()>;
}

/// Builds a concrete store from the caching options.
pub trait CacheStoreFactory: Send + Sync + 'static {
    fn create(&self, options: &CacheOptions) -> Arc<dyn CacheStore>;
}

/// Which backend the caching layer uses.
#[derive(Clone)]
pub enum CacheStoreOption {
    /// A store known to the runtime by name.
    Named(String),
    /// An explicit factory supplied by the application.
    Factory(Arc<dyn CacheStoreFactory>),
}

/// Options shared by every store backend.
pub struct CacheOptions {
    /// Backend selection; in-process memory unless overridden.
    pub store: CacheStoreOption,
    /// Default entry lifetime.
    pub ttl: Duration,
    /// Maximum number of entries the store keeps.
    pub max: usize,
    /// Predicate deciding whether a produced value enters the cache.
    pub is_cacheable_value: fn(&Value) -> bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            store: CacheStoreOption::Named("memory".to_string()),
            ttl: Duration::from_secs(5),
            max: 100,
            is_cacheable_value: |value| !value.is_null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_memory_five_seconds_one_hundred_entries() {
        let options = CacheOptions::default();
        assert!(matches!(
            &options.store,
            CacheStoreOption::Named(name) if name == "memory"
        ));
        assert_eq!(options.ttl, Duration::from_secs(5));
        assert_eq!(options.max, 100);
    }

    struct NullStore;

    #[async_trait]
    impl CacheStore for NullStore {
        async fn set(&self, _key: &str, _value: Value, _ttl: Option<Duration>) -> CacheResult<()> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> CacheResult<Option<Value>> {
            Ok(None)
        }

        async fn del(&self, _key: &str) -> CacheResult<()> {
            Ok(())
        }
    }

    struct NullStoreFactory;

    impl CacheStoreFactory for NullStoreFactory {
        fn create(&self, _options: &CacheOptions) -> Arc<dyn CacheStore> {
            Arc::new(NullStore)
        }
    }

    #[tokio::test]
    async fn a_factory_option_builds_the_configured_store() {
        let options = CacheOptions {
            store: CacheStoreOption::Factory(Arc::new(NullStoreFactory)),
            ..CacheOptions::default()
        };
        let CacheStoreOption::Factory(factory) = options.store.clone() else {
            panic!("expected a factory store option");
        };
        let store = factory.create(&options);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[test]
    fn null_values_are_not_cacheable_by_default() {
        let options = CacheOptions::default();
        assert!(!(options.is_cacheable_value)(&Value::Null));
        assert!((options.is_cacheable_value)(&json!("hit")));
        assert!((options.is_cacheable_value)(&json!(0)));
    }
}
