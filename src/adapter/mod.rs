//! HTTP adapter host.

use std::sync::{Arc, RwLock};

/// Holds the application's HTTP adapter once the transport layer registers
/// one.
///
/// The host exists from the start of boot so providers can inject it before
/// an adapter is present; [`HttpAdapterHost::http_adapter`] stays `None`
/// until the transport calls [`HttpAdapterHost::set_http_adapter`].
pub struct HttpAdapterHost<A> {
    adapter: RwLock<Option<Arc<A>>>,
}

impl<A> HttpAdapterHost<A> {
    pub fn new() -> Self {
        Self {
            adapter: RwLock::new(None),
        }
    }

    pub fn set_http_adapter(&self, adapter: Arc<A>) {
        *self.adapter.write().expect("adapter lock poisoned") = Some(adapter);
    }

    pub fn http_adapter(&self) -> Option<Arc<A>> {
        self.adapter.read().expect("adapter lock poisoned").clone()
    }
}

impl<A> Default for HttpAdapterHost<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_is_absent_until_registered() {
        let host: HttpAdapterHost<axum::Router> = HttpAdapterHost::new();
        assert!(host.http_adapter().is_none());

        host.set_http_adapter(Arc::new(axum::Router::new()));
        assert!(host.http_adapter().is_some());
    }
}
