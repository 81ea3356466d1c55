//! Application-wide configuration assembled during boot.

use std::sync::RwLock;

use crate::di::wrapper::InstanceRef;

/// Registry of global cross-cutting providers.
///
/// One instance is constructed per application during boot and passed by
/// reference to whatever consumes it; there is no ambient global state. The
/// four sequences are append-only while the graph is instantiated and
/// read-only afterwards. Registration order is significant: it is the order
/// guards, interceptors, pipes, and filters run in at request time.
#[derive(Default)]
pub struct ApplicationConfig {
    global_guards: RwLock<Vec<InstanceRef>>,
    global_interceptors: RwLock<Vec<InstanceRef>>,
    global_pipes: RwLock<Vec<InstanceRef>>,
    global_filters: RwLock<Vec<InstanceRef>>,
}

impl ApplicationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_global_guard(&self, guard: InstanceRef) {
        self.global_guards
            .write()
            .expect("guards lock poisoned")
            .push(guard);
    }

    pub fn add_global_interceptor(&self, interceptor: InstanceRef) {
        self.global_interceptors
            .write()
            .expect("interceptors lock poisoned")
            .push(interceptor);
    }

    pub fn add_global_pipe(&self, pipe: InstanceRef) {
        self.global_pipes
            .write()
            .expect("pipes lock poisoned")
            .push(pipe);
    }

    pub fn add_global_filter(&self, filter: InstanceRef) {
        self.global_filters
            .write()
            .expect("filters lock poisoned")
            .push(filter);
    }

    pub fn global_guards(&self) -> Vec<InstanceRef> {
        self.global_guards
            .read()
            .expect("guards lock poisoned")
            .clone()
    }

    pub fn global_interceptors(&self) -> Vec<InstanceRef> {
        self.global_interceptors
            .read()
            .expect("interceptors lock poisoned")
            .clone()
    }

    pub fn global_pipes(&self) -> Vec<InstanceRef> {
        self.global_pipes
            .read()
            .expect("pipes lock poisoned")
            .clone()
    }

    pub fn global_filters(&self) -> Vec<InstanceRef> {
        self.global_filters
            .read()
            .expect("filters lock poisoned")
            .clone()
    }
}
