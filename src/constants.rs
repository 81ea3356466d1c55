//! Reserved provider tokens.
//!
//! A provider bound to one of these tokens is registered like any other
//! provider, and additionally applied application-wide after boot: guards,
//! interceptors, pipes, and exception filters declared this way run for every
//! request regardless of which module declared them.

/// Binds a provider as an application-wide guard.
pub const APP_GUARD: &str = "APP_GUARD";

/// Binds a provider as an application-wide interceptor.
pub const APP_INTERCEPTOR: &str = "APP_INTERCEPTOR";

/// Binds a provider as an application-wide pipe.
pub const APP_PIPE: &str = "APP_PIPE";

/// Binds a provider as an application-wide exception filter.
pub const APP_FILTER: &str = "APP_FILTER";
