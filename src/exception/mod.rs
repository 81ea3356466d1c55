use std::error::Error;

use axum::response::Response;

pub mod http;

pub use http::{HttpException, HttpExceptionBody, HttpExceptionFilter};

/// Maps errors raised during request processing to responses.
///
/// A provider bound to the [`APP_FILTER`](crate::constants::APP_FILTER) token
/// implements this trait and becomes the application-wide catch handler.
/// Filters must always produce a response; there is nowhere further for an
/// error to propagate.
pub trait ExceptionFilter: Send + Sync + 'static {
    fn catch(&self, error: Box<dyn Error + Send + Sync>) -> Response;
}
