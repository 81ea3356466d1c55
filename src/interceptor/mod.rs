use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

pub type InterceptorResult = Result<Response, InterceptorError>;

/// Type-erased error for interceptor chains.
pub type InterceptorError = Box<dyn std::error::Error + Send + Sync>;

/// The next handler in the interception chain.
pub struct Next {
    run: Box<
        dyn FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>> + Send,
    >,
}

impl Next {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>>
            + Send
            + 'static,
    {
        Self { run: Box::new(f) }
    }

    pub async fn run(self, request: Request<Body>) -> InterceptorResult {
        (self.run)(request).await
    }
}

/// Around-advice over a request handler.
///
/// An interceptor sees the request before the handler runs and the response
/// after it returns. Bind one to
/// [`APP_INTERCEPTOR`](crate::constants::APP_INTERCEPTOR) for application-wide
/// interception, or attach it per method through
/// [`MethodMetadata::interceptor`](crate::metadata::MethodMetadata::interceptor).
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult;
}

/// Interceptor logging each request's method, path, and latency.
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let started = std::time::Instant::now();

        let response = next.run(request).await?;

        tracing::info!(
            %method,
            path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request handled"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn interceptor_passes_the_response_through() {
        let next = Next::new(|_request| {
            Box::pin(async {
                Ok(Response::builder()
                    .status(StatusCode::CREATED)
                    .body(Body::empty())
                    .unwrap())
            })
        });

        let response = LoggingInterceptor
            .intercept(Request::new(Body::empty()), next)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
