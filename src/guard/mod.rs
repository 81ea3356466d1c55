use async_trait::async_trait;
use axum::http::request::Parts;

/// Outcome of a guard check.
/// Ok(()) means the request may proceed; Err(GuardError) denies it.
pub type GuardResult = Result<(), GuardError>;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Request-time admission contract.
///
/// Guards inspect the request head (method, URI, headers); the body stays
/// with the handler, which keeps guard futures freely shareable across
/// tasks. A provider bound to the [`APP_GUARD`](crate::constants::APP_GUARD)
/// token implements this trait and runs for every route; method-scoped guards
/// attach through
/// [`MethodMetadata::guard`](crate::metadata::MethodMetadata::guard).
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn can_activate(&self, request: &Parts) -> GuardResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    struct RequireHeader(&'static str);

    #[async_trait]
    impl Guard for RequireHeader {
        async fn can_activate(&self, request: &Parts) -> GuardResult {
            if request.headers.contains_key(self.0) {
                Ok(())
            } else {
                Err(GuardError::Unauthorized(format!("missing {}", self.0)))
            }
        }
    }

    #[tokio::test]
    async fn guard_denies_without_the_header() {
        let guard = RequireHeader("x-api-key");

        let (parts, _) = Request::new(()).into_parts();
        assert!(guard.can_activate(&parts).await.is_err());

        let (parts, _) = Request::builder()
            .header("x-api-key", "secret")
            .body(())
            .unwrap()
            .into_parts();
        assert!(guard.can_activate(&parts).await.is_ok());
    }
}
