use async_trait::async_trait;

pub type PipeResult<T> = Result<T, PipeError>;

#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transformation failed: {0}")]
    Transformation(String),

    #[error("Internal pipe error: {0}")]
    Internal(String),
}

/// Transformation and validation contract for request inputs.
///
/// A provider bound to the [`APP_PIPE`](crate::constants::APP_PIPE) token runs
/// application-wide; method-scoped pipes attach through
/// [`MethodMetadata::pipe`](crate::metadata::MethodMetadata::pipe).
#[async_trait]
pub trait Pipe: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn transform(&self, input: Self::Input) -> PipeResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ParseIntPipe;

    #[async_trait]
    impl Pipe for ParseIntPipe {
        type Input = String;
        type Output = i64;

        async fn transform(&self, input: String) -> PipeResult<i64> {
            input
                .trim()
                .parse()
                .map_err(|_| PipeError::Validation(format!("'{input}' is not an integer")))
        }
    }

    #[tokio::test]
    async fn pipe_validates_and_transforms() {
        let pipe = ParseIntPipe;
        assert_eq!(pipe.transform(" 42 ".to_string()).await.unwrap(), 42);
        assert!(pipe.transform("abc".to_string()).await.is_err());
    }
}
