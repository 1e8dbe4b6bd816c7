//! Data source error type

use std::sync::Arc;

use super::ApiError;

/// Error reported by a table data source.
///
/// The table never inspects this error: it stores it in the failed state and
/// hands it back to the caller as-is. It is cheap to clone so the table
/// status can be read without holding a lock.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
    retryable: bool,
    #[source]
    cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Creates a new fetch error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
            cause: None,
        }
    }

    /// Wraps an arbitrary error, keeping it as the source.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            retryable: true,
            cause: Some(Arc::new(err)),
        }
    }

    /// Marks whether retrying the same request may succeed.
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        let retryable = err.is_retryable();
        Self::from_error(err).retryable(retryable)
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
