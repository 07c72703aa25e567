use mailsort_core::MessageId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("message {0} has no pending category suggestion")]
    NoSuggestion(MessageId),
    #[error("category name must not be empty")]
    EmptyCategory,
    #[error("message {0} not found")]
    NotFound(MessageId),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage error: {0}")]
    Storage(#[from] mailsort_storage::StorageError),
}

impl EmailError {
    /// Transport-level failures, as opposed to rejected operations.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            EmailError::RequestFailed(_) | EmailError::Http(_) | EmailError::Storage(_)
        )
    }
}
