// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Transient 503 from the remote service; the paginated fetcher retries these.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other remote failure; fatal for the current run.
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// Per-item content fetch failure; recorded, never aborts a batch.
    #[error("Content fetch failed: {0}")]
    ContentFetch(String),

    /// Per-item classifier failure; recorded, never aborts a batch.
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Failed to serialize: {0}")]
    SerializationError(String),

    #[error("Failed to deserialize: {0}")]
    DeserializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
