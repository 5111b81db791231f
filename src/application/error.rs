// src/application/error.rs
use crate::domain::error::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Application error: {0}")]
    Other(String),
}

impl ApplicationError {
    /// Add context while preserving the error variant.
    pub fn context<C: AsRef<str>>(self, context: C) -> Self {
        match self {
            ApplicationError::Domain(e) => {
                ApplicationError::Other(format!("{}: {}", context.as_ref(), e))
            }
            ApplicationError::Validation(msg) => {
                ApplicationError::Validation(format!("{}: {}", context.as_ref(), msg))
            }
            ApplicationError::Other(msg) => {
                ApplicationError::Other(format!("{}: {}", context.as_ref(), msg))
            }
        }
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
