// src/cli/error.rs
use crate::application::error::ApplicationError;
use crate::domain::error::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type CliResult<T> = Result<T, CliError>;
