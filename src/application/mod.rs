pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
