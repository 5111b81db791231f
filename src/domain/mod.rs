pub mod categorization;
pub mod classifier;
pub mod credentials;
pub mod error;
pub mod item;
pub mod pagination;
pub mod repositories;
pub mod services;
