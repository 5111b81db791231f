// src/domain/services/content_fetcher.rs
use crate::domain::error::DomainResult;

/// Fetches the HTML of a resolved URL with a bounded timeout.
///
/// Errors returned here are value-level from the pipeline's point of view:
/// the categorization driver records them against the item and moves on.
pub trait ContentFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> DomainResult<String>;
}
