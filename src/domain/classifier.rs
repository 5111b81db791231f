// src/domain/classifier.rs
use crate::domain::categorization::Classification;
use crate::domain::error::DomainResult;

/// Core trait for page classification.
///
/// Implementations are polymorphic over where the model runs: in-process
/// (constructed once, reused, not assumed safe to share across threads) or
/// behind a remote HTTP scorer. Deliberately no `Send + Sync` supertrait —
/// the orchestrator only fans out over implementations that are `Sync`.
pub trait Classifier {
    /// Score the page, returning per-category scores plus an embedding
    /// vector. Failures here are per-item and get recorded, not escalated.
    fn classify(&self, url: &str, html: &str) -> DomainResult<Classification>;

    /// Short human-readable name for logs.
    fn name(&self) -> &str;
}
