// src/domain/repositories/library.rs
use crate::domain::categorization::CategorizationRecord;
use crate::domain::error::DomainResult;
use crate::domain::item::{Item, NormalizedRecord};

/// Which items a categorization run should pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorizationTarget {
    /// Items with no categorization record at all.
    New,
    /// Items whose record carries a non-null error (retry pass).
    ErrorsOnly,
    /// Every normal-status item, regardless of existing records.
    All,
}

/// Durable store for the mirrored library: items, authors, the pagination
/// cursor and per-item categorization records. All writes are
/// insert-or-replace by primary key (full replacement, no field merge).
pub trait LibraryRepository: Send + Sync {
    /// Upsert one normalized record: the item row, its deduplicated author
    /// batch and the item-author associations.
    fn upsert_record(&self, record: &NormalizedRecord) -> DomainResult<()>;

    fn get_item(&self, item_id: i64) -> DomainResult<Option<Item>>;

    fn item_count(&self) -> DomainResult<i64>;

    /// Last acknowledged pagination cursor, if any fetch has completed a page.
    fn last_cursor(&self) -> DomainResult<Option<String>>;

    /// Overwrite the single cursor row in place.
    fn record_cursor(&self, since: &str) -> DomainResult<()>;

    /// Normal-status items selected per the target policy, ordered by id.
    fn items_for_categorization(
        &self,
        target: CategorizationTarget,
    ) -> DomainResult<Vec<Item>>;

    /// Replace-by-`item_id` write of one categorization attempt.
    fn upsert_categorization(&self, record: &CategorizationRecord) -> DomainResult<()>;

    fn get_categorization(&self, item_id: i64) -> DomainResult<Option<CategorizationRecord>>;

    /// Successful records not yet pushed back to the remote service,
    /// ordered by item id.
    fn unsynced_categorizations(&self) -> DomainResult<Vec<CategorizationRecord>>;

    /// Transition `synced` to true. One-way: nothing ever reverts it.
    fn mark_synced(&self, item_id: i64) -> DomainResult<()>;
}
