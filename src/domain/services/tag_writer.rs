// src/domain/services/tag_writer.rs
use crate::domain::error::DomainResult;

/// Pushes a locally computed label back to the remote service as a tag.
pub trait TagWriter: Send + Sync {
    /// Add `tag` to the remote item. `Ok` means the service acknowledged
    /// the write with a success status; only then may the caller mark the
    /// local record as synced.
    fn add_tag(&self, item_id: i64, tag: &str) -> DomainResult<()>;
}
