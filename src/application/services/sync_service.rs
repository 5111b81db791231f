// src/application/services/sync_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::repositories::library::LibraryRepository;
use crate::domain::services::tag_writer::TagWriter;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const TAG_PREFIX: &str = "autotag-";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
}

/// Pushes top categories back to the remote service as tags. A record only
/// flips to synced once the write is acknowledged; a failed write leaves it
/// pending for the next run.
pub struct SyncBackService {
    repository: Arc<dyn LibraryRepository>,
}

impl SyncBackService {
    pub fn new(repository: Arc<dyn LibraryRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, writer), level = "debug")]
    pub fn run(
        &self,
        writer: &dyn TagWriter,
        limit: Option<usize>,
    ) -> ApplicationResult<SyncSummary> {
        let pending = self.repository.unsynced_categorizations()?;
        info!(pending = pending.len(), ?limit, "syncing tags back");

        let mut summary = SyncSummary::default();
        for record in &pending {
            if let Some(limit) = limit {
                if summary.attempted >= limit {
                    break;
                }
            }

            // a successful record with no top category has nothing to push;
            // mark it synced so it stops showing up as pending
            let Some(top) = record.top_category.as_deref() else {
                debug!(item_id = record.item_id, "no top category, marking synced");
                self.repository.mark_synced(record.item_id)?;
                continue;
            };

            let tag = format!("{}{}", TAG_PREFIX, top.to_lowercase());
            summary.attempted += 1;
            match writer.add_tag(record.item_id, &tag) {
                Ok(()) => {
                    self.repository.mark_synced(record.item_id)?;
                    summary.synced += 1;
                }
                Err(e) => {
                    warn!(item_id = record.item_id, error = %e, "tag write failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            attempted = summary.attempted,
            synced = summary.synced,
            failed = summary.failed,
            "sync complete"
        );
        Ok(summary)
    }
}
