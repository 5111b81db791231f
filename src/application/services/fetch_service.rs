// src/application/services/fetch_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::item::NormalizedRecord;
use crate::domain::pagination::{ItemStream, PageSource};
use crate::domain::repositories::library::LibraryRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Ignore the stored cursor and walk the whole library again.
    pub refetch_all: bool,
    pub page_size: u64,
    pub page_sleep: Duration,
    pub retry_sleep: Duration,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub resumed_from: Option<String>,
}

/// Incremental pull: streams pages from the remote service and upserts each
/// normalized record. The cursor is persisted as pages arrive, so an
/// interrupted run resumes from the last completed page.
pub struct FetchService {
    repository: Arc<dyn LibraryRepository>,
}

impl FetchService {
    pub fn new(repository: Arc<dyn LibraryRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, source), level = "debug")]
    pub fn run(
        &self,
        source: &dyn PageSource,
        options: &FetchOptions,
    ) -> ApplicationResult<FetchSummary> {
        let since = if options.refetch_all {
            None
        } else {
            self.repository.last_cursor()?
        };
        debug!(?since, refetch_all = options.refetch_all, "starting fetch");

        let repository = Arc::clone(&self.repository);
        let stream = ItemStream::new(
            source,
            since.clone(),
            options.page_size,
            options.page_sleep,
            options.retry_sleep,
            Box::new(move |cursor| repository.record_cursor(cursor)),
        );

        let mut fetched = 0usize;
        for raw in stream {
            let raw = raw?;
            let record = NormalizedRecord::from_raw(&raw)?;
            self.repository.upsert_record(&record)?;
            fetched += 1;
        }

        info!(fetched, "fetch complete");
        Ok(FetchSummary {
            fetched,
            resumed_from: since,
        })
    }
}
