// src/application/services/categorize_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::categorization::CategorizationRecord;
use crate::domain::classifier::Classifier;
use crate::domain::error::DomainError;
use crate::domain::item::Item;
use crate::domain::repositories::library::{CategorizationTarget, LibraryRepository};
use crate::domain::services::content_fetcher::ContentFetcher;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct CategorizeOptions {
    pub target: CategorizationTarget,
    /// When set, successful page HTML is also written to this directory as
    /// `<item_id>.html`.
    pub save_html: Option<PathBuf>,
    /// Worker threads for the parallel path.
    pub workers: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CategorizeSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Categorization pass: fetch each selected item's page, classify it and
/// record the outcome. Per-item failures become error records; only
/// repository failures abort the run.
pub struct CategorizeService {
    repository: Arc<dyn LibraryRepository>,
}

impl CategorizeService {
    pub fn new(repository: Arc<dyn LibraryRepository>) -> Self {
        Self { repository }
    }

    /// One item, end to end. Never fails: every error path collapses into
    /// an error record for that item.
    fn categorize_one(
        fetcher: &dyn ContentFetcher,
        classifier: &dyn Classifier,
        item: &Item,
        save_html: Option<&Path>,
    ) -> CategorizationRecord {
        let url = match item.url() {
            Some(url) => url,
            None => return CategorizationRecord::failure(item.item_id, "item has no url"),
        };

        let html = match fetcher.fetch(url) {
            Ok(html) => html,
            Err(e) => {
                debug!(item_id = item.item_id, error = %e, "content fetch failed");
                return CategorizationRecord::failure(item.item_id, e.to_string());
            }
        };

        let started = Instant::now();
        match classifier.classify(url, &html) {
            Ok(classification) => {
                if let Some(dir) = save_html {
                    save_page(dir, item.item_id, &html);
                }
                let elapsed = started.elapsed().as_secs_f64();
                CategorizationRecord::success(item.item_id, html, classification, elapsed)
            }
            Err(e) => {
                debug!(item_id = item.item_id, error = %e, "classification failed");
                CategorizationRecord::failure(item.item_id, e.to_string())
            }
        }
    }

    /// Sequential pass, used with the local classifier where there is no
    /// remote latency to hide.
    #[instrument(skip_all, level = "debug")]
    pub fn run_sequential(
        &self,
        fetcher: &dyn ContentFetcher,
        classifier: &dyn Classifier,
        options: &CategorizeOptions,
    ) -> ApplicationResult<CategorizeSummary> {
        let items = self.repository.items_for_categorization(options.target)?;
        info!(count = items.len(), classifier = classifier.name(), "categorizing");

        let mut summary = CategorizeSummary::default();
        for item in &items {
            let record =
                Self::categorize_one(fetcher, classifier, item, options.save_html.as_deref());
            self.record_outcome(&record, &mut summary)?;
        }
        Ok(summary)
    }

    /// Parallel pass for remote classification: a fixed pool of workers
    /// claims items by index and sends finished records back over a channel;
    /// the driver thread does all database writes.
    #[instrument(skip_all, level = "debug")]
    pub fn run_parallel<F, C>(
        &self,
        fetcher: &F,
        classifier: &C,
        options: &CategorizeOptions,
    ) -> ApplicationResult<CategorizeSummary>
    where
        F: ContentFetcher + Sync,
        C: Classifier + Sync,
    {
        let items = self.repository.items_for_categorization(options.target)?;
        info!(
            count = items.len(),
            workers = options.workers,
            classifier = classifier.name(),
            "categorizing in parallel"
        );

        let workers = options.workers.max(1).min(items.len().max(1));
        let next_index = AtomicUsize::new(0);
        let save_html = options.save_html.as_deref();
        let (tx, rx) = mpsc::channel::<CategorizationRecord>();

        let mut summary = CategorizeSummary::default();
        let mut repo_error = None;

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let items = &items;
                let next_index = &next_index;
                scope.spawn(move || loop {
                    let index = next_index.fetch_add(1, Ordering::SeqCst);
                    let Some(item) = items.get(index) else {
                        break;
                    };
                    let record = Self::categorize_one(fetcher, classifier, item, save_html);
                    // a send error means the driver gave up; stop claiming work
                    if tx.send(record).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            // records arrive in completion order, which is fine: each write
            // is keyed by item_id and independent of the rest
            for record in rx {
                if let Err(e) = self.record_outcome(&record, &mut summary) {
                    repo_error = Some(e);
                    break;
                }
            }
        });

        match repo_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    fn record_outcome(
        &self,
        record: &CategorizationRecord,
        summary: &mut CategorizeSummary,
    ) -> ApplicationResult<()> {
        self.repository.upsert_categorization(record)?;
        summary.processed += 1;
        if record.is_error() {
            summary.failed += 1;
        } else {
            summary.succeeded += 1;
        }
        Ok(())
    }
}

/// Best effort: a failed dump never fails the categorization itself.
fn save_page(dir: &Path, item_id: i64, html: &str) {
    let write = || -> Result<(), DomainError> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(format!("{}.html", item_id)), html)?;
        Ok(())
    };
    if let Err(e) = write() {
        warn!(item_id, error = %e, "failed to save page html");
    }
}
