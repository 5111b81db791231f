// src/cli/commands.rs
use crate::application::services::{
    CategorizeOptions, CategorizeService, FetchOptions, FetchService, SyncBackService,
};
use crate::cli::error::{CliError, CliResult};
use crate::domain::repositories::library::{CategorizationTarget, LibraryRepository};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::repositories::sqlite::repository::SqliteLibraryRepository;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{instrument, warn};

#[instrument(skip(container), level = "debug")]
pub fn fetch(
    container: &ServiceContainer,
    all: bool,
    auth: Option<&Path>,
    silent: bool,
) -> CliResult<()> {
    let client = container.pocket_client(auth)?;

    if !silent {
        // best effort; the fetch itself does not depend on the stats call
        match client.stats() {
            Ok(total) => {
                let local = container.repository.item_count()?;
                println!("{} items in Pocket, {} already fetched", total, local);
            }
            Err(e) => warn!(error = %e, "stats lookup failed"),
        }
    }

    let options = FetchOptions {
        refetch_all: all,
        page_size: container.settings.fetch.page_size,
        page_sleep: Duration::from_secs(container.settings.fetch.sleep_secs),
        retry_sleep: Duration::from_secs(container.settings.fetch.retry_secs),
    };
    let service = FetchService::new(container.repository.clone());
    let summary = service.run(&client, &options)?;

    match summary.resumed_from {
        Some(since) => println!("Fetched {} items (resumed from {})", summary.fetched, since),
        None => println!("Fetched {} items", summary.fetched),
    }
    Ok(())
}

#[instrument(skip(container), level = "debug")]
pub fn autotag(
    container: &ServiceContainer,
    errors: bool,
    all: bool,
    categorize_url: Option<&str>,
    save_html: Option<PathBuf>,
) -> CliResult<()> {
    let target = if errors {
        CategorizationTarget::ErrorsOnly
    } else if all {
        CategorizationTarget::All
    } else {
        CategorizationTarget::New
    };
    let options = CategorizeOptions {
        target,
        save_html,
        workers: container.settings.categorize.workers,
    };

    let fetcher = container.content_fetcher()?;
    let service = CategorizeService::new(container.repository.clone());

    let summary = match container.remote_classifier(categorize_url)? {
        Some(classifier) => service.run_parallel(&fetcher, &classifier, &options)?,
        None => service.run_sequential(&fetcher, &container.lexicon_classifier(), &options)?,
    };

    println!(
        "Categorized {} items ({} ok, {} errors)",
        summary.processed, summary.succeeded, summary.failed
    );
    Ok(())
}

#[instrument(skip(container), level = "debug")]
pub fn autotag_sync(
    container: &ServiceContainer,
    num: Option<usize>,
    auth: Option<&Path>,
) -> CliResult<()> {
    let client = container.pocket_client(auth)?;
    let service = SyncBackService::new(container.repository.clone());
    let summary = service.run(&client, num)?;

    println!(
        "Synced {} of {} tags ({} failed)",
        summary.synced, summary.attempted, summary.failed
    );
    Ok(())
}

#[instrument(level = "debug")]
pub fn create_db(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::InvalidInput(format!(
            "file already exists: {}",
            path.display()
        )));
    }
    let url = path.to_string_lossy();
    SqliteLibraryRepository::from_url(&url)
        .map_err(|e| CliError::CommandFailed(format!("cannot create database: {}", e)))?;
    println!("Created database at {}", path.display());
    Ok(())
}

pub fn info(container: &ServiceContainer) -> CliResult<()> {
    let items = container.repository.item_count()?;
    let cursor = container.repository.last_cursor()?;
    println!("Database: {}", container.settings.db_url);
    println!("Items: {}", items);
    match cursor {
        Some(since) => println!("Cursor: {}", since),
        None => println!("Cursor: none (no fetch completed yet)"),
    }
    Ok(())
}
