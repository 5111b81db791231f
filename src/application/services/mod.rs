pub mod categorize_service;
pub mod fetch_service;
pub mod sync_service;

pub use categorize_service::{CategorizeOptions, CategorizeService, CategorizeSummary};
pub use fetch_service::{FetchOptions, FetchService, FetchSummary};
pub use sync_service::{SyncBackService, SyncSummary};
