// src/util/testing.rs
//! Shared helpers for unit and integration tests.

use crate::infrastructure::repositories::sqlite::repository::SqliteLibraryRepository;
use std::env;
use std::sync::OnceLock;
use tempfile::TempDir;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing once per test binary. Controlled by `RUST_LOG`,
/// silent by default.
pub fn init_test_env() {
    TRACING_INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

const GUARDED_VARS: [&str; 4] = [
    "POCKTAG_DB_URL",
    "POCKTAG_AUTH_PATH",
    "POCKTAG_CLASSIFY_URL",
    "POCKTAG_CLASSIFY_TOKEN",
];

/// Clears the process environment variables this crate reads and restores
/// their previous values on drop. Tests touching the environment must also
/// be `#[serial]`.
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        init_test_env();
        let saved = GUARDED_VARS
            .iter()
            .map(|&name| {
                let value = env::var(name).ok();
                env::remove_var(name);
                (name, value)
            })
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }
}

/// Fresh migrated database in a temp directory. The `TempDir` must be kept
/// alive for the duration of the test; the pool hands out file-backed
/// connections that all see the same data.
pub fn setup_test_db() -> (SqliteLibraryRepository, TempDir) {
    init_test_env();
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let repository = SqliteLibraryRepository::from_url(&db_path.to_string_lossy())
        .expect("failed to open test database");
    (repository, dir)
}
