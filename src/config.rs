// src/config.rs
use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const CONFIG_TEMPLATE: &str = r#"# pocktag configuration

# Path to the SQLite database.
# Default: ~/.config/pocktag/pocktag.db
# db_url = "/path/to/pocktag.db"

# Path to the Pocket auth file (consumer key + access token).
# Default: ~/.config/pocktag/auth.json
# auth_path = "/path/to/auth.json"

[fetch]
# Items requested per page.
page_size = 500
# Seconds to pause between page requests.
sleep_secs = 2
# Base seconds for the linear 503 backoff.
retry_secs = 3

[categorize]
# Worker threads for the remote classifier.
workers = 6
# Remote categorization endpoint; leave unset to use the built-in
# lexicon classifier.
# remote_url = "https://example.com/classify"
# remote_token = "secret"
"#;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchSettings {
    pub page_size: u64,
    pub sleep_secs: u64,
    pub retry_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: 500,
            sleep_secs: 2,
            retry_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategorizeSettings {
    pub workers: usize,
    pub remote_url: Option<String>,
    pub remote_token: Option<String>,
}

impl Default for CategorizeSettings {
    fn default() -> Self {
        Self {
            workers: 6,
            remote_url: None,
            remote_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub db_url: String,
    pub auth_path: String,
    pub fetch: FetchSettings,
    pub categorize: CategorizeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let base = config_dir();
        Self {
            db_url: base.join("pocktag.db").to_string_lossy().to_string(),
            auth_path: base.join("auth.json").to_string_lossy().to_string(),
            fetch: FetchSettings::default(),
            categorize: CategorizeSettings::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pocktag")
}

fn default_config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load settings with the usual precedence: defaults, then the TOML file
/// (explicit path or `~/.config/pocktag/config.toml`), then `POCKTAG_*`
/// environment variables.
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    let path = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_file);

    let mut settings = if path.exists() {
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| {
            DomainError::DeserializationError(format!(
                "invalid config file {}: {}",
                path.display(),
                e
            ))
        })?
    } else if config_file.is_some() {
        return Err(DomainError::Validation(format!(
            "config file not found: {}",
            path.display()
        )));
    } else {
        Settings::default()
    };

    if let Ok(db_url) = env::var("POCKTAG_DB_URL") {
        settings.db_url = expand_path(&db_url);
    } else {
        settings.db_url = expand_path(&settings.db_url);
    }
    if let Ok(auth_path) = env::var("POCKTAG_AUTH_PATH") {
        settings.auth_path = expand_path(&auth_path);
    } else {
        settings.auth_path = expand_path(&settings.auth_path);
    }
    if let Ok(url) = env::var("POCKTAG_CLASSIFY_URL") {
        settings.categorize.remote_url = Some(url);
    }
    if let Ok(token) = env::var("POCKTAG_CLASSIFY_TOKEN") {
        settings.categorize.remote_token = Some(token);
    }

    Ok(settings)
}

fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

/// Write a commented default config to `~/.config/pocktag/config.toml`.
/// Refuses to overwrite an existing file.
pub fn generate_default_config() -> DomainResult<PathBuf> {
    let path = default_config_file();
    if path.exists() {
        return Err(DomainError::Validation(format!(
            "config file already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, CONFIG_TEMPLATE)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::EnvGuard;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn given_no_file_when_loaded_then_defaults_apply() {
        let _guard = EnvGuard::new();
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.fetch.page_size, 500);
        assert_eq!(settings.fetch.sleep_secs, 2);
        assert_eq!(settings.fetch.retry_secs, 3);
        assert_eq!(settings.categorize.workers, 6);
        assert!(settings.db_url.ends_with("pocktag.db"));
    }

    #[test]
    #[serial]
    fn given_config_file_when_loaded_then_values_override_defaults() {
        let _guard = EnvGuard::new();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "db_url = \"/tmp/test.db\"\n[fetch]\npage_size = 10\n[categorize]\nworkers = 2"
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.db_url, "/tmp/test.db");
        assert_eq!(settings.fetch.page_size, 10);
        assert_eq!(settings.fetch.sleep_secs, 2);
        assert_eq!(settings.categorize.workers, 2);
    }

    #[test]
    #[serial]
    fn given_env_vars_when_loaded_then_they_win() {
        let _guard = EnvGuard::new();
        std::env::set_var("POCKTAG_DB_URL", "/tmp/env.db");
        std::env::set_var("POCKTAG_CLASSIFY_URL", "https://example.com/classify");
        std::env::set_var("POCKTAG_CLASSIFY_TOKEN", "sekrit");

        let settings = load_settings(None).unwrap();
        assert_eq!(settings.db_url, "/tmp/env.db");
        assert_eq!(
            settings.categorize.remote_url.as_deref(),
            Some("https://example.com/classify")
        );
        assert_eq!(settings.categorize.remote_token.as_deref(), Some("sekrit"));
    }

    #[test]
    #[serial]
    fn given_explicit_missing_file_when_loaded_then_error() {
        let _guard = EnvGuard::new();
        let result = load_settings(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    #[serial]
    fn given_tilde_db_url_when_loaded_then_expanded() {
        let _guard = EnvGuard::new();
        std::env::set_var("POCKTAG_DB_URL", "~/pocktag.db");
        let settings = load_settings(None).unwrap();
        assert!(!settings.db_url.starts_with('~'));
    }
}
