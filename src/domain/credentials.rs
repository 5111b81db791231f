// src/domain/credentials.rs
use crate::domain::error::{DomainError, DomainResult};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Pocket API credentials, read from a JSON mapping of named strings.
/// How the file gets written (the OAuth handshake) is not this crate's concern.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "pocket_consumer_key")]
    pub consumer_key: String,

    #[serde(rename = "pocket_access_token")]
    pub access_token: String,

    #[serde(rename = "pocket_username", default)]
    pub username: Option<String>,
}

impl Credentials {
    pub fn from_file(path: &Path) -> DomainResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::InvalidCredentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DomainError::InvalidCredentials(format!("malformed {}: {}", path.display(), e))
        })
    }
}

// keep the access token out of debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_file_reads_named_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(
            &path,
            r#"{"pocket_consumer_key": "ck", "pocket_access_token": "at", "pocket_username": "u"}"#,
        )
        .unwrap();

        let credentials = Credentials::from_file(&path).unwrap();
        assert_eq!(credentials.consumer_key, "ck");
        assert_eq!(credentials.access_token, "at");
        assert_eq!(credentials.username.as_deref(), Some("u"));
    }

    #[test]
    fn test_from_file_malformed_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "{not json").unwrap();

        let result = Credentials::from_file(&path);
        assert!(matches!(result, Err(DomainError::InvalidCredentials(_))));
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let credentials = Credentials {
            consumer_key: "ck".to_string(),
            access_token: "secret".to_string(),
            username: None,
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("secret"));
    }
}
