// src/infrastructure/content.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::services::content_fetcher::ContentFetcher;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Hard timeout per content request.
pub const CONTENT_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of an error body ends up in the recorded error string.
const BODY_SNIPPET_CHARS: usize = 200;

/// Blocking HTTP fetcher for page content.
pub struct HttpContentFetcher {
    client: reqwest::blocking::Client,
}

impl HttpContentFetcher {
    pub fn new() -> DomainResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(CONTENT_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpContentFetcher {
    #[instrument(skip(self), level = "debug")]
    fn fetch(&self, url: &str) -> DomainResult<String> {
        Url::parse(url).map_err(|e| DomainError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DomainError::ContentFetch(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| DomainError::ContentFetch(e.to_string()))?;

        // exactly 200 counts as success; redirects are followed by the
        // client, everything else becomes a per-item error record
        if status.as_u16() != 200 {
            return Err(DomainError::ContentFetch(format!(
                "Status {} {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        debug!(chars = body.len(), "received page content");
        Ok(body)
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unparsable_url_when_fetched_then_value_level_error() {
        let fetcher = HttpContentFetcher::new().unwrap();
        let result = fetcher.fetch("not a url");
        assert!(matches!(result, Err(DomainError::InvalidUrl(_))));
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "ü".repeat(500);
        assert_eq!(snippet(&long).chars().count(), BODY_SNIPPET_CHARS);
        assert_eq!(snippet("short"), "short");
    }
}
