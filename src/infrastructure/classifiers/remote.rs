// src/infrastructure/classifiers/remote.rs
use crate::domain::categorization::{CategoryScores, Classification};
use crate::domain::classifier::Classifier;
use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Remote calls include model inference; allow well more than a page fetch.
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(60);

const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    url: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    scores: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    embeddings: Vec<f32>,
}

/// Classifier backed by an external categorization service. Sends the page
/// URL and HTML, receives per-category scores and an embedding vector.
pub struct RemoteClassifier {
    http: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl RemoteClassifier {
    pub fn new(url: impl Into<String>, token: Option<String>) -> DomainResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(CLASSIFY_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: url.into(),
            token,
        })
    }
}

impl Classifier for RemoteClassifier {
    #[instrument(skip(self, html), level = "debug")]
    fn classify(&self, url: &str, html: &str) -> DomainResult<Classification> {
        let mut request = self.http.post(&self.url).json(&ClassifyRequest { url, html });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| DomainError::Classification(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let snippet: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
            return Err(DomainError::Classification(format!(
                "Status {} {}",
                status.as_u16(),
                snippet
            )));
        }

        let payload: ClassifyResponse = response
            .json()
            .map_err(|e| DomainError::Classification(format!("invalid response: {}", e)))?;
        let scores = CategoryScores::from_json_map(&payload.scores)?;
        Ok(Classification {
            scores,
            embeddings: payload.embeddings,
        })
    }

    fn name(&self) -> &str {
        "remote"
    }
}
