// src/infrastructure/di/service_container.rs
use crate::config::Settings;
use crate::domain::credentials::Credentials;
use crate::domain::error::{DomainError, DomainResult};
use crate::infrastructure::classifiers::{LexiconClassifier, RemoteClassifier};
use crate::infrastructure::content::HttpContentFetcher;
use crate::infrastructure::pocket::PocketClient;
use crate::infrastructure::repositories::sqlite::repository::SqliteLibraryRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Central wiring point: owns the repository and knows how to construct the
/// outbound adapters from settings.
pub struct ServiceContainer {
    pub settings: Settings,
    pub repository: Arc<SqliteLibraryRepository>,
}

impl ServiceContainer {
    #[instrument(skip(settings), level = "debug")]
    pub fn new(settings: Settings) -> DomainResult<Self> {
        debug!(db_url = %settings.db_url, "initializing service container");
        let repository = Arc::new(
            SqliteLibraryRepository::from_url(&settings.db_url)
                .map_err(|e| DomainError::RepositoryError(e.to_string()))?,
        );
        Ok(Self {
            settings,
            repository,
        })
    }

    /// Pocket API client, authenticated from the auth file. An explicit
    /// path beats the configured one.
    pub fn pocket_client(&self, auth_override: Option<&Path>) -> DomainResult<PocketClient> {
        let path = auth_override.unwrap_or_else(|| Path::new(&self.settings.auth_path));
        let credentials = Credentials::from_file(path)?;
        PocketClient::new(credentials)
    }

    pub fn content_fetcher(&self) -> DomainResult<HttpContentFetcher> {
        HttpContentFetcher::new()
    }

    /// Remote classifier if an endpoint is configured (flag beats config),
    /// otherwise `None` and the caller falls back to the local lexicon.
    pub fn remote_classifier(
        &self,
        url_override: Option<&str>,
    ) -> DomainResult<Option<RemoteClassifier>> {
        let url = url_override
            .map(ToString::to_string)
            .or_else(|| self.settings.categorize.remote_url.clone());
        match url {
            Some(url) => {
                let classifier =
                    RemoteClassifier::new(url, self.settings.categorize.remote_token.clone())?;
                Ok(Some(classifier))
            }
            None => Ok(None),
        }
    }

    pub fn lexicon_classifier(&self) -> LexiconClassifier {
        LexiconClassifier::new()
    }
}
