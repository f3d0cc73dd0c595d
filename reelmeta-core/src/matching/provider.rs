use async_trait::async_trait;
use reelmeta_model::{ProviderKind, ProviderRecord, SeasonSummary};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Not found")]
    NotFound,
    #[error("Rate limited")]
    RateLimited,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Query surface of an external movie/show database.
///
/// Implementations make one best-effort call per method and do not retry.
#[async_trait]
pub trait MetadataProvider: Send + Sync + std::fmt::Debug {
    async fn search_movie(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError>;

    async fn search_show(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError>;

    async fn get_show_seasons(
        &self,
        id: u64,
    ) -> Result<Vec<SeasonSummary>, ProviderError>;

    /// Alternate and translated titles of one record.
    async fn get_alternate_titles(
        &self,
        id: u64,
        kind: ProviderKind,
    ) -> Result<Vec<String>, ProviderError>;

    async fn search(
        &self,
        kind: ProviderKind,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        match kind {
            ProviderKind::Movie => self.search_movie(query, year).await,
            ProviderKind::Show => self.search_show(query, year).await,
        }
    }
}
