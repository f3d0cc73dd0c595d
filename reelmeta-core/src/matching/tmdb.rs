use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reelmeta_model::{ProviderKind, ProviderRecord, SeasonSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::matching::provider::{MetadataProvider, ProviderError};
use crate::matching::tmdb_wire::{
    DetailsQuery, MovieItem, MovieSearchQuery, SearchPage, ShowDetails,
    ShowSearchQuery, TitleVariants, TvItem,
};

pub const TMDB_V3_BASE: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

static DEFAULT_BASE_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse(TMDB_V3_BASE).expect("default TMDB base URL should parse")
});

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// Leaving this unset disables provider lookups entirely.
    pub api_key: Option<String>,
    pub language: String,
    pub base_url: Url,
    /// Prefix joined with poster and backdrop paths.
    pub image_base_url: String,
    #[serde(with = "crate::duration_serde")]
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "zh-CN".to_string(),
            base_url: DEFAULT_BASE_URL.clone(),
            image_base_url: TMDB_IMAGE_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl TmdbConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// TMDB v3 implementation of [`MetadataProvider`].
pub struct TmdbProvider {
    http: reqwest::Client,
    api_key: String,
    language: String,
    base: String,
}

impl fmt::Debug for TmdbProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbProvider")
            .field("base", &self.base)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TmdbProvider {
    /// Builds a provider, or `Ok(None)` when no API key is configured.
    pub fn from_config(
        config: &TmdbConfig,
    ) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = config.api_key.clone().filter(|_| config.has_api_key())
        else {
            return Ok(None);
        };
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Some(Self {
            http,
            api_key,
            language: config.language.clone(),
            base: config.base_url.as_str().trim_end_matches('/').to_string(),
        }))
    }

    fn language(&self) -> Option<&str> {
        Some(self.language.as_str()).filter(|l| !l.is_empty())
    }

    async fn get_tmdb_json<Q, T>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ProviderError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::ParseError(e.to_string()));
        }

        #[derive(Debug, Deserialize)]
        struct TmdbErrorBody {
            #[serde(default)]
            status_message: Option<String>,
        }

        let message = response
            .json::<TmdbErrorBody>()
            .await
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| {
                format!("TMDB request failed with status {}", status)
            });

        match status.as_u16() {
            401 => Err(ProviderError::InvalidApiKey),
            404 => Err(ProviderError::NotFound),
            429 => Err(ProviderError::RateLimited),
            _ => Err(ProviderError::ApiError(message)),
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movie(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let params = MovieSearchQuery {
            api_key: &self.api_key,
            query,
            include_adult: false,
            year,
            language: self.language(),
        };
        let page: SearchPage<MovieItem> =
            self.get_tmdb_json("/search/movie", &params).await?;
        Ok(page.results.into_iter().map(ProviderRecord::from).collect())
    }

    async fn search_show(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let params = ShowSearchQuery {
            api_key: &self.api_key,
            query,
            include_adult: false,
            first_air_date_year: year,
            language: self.language(),
        };
        let page: SearchPage<TvItem> =
            self.get_tmdb_json("/search/tv", &params).await?;
        Ok(page.results.into_iter().map(ProviderRecord::from).collect())
    }

    async fn get_show_seasons(
        &self,
        id: u64,
    ) -> Result<Vec<SeasonSummary>, ProviderError> {
        let params = DetailsQuery {
            api_key: &self.api_key,
            language: self.language(),
            append_to_response: None,
        };
        let details: ShowDetails =
            self.get_tmdb_json(&format!("/tv/{id}"), &params).await?;
        Ok(details.seasons.into_iter().map(SeasonSummary::from).collect())
    }

    async fn get_alternate_titles(
        &self,
        id: u64,
        kind: ProviderKind,
    ) -> Result<Vec<String>, ProviderError> {
        let params = DetailsQuery {
            api_key: &self.api_key,
            language: self.language(),
            append_to_response: Some("alternative_titles,translations"),
        };
        let variants: TitleVariants = self
            .get_tmdb_json(&format!("/{}/{id}", kind.as_path()), &params)
            .await?;
        Ok(variants.into_titles())
    }
}
