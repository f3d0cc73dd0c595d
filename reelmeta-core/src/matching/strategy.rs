use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reelmeta_model::{MediaDescriptor, MediaKind, ProviderKind, ProviderRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matching::provider::{MetadataProvider, ProviderError};
use crate::matching::title::{any_title_matches, titles_match};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Disables the retry without a year.
    pub strict: bool,
    /// Compare against alternate titles when exactly one candidate is left.
    pub alternate_titles: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strict: false,
            alternate_titles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ProviderRecord),
    NotFound,
}

impl From<Option<ProviderRecord>> for Resolution {
    fn from(value: Option<ProviderRecord>) -> Self {
        value.map_or(Resolution::NotFound, Resolution::Found)
    }
}

/// Ordered provider lookups for one descriptor.
///
/// Steps short-circuit on the first accepted candidate and candidates are
/// never ranked against each other:
///
/// 1. series with a year and a season: show search without year, accepting a
///    title match whose first-air year or a season's air year equals the year
/// 2. search the descriptor's catalogue by name and year
/// 3. for movies and unknown kinds, search the show catalogue
/// 4. outside strict mode, steps 2 and 3 again without the year
///
/// When no candidate title matches but exactly one candidate is left, its
/// alternate titles are compared as well.
#[derive(Debug)]
pub struct MatchStrategy {
    provider: Option<Arc<dyn MetadataProvider>>,
    config: MatcherConfig,
    warned_unconfigured: AtomicBool,
}

impl MatchStrategy {
    pub fn new(
        provider: Option<Arc<dyn MetadataProvider>>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            provider,
            config,
            warned_unconfigured: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Resolves `desc` to one provider record.
    ///
    /// `strict` overrides the configured match mode. "No match" is
    /// `Ok(Resolution::NotFound)`; only transport and auth failures are
    /// errors.
    pub async fn resolve(
        &self,
        desc: &MediaDescriptor,
        strict: Option<bool>,
    ) -> Result<Resolution, ProviderError> {
        let Some(provider) = self.provider.as_deref() else {
            if !self.warned_unconfigured.swap(true, Ordering::Relaxed) {
                warn!("metadata provider is not configured; lookups disabled");
            }
            return Ok(Resolution::NotFound);
        };
        let Some(query) = desc.primary_name() else {
            return Ok(Resolution::NotFound);
        };
        let names: Vec<&str> = desc.names().collect();
        let strict = strict.unwrap_or(self.config.strict);

        let lookup = Lookup {
            provider,
            query,
            names: &names,
            kind: desc.kind,
            season: desc.begin_season,
            alternate_titles: self.config.alternate_titles,
        };

        if let Some(record) = lookup.run(desc.year).await? {
            return Ok(Resolution::Found(record));
        }
        if desc.year.is_some() && !strict {
            debug!(query, "no match with year; retrying without it");
            return Ok(lookup.run(None).await?.into());
        }
        Ok(Resolution::NotFound)
    }
}

struct Lookup<'a> {
    provider: &'a dyn MetadataProvider,
    query: &'a str,
    names: &'a [&'a str],
    kind: MediaKind,
    season: Option<u32>,
    alternate_titles: bool,
}

impl Lookup<'_> {
    async fn run(
        &self,
        year: Option<u16>,
    ) -> Result<Option<ProviderRecord>, ProviderError> {
        if self.kind.is_series()
            && let (Some(year), Some(season)) = (year, self.season)
            && let Some(record) = self.by_season(year, season).await?
        {
            return Ok(Some(record));
        }

        let catalogue =
            self.kind.provider_kind().unwrap_or(ProviderKind::Movie);
        if let Some(record) = self.by_name(catalogue, year).await? {
            return Ok(Some(record));
        }

        // Titles without series evidence may still name a show.
        if !self.kind.is_series() {
            return self.by_name(catalogue.other(), year).await;
        }
        Ok(None)
    }

    async fn by_season(
        &self,
        year: u16,
        season: u32,
    ) -> Result<Option<ProviderRecord>, ProviderError> {
        let candidates = self.provider.search_show(self.query, None).await?;
        debug!(query = self.query, year, season, count = candidates.len(), "season-scoped show search");

        for candidate in &candidates {
            if !self.record_matches(candidate) {
                continue;
            }
            if candidate.year == Some(year)
                || self.has_season_in(candidate.id, season, year).await?
            {
                return Ok(Some(candidate.clone()));
            }
        }

        if let [only] = candidates.as_slice()
            && self.alternate_titles_match(only).await?
            && (only.year == Some(year)
                || self.has_season_in(only.id, season, year).await?)
        {
            return Ok(Some(only.clone()));
        }
        Ok(None)
    }

    async fn by_name(
        &self,
        catalogue: ProviderKind,
        year: Option<u16>,
    ) -> Result<Option<ProviderRecord>, ProviderError> {
        let candidates =
            self.provider.search(catalogue, self.query, year).await?;
        let remaining: Vec<&ProviderRecord> = candidates
            .iter()
            .filter(|c| year.is_none_or(|y| c.year == Some(y)))
            .collect();
        debug!(
            query = self.query,
            ?year,
            %catalogue,
            found = candidates.len(),
            remaining = remaining.len(),
            "name search"
        );

        if let Some(hit) = remaining.iter().find(|c| self.record_matches(c)) {
            return Ok(Some((*hit).clone()));
        }
        if let [only] = remaining.as_slice()
            && self.alternate_titles_match(only).await?
        {
            return Ok(Some((*only).clone()));
        }
        Ok(None)
    }

    fn record_matches(&self, record: &ProviderRecord) -> bool {
        any_title_matches(
            self.names,
            std::iter::once(record.title.as_str())
                .chain(record.original_title.as_deref()),
        )
    }

    async fn alternate_titles_match(
        &self,
        record: &ProviderRecord,
    ) -> Result<bool, ProviderError> {
        if !self.alternate_titles {
            return Ok(false);
        }
        let titles = or_empty(
            self.provider
                .get_alternate_titles(record.id, record.kind)
                .await,
        )?;
        Ok(titles.iter().any(|title| {
            self.names.iter().any(|name| titles_match(name, title))
        }))
    }

    async fn has_season_in(
        &self,
        id: u64,
        season: u32,
        year: u16,
    ) -> Result<bool, ProviderError> {
        let seasons = or_empty(self.provider.get_show_seasons(id).await)?;
        Ok(seasons
            .iter()
            .any(|s| s.season_number == season && s.air_year == Some(year)))
    }
}

/// Detail lookups that 404 carry no data; the remaining steps still run.
fn or_empty<T>(
    result: Result<Vec<T>, ProviderError>,
) -> Result<Vec<T>, ProviderError> {
    match result {
        Err(ProviderError::NotFound) => {
            debug!("detail lookup returned not found");
            Ok(Vec::new())
        }
        other => other,
    }
}
