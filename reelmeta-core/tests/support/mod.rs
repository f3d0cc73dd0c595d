#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reelmeta_core::matching::normalize_title;
use reelmeta_core::{
    MatchStrategy, MatcherConfig, MediaIdentifier, MetaCache, MetaCacheConfig,
    MetadataProvider, ProviderError, ReleaseParser,
};
use reelmeta_model::{ProviderKind, ProviderRecord, SeasonSummary};

/// In-memory provider with call counters.
///
/// Searches return every record of the catalogue whose title, original
/// title or alternate title contains the normalized query, filtered by
/// year when one is given.
#[derive(Debug, Default)]
pub struct FakeProvider {
    movies: Vec<ProviderRecord>,
    shows: Vec<ProviderRecord>,
    seasons: HashMap<u64, Vec<SeasonSummary>>,
    alternate_titles: HashMap<u64, Vec<String>>,
    failing: bool,
    missing_details: bool,
    pub movie_searches: AtomicUsize,
    pub show_searches: AtomicUsize,
    pub season_lookups: AtomicUsize,
    pub alternate_lookups: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movie(mut self, record: ProviderRecord) -> Self {
        self.movies.push(record);
        self
    }

    pub fn with_show(mut self, record: ProviderRecord) -> Self {
        self.shows.push(record);
        self
    }

    pub fn with_seasons(mut self, id: u64, seasons: &[(u32, u16)]) -> Self {
        self.seasons.insert(
            id,
            seasons
                .iter()
                .map(|&(season_number, year)| SeasonSummary {
                    season_number,
                    air_year: Some(year),
                    episode_count: None,
                })
                .collect(),
        );
        self
    }

    pub fn with_alternate_titles(mut self, id: u64, titles: &[&str]) -> Self {
        self.alternate_titles
            .insert(id, titles.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Every call fails as if the provider were rate limiting.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Season and alternate-title lookups answer 404.
    pub fn missing_details(mut self) -> Self {
        self.missing_details = true;
        self
    }

    pub fn searches(&self) -> usize {
        self.movie_searches.load(Ordering::SeqCst)
            + self.show_searches.load(Ordering::SeqCst)
    }

    fn matching(
        &self,
        records: &[ProviderRecord],
        query: &str,
        year: Option<u16>,
    ) -> Vec<ProviderRecord> {
        let query = normalize_title(query);
        records
            .iter()
            .filter(|r| year.is_none_or(|y| r.year == Some(y)))
            .filter(|r| {
                let alternates = self
                    .alternate_titles
                    .get(&r.id)
                    .into_iter()
                    .flatten()
                    .map(String::as_str);
                std::iter::once(r.title.as_str())
                    .chain(r.original_title.as_deref())
                    .chain(alternates)
                    .any(|t| normalize_title(t).contains(&query))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn search_movie(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        self.movie_searches.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ProviderError::RateLimited);
        }
        Ok(self.matching(&self.movies, query, year))
    }

    async fn search_show(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        self.show_searches.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ProviderError::RateLimited);
        }
        Ok(self.matching(&self.shows, query, year))
    }

    async fn get_show_seasons(
        &self,
        id: u64,
    ) -> Result<Vec<SeasonSummary>, ProviderError> {
        self.season_lookups.fetch_add(1, Ordering::SeqCst);
        if self.missing_details {
            return Err(ProviderError::NotFound);
        }
        Ok(self.seasons.get(&id).cloned().unwrap_or_default())
    }

    async fn get_alternate_titles(
        &self,
        id: u64,
        _kind: ProviderKind,
    ) -> Result<Vec<String>, ProviderError> {
        self.alternate_lookups.fetch_add(1, Ordering::SeqCst);
        if self.missing_details {
            return Err(ProviderError::NotFound);
        }
        Ok(self.alternate_titles.get(&id).cloned().unwrap_or_default())
    }
}

pub fn movie(id: u64, title: &str, year: u16) -> ProviderRecord {
    ProviderRecord {
        id,
        kind: ProviderKind::Movie,
        title: title.to_string(),
        year: Some(year),
        ..Default::default()
    }
}

pub fn show(id: u64, title: &str, year: u16) -> ProviderRecord {
    ProviderRecord {
        id,
        kind: ProviderKind::Show,
        title: title.to_string(),
        year: Some(year),
        ..Default::default()
    }
}

/// Identifier over `provider` with an in-memory cache.
pub fn identifier(provider: Arc<FakeProvider>) -> MediaIdentifier {
    MediaIdentifier::new(
        ReleaseParser::default(),
        MatchStrategy::new(Some(provider), MatcherConfig::default()),
        Arc::new(MetaCache::in_memory(&MetaCacheConfig::default())),
    )
}
