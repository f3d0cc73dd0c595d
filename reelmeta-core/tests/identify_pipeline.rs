//! End-to-end coverage of `MediaIdentifier::identify` against a fake provider.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use reelmeta_core::matching::TMDB_IMAGE_BASE;
use reelmeta_core::{
    CacheKey, CachePayload, CategoryConfig, CategoryRule, MatchStrategy,
    MatcherConfig, MediaIdentifier, MediaKind, MetaCache, MetaCacheConfig,
    MetadataProvider, ProviderError, ReleaseParser, Resolution,
};
use reelmeta_model::{MediaDescriptor, ProviderKind, ProviderRecord, SeasonSummary};
use support::{FakeProvider, identifier, movie, show};

#[tokio::test]
async fn movie_is_resolved_merged_and_categorized() {
    let mut record = movie(157336, "Interstellar", 2014);
    record.genre_ids = vec![12, 878];
    record.rating = Some(8.456);
    record.poster_path = Some("/poster.jpg".into());
    let provider = Arc::new(FakeProvider::new().with_movie(record));

    let identifier = identifier(provider.clone()).with_categories(CategoryConfig {
        movie: vec![CategoryRule {
            name: "Science Fiction".into(),
            genre_ids: vec![878],
            ..Default::default()
        }],
        ..Default::default()
    });

    let desc = identifier
        .identify("Interstellar.2014.1080p.BluRay.x264", None, None, None)
        .await;

    let resolved = desc.resolved.as_ref().expect("resolved");
    assert_eq!(resolved.provider_id, 157336);
    assert_eq!(resolved.kind, MediaKind::Movie);
    assert_eq!(resolved.category.as_deref(), Some("Science Fiction"));
    assert_eq!(resolved.rating, Some(8.5));
    assert_eq!(
        resolved.poster_url.as_deref(),
        Some(format!("{}/poster.jpg", TMDB_IMAGE_BASE.trim_end_matches('/')).as_str())
    );
    assert_eq!(desc.resource_type.as_deref(), Some("BLURAY"));
    // Step 2 matched with the year, so nothing else was asked.
    assert_eq!(provider.searches(), 1);
}

#[tokio::test]
async fn repeated_identify_hits_the_cache() {
    let provider = Arc::new(
        FakeProvider::new().with_movie(movie(157336, "Interstellar", 2014)),
    );
    let identifier = identifier(provider.clone());

    let first = identifier
        .identify("Interstellar.2014.1080p.BluRay.x264", None, None, None)
        .await;
    let second = identifier
        .identify("Interstellar.2014.2160p.WEB-DL", None, None, None)
        .await;

    assert_eq!(first.resolved, second.resolved);
    assert_eq!(provider.searches(), 1);
}

#[tokio::test]
async fn negative_outcomes_are_cached() {
    let provider = Arc::new(FakeProvider::new());
    let identifier = identifier(provider.clone());

    let first = identifier
        .identify("Nothing.Here.2001.1080p", None, None, None)
        .await;
    let calls = provider.searches();
    // Movies then shows, with the year and then without it.
    assert_eq!(calls, 4);

    let second = identifier
        .identify("Nothing.Here.2001.720p", None, None, None)
        .await;
    assert!(!first.is_resolved());
    assert!(!second.is_resolved());
    assert_eq!(provider.searches(), calls);

    let entries = identifier.cache().entries(0, 10);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1.payload, CachePayload::NotFound);
}

#[tokio::test]
async fn unconfigured_provider_returns_parse_and_caches_nothing() {
    let identifier = MediaIdentifier::new(
        ReleaseParser::default(),
        MatchStrategy::new(None, MatcherConfig::default()),
        Arc::new(MetaCache::in_memory(&MetaCacheConfig::default())),
    );

    let desc = identifier
        .identify("Interstellar.2014.1080p", None, None, None)
        .await;

    assert_eq!(desc.en_name.as_deref(), Some("Interstellar"));
    assert!(!desc.is_resolved());
    assert!(identifier.cache().is_empty());
}

#[tokio::test]
async fn provider_failures_are_retried_not_cached() {
    let provider = Arc::new(FakeProvider::new().failing());
    let identifier = identifier(provider.clone());

    let desc = identifier
        .identify("Interstellar.2014.1080p", None, None, None)
        .await;
    assert!(!desc.is_resolved());
    assert!(identifier.cache().is_empty());

    identifier
        .identify("Interstellar.2014.1080p", None, None, None)
        .await;
    assert_eq!(provider.searches(), 2);
}

#[tokio::test]
async fn yearless_retry_is_skipped_in_strict_mode() {
    let provider = Arc::new(
        FakeProvider::new().with_movie(movie(42, "Some Film", 2010)),
    );

    let lenient = identifier(provider.clone())
        .identify("Some.Film.2011.1080p", None, None, None)
        .await;
    assert_eq!(lenient.resolved.map(|r| r.provider_id), Some(42));

    let strict = identifier(provider.clone())
        .identify("Some.Film.2011.1080p", None, None, Some(true))
        .await;
    assert!(!strict.is_resolved());
}

#[tokio::test]
async fn season_air_year_confirms_show() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_show(show(7, "Some Show", 2019))
            .with_seasons(7, &[(1, 2019), (2, 2021)]),
    );
    let identifier = identifier(provider.clone());

    let desc = identifier
        .identify("Some.Show.2021.S02E01.1080p.WEB-DL", None, None, None)
        .await;

    assert_eq!(desc.kind, MediaKind::Tv);
    assert_eq!(desc.resolved.as_ref().map(|r| r.provider_id), Some(7));
    assert_eq!(provider.show_searches.load(Ordering::SeqCst), 1);
    assert_eq!(provider.season_lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn animated_show_resolves_as_anime() {
    let mut record = show(9, "Some Show", 2021);
    record.genre_ids = vec![16];
    let provider = Arc::new(FakeProvider::new().with_show(record));

    let desc = identifier(provider)
        .identify("Some.Show.S01E03.1080p", None, None, None)
        .await;

    assert_eq!(desc.resolved.map(|r| r.kind), Some(MediaKind::Anime));
}

#[tokio::test]
async fn single_candidate_matches_by_alternate_title() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_movie(movie(157336, "星际穿越", 2014))
            .with_alternate_titles(157336, &["Interstellar"]),
    );

    let desc = identifier(provider.clone())
        .identify("Interstellar.2014.1080p", None, None, None)
        .await;

    assert_eq!(desc.resolved.map(|r| r.title), Some("星际穿越".to_string()));
    assert_eq!(provider.alternate_lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_kind_falls_back_to_other_catalogue() {
    let provider =
        Arc::new(FakeProvider::new().with_show(show(3, "Some Show", 2015)));
    let matcher = MatchStrategy::new(Some(provider.clone()), MatcherConfig::default());

    let mut desc = MediaDescriptor::new("Some Show");
    desc.en_name = Some("Some Show".into());
    desc.kind = MediaKind::Unknown;

    let resolution = matcher.resolve(&desc, None).await.unwrap();
    assert!(matches!(resolution, Resolution::Found(ref r) if r.id == 3));
    assert_eq!(provider.movie_searches.load(Ordering::SeqCst), 1);
    assert_eq!(provider.show_searches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn subtitle_supplies_season() {
    let provider = Arc::new(FakeProvider::new());
    let desc = identifier(provider)
        .identify("权力的游戏 Game of Thrones 1080p", Some("第二季 全10集"), None, None)
        .await;

    assert_eq!(desc.kind, MediaKind::Tv);
    assert_eq!(desc.begin_season, Some(2));
    assert_eq!(desc.primary_name(), Some("权力的游戏"));
}

#[tokio::test]
async fn show_without_season_tokens_falls_back_to_show_catalogue() {
    let provider =
        Arc::new(FakeProvider::new().with_show(show(87108, "Chernobyl", 2019)));

    let desc = identifier(provider.clone())
        .identify("Chernobyl.2019.1080p.WEB-DL", None, None, None)
        .await;
    assert_eq!(desc.kind, MediaKind::Movie);
    let resolved = desc.resolved.expect("show catalogue should match");
    assert_eq!(resolved.provider_id, 87108);
    assert_eq!(resolved.kind, MediaKind::Tv);
    assert_eq!(provider.movie_searches.load(Ordering::SeqCst), 1);
    assert_eq!(provider.show_searches.load(Ordering::SeqCst), 1);

    let hinted = identifier(provider)
        .identify("Chernobyl.2019.1080p.WEB-DL", None, Some(MediaKind::Unknown), None)
        .await;
    assert_eq!(hinted.kind, MediaKind::Unknown);
    assert_eq!(hinted.resolved.map(|r| r.provider_id), Some(87108));
}

#[tokio::test]
async fn series_never_fall_back_to_movies() {
    let provider =
        Arc::new(FakeProvider::new().with_movie(movie(5, "Some Show", 2020)));

    let desc = identifier(provider.clone())
        .identify("Some.Show.S01E01.1080p", None, None, None)
        .await;
    assert!(!desc.is_resolved());
    assert_eq!(provider.movie_searches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_details_do_not_abort_the_lookup() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_show(show(7, "Some Show", 2019))
            .missing_details(),
    );
    let identifier = identifier(provider.clone());

    // The season air-year check gets a 404 and the year-less search matches.
    let desc = identifier
        .identify("Some.Show.2021.S02E01.1080p.WEB-DL", None, None, None)
        .await;
    assert_eq!(desc.resolved.map(|r| r.provider_id), Some(7));
    assert_eq!(provider.season_lookups.load(Ordering::SeqCst), 1);

    let provider = Arc::new(
        FakeProvider::new()
            .with_movie(movie(157336, "星际穿越", 2014))
            .with_alternate_titles(157336, &["Interstellar"])
            .missing_details(),
    );
    let identifier = support::identifier(provider.clone());

    let desc = identifier
        .identify("Interstellar.2014.1080p", None, None, None)
        .await;
    assert!(!desc.is_resolved());
    assert!(provider.alternate_lookups.load(Ordering::SeqCst) >= 1);
    // A completed "no match" is cached, unlike a provider failure.
    let entries = identifier.cache().entries(0, 10);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1.payload, CachePayload::NotFound);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identify_shares_one_entry() {
    let provider = Arc::new(
        FakeProvider::new().with_movie(movie(157336, "Interstellar", 2014)),
    );
    let identifier = Arc::new(identifier(provider.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let identifier = identifier.clone();
            tokio::spawn(async move {
                identifier
                    .identify("Interstellar.2014.1080p.BluRay", None, None, None)
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let first = results[0].resolved.clone();
    assert_eq!(first.as_ref().map(|r| r.provider_id), Some(157336));
    assert!(results.iter().all(|desc| desc.resolved == first));
    assert_eq!(identifier.cache().len(), 1);
    assert!(provider.searches() >= 1);
}

/// Stores a competing outcome in the cache while its own search runs.
#[derive(Debug)]
struct RacingProvider {
    cache: Arc<MetaCache>,
}

#[async_trait]
impl MetadataProvider for RacingProvider {
    async fn search_movie(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let key = CacheKey::new(MediaKind::Movie, query, year, None);
        self.cache
            .put_if_absent(key, CachePayload::Found(movie(2, "Interstellar", 2014)));
        Ok(vec![movie(1, "Interstellar", 2014)])
    }

    async fn search_show(
        &self,
        _query: &str,
        _year: Option<u16>,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        Ok(Vec::new())
    }

    async fn get_show_seasons(
        &self,
        _id: u64,
    ) -> Result<Vec<SeasonSummary>, ProviderError> {
        Ok(Vec::new())
    }

    async fn get_alternate_titles(
        &self,
        _id: u64,
        _kind: ProviderKind,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn losing_writer_adopts_the_stored_outcome() {
    let cache = Arc::new(MetaCache::in_memory(&MetaCacheConfig::default()));
    let provider = Arc::new(RacingProvider {
        cache: cache.clone(),
    });
    let identifier = MediaIdentifier::new(
        ReleaseParser::default(),
        MatchStrategy::new(Some(provider), MatcherConfig::default()),
        cache.clone(),
    );

    let desc = identifier
        .identify("Interstellar.2014.1080p", None, None, None)
        .await;

    assert_eq!(desc.resolved.map(|r| r.provider_id), Some(2));
    assert_eq!(cache.len(), 1);
}
