//! The `identify` pipeline: parse, consult the cache, resolve, merge.

use std::sync::Arc;

use reelmeta_model::{MediaDescriptor, MediaKind};
use tracing::{Instrument, debug, warn};

use crate::cache::{CacheKey, CachePayload, MetaCache, PersistOutcome};
use crate::category::CategoryConfig;
use crate::error::Result;
use crate::matching::{MatchStrategy, Resolution, TMDB_IMAGE_BASE};
use crate::parser::ReleaseParser;

impl From<Resolution> for CachePayload {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::Found(record) => CachePayload::Found(record),
            Resolution::NotFound => CachePayload::NotFound,
        }
    }
}

/// Entry point for downstream consumers.
///
/// All collaborators are injected; share one instance behind an `Arc`.
#[derive(Debug)]
pub struct MediaIdentifier {
    parser: ReleaseParser,
    matcher: MatchStrategy,
    cache: Arc<MetaCache>,
    categories: CategoryConfig,
    image_base: String,
}

impl MediaIdentifier {
    pub fn new(
        parser: ReleaseParser,
        matcher: MatchStrategy,
        cache: Arc<MetaCache>,
    ) -> Self {
        Self {
            parser,
            matcher,
            cache,
            categories: CategoryConfig::default(),
            image_base: TMDB_IMAGE_BASE.to_string(),
        }
    }

    pub fn with_categories(mut self, categories: CategoryConfig) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_image_base(mut self, image_base: impl Into<String>) -> Self {
        self.image_base = image_base.into();
        self
    }

    pub fn cache(&self) -> &Arc<MetaCache> {
        &self.cache
    }

    pub fn matcher(&self) -> &MatchStrategy {
        &self.matcher
    }

    /// Parses without touching the cache or the provider.
    pub fn parse_only(
        &self,
        raw: &str,
        subtitle: Option<&str>,
        hint: Option<MediaKind>,
    ) -> MediaDescriptor {
        self.parser.parse(raw, subtitle, hint)
    }

    /// Parses `raw` and resolves it against the cache or the provider.
    ///
    /// Always returns a descriptor; provider fields stay empty when nothing
    /// matched or the provider failed. Provider failures are logged and
    /// not cached, so the next call retries.
    pub async fn identify(
        &self,
        raw: &str,
        subtitle: Option<&str>,
        hint: Option<MediaKind>,
        strict: Option<bool>,
    ) -> MediaDescriptor {
        let span = tracing::debug_span!("identify", raw);
        async move {
            let mut desc = self.parse_only(raw, subtitle, hint);
            let Some(key) = CacheKey::for_descriptor(&desc) else {
                debug!(target: "identify", "title has no usable name; skipping lookup");
                return desc;
            };

            let payload = match self.cache.get(&key) {
                Some(payload) => {
                    debug!(target: "identify", %key, found = payload.is_found(), "cache hit");
                    payload
                }
                None => match self.lookup(&desc, key, strict).await {
                    Some(payload) => payload,
                    None => return desc,
                },
            };

            if let CachePayload::Found(record) = &payload
                && desc.merge(record, None, &self.image_base)
                && let Some(resolved) = desc.resolved.as_mut()
            {
                resolved.category = self.categories.classify(resolved.kind, record);
            }
            desc
        }
        .instrument(span)
        .await
    }

    /// Resolves a cache miss. Returns `None` when the outcome must not be
    /// cached.
    async fn lookup(
        &self,
        desc: &MediaDescriptor,
        key: CacheKey,
        strict: Option<bool>,
    ) -> Option<CachePayload> {
        let resolution = match self.matcher.resolve(desc, strict).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(target: "identify", error = %e, %key, "provider lookup failed");
                return None;
            }
        };
        if !self.matcher.is_enabled() {
            return None;
        }

        let payload = CachePayload::from(resolution);
        debug!(target: "identify", %key, found = payload.is_found(), "resolved from provider");
        if self.cache.put_if_absent(key.clone(), payload.clone()) {
            Some(payload)
        } else {
            // A concurrent caller stored first; use its outcome.
            Some(self.cache.get(&key).unwrap_or(payload))
        }
    }

    /// Persists the cache snapshot. See [`MetaCache::persist`].
    pub async fn persist(&self, force: bool) -> Result<PersistOutcome> {
        self.cache.persist(force).await
    }
}
