use std::sync::Arc;

use anyhow::Context;
use reelmeta_core::{
    MatchStrategy, MediaIdentifier, MetaCache, MetadataProvider, ReleaseParser,
    TmdbProvider,
};
use tracing::info;

use crate::models::Config;

impl Config {
    /// Builds a wired [`MediaIdentifier`]: parser with the configured word
    /// rules, the TMDB provider when a key is set, and the cache opened at
    /// `cache.path`.
    pub async fn build_identifier(&self) -> anyhow::Result<MediaIdentifier> {
        let parser = ReleaseParser::new(&self.parser)
            .context("invalid parser word rules")?;

        let provider = TmdbProvider::from_config(&self.provider)
            .context("failed to build TMDB client")?
            .map(|provider| Arc::new(provider) as Arc<dyn MetadataProvider>);
        info!(
            provider_enabled = provider.is_some(),
            language = %self.provider.language,
            cache = %self.cache.path.display(),
            "building media identifier"
        );

        let matcher = MatchStrategy::new(provider, self.matching.clone());
        let cache = Arc::new(MetaCache::open(&self.cache).await);

        Ok(MediaIdentifier::new(parser, matcher, cache)
            .with_categories(self.categories.clone())
            .with_image_base(self.provider.image_base_url.clone()))
    }
}
