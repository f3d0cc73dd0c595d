//! # Reelmeta Core
//!
//! Turns human-authored release titles (torrent names, media file names)
//! into structured descriptors and resolves them against a metadata
//! provider, caching every outcome.
//!
//! ## Overview
//!
//! - **Parsing**: a tokenizer plus a classifier fold for movie/TV titles and
//!   a bracket-oriented variant for fansub anime releases
//! - **Matching**: ordered, short-circuiting provider lookups with
//!   normalized title comparison
//! - **Caching**: sliding-TTL cache with negative entries and a versioned
//!   on-disk snapshot
//! - **Pipeline**: [`MediaIdentifier::identify`] wires the three together
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reelmeta_core::{
//!     MatchStrategy, MatcherConfig, MediaIdentifier, MetaCache,
//!     MetaCacheConfig, ReleaseParser,
//! };
//!
//! # async fn run() {
//! let identifier = MediaIdentifier::new(
//!     ReleaseParser::default(),
//!     MatchStrategy::new(None, MatcherConfig::default()),
//!     Arc::new(MetaCache::in_memory(&MetaCacheConfig::default())),
//! );
//! let desc = identifier
//!     .identify("Interstellar.2014.1080p.BluRay.x264", None, None, None)
//!     .await;
//! assert_eq!(desc.year, Some(2014));
//! # }
//! ```

#![allow(missing_docs)]

/// Metadata cache and its on-disk snapshot
pub mod cache;

/// Secondary category rules
pub mod category;

pub mod duration_serde;

/// Error types
pub mod error;

/// The identify pipeline
pub mod identify;

/// Provider abstraction, TMDB adapter and match strategy
pub mod matching;

/// Release-title parsers
pub mod parser;

pub use cache::{CacheKey, CachePayload, MetaCache, MetaCacheConfig, PersistOutcome};
pub use category::{CategoryConfig, CategoryRule};
pub use error::{IdentifyError, Result};
pub use identify::MediaIdentifier;
pub use matching::{
    MatchStrategy, MatcherConfig, MetadataProvider, ProviderError, Resolution,
    TmdbConfig, TmdbProvider,
};
pub use parser::{ReleaseParser, WordRules};

pub use reelmeta_model::{
    MediaDescriptor, MediaKind, ProviderKind, ProviderRecord, ResolvedMedia,
    SeasonSummary,
};
