//! Metadata cache: keyed provider outcomes with sliding TTL, negative
//! entries and a sampled persist pass over a `cacache` snapshot.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod key;
pub mod meta_cache;
pub mod snapshot;

pub use key::{CacheKey, CachePayload};
pub use meta_cache::{
    CacheEntry, MAX_SAMPLE_ROUNDS, MetaCache, PersistOutcome,
    RESAMPLE_THRESHOLD, SAMPLE_SIZE,
};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotEntry, SnapshotStore};

/// Default sliding validity window: seven days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaCacheConfig {
    /// Directory of the on-disk snapshot store.
    pub path: PathBuf,
    /// Sliding validity window of an entry.
    #[serde(with = "crate::duration_serde")]
    pub ttl: Duration,
    /// Drop expired entries instead of serving them unrefreshed.
    pub expire_stale: bool,
}

impl Default for MetaCacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache/meta"),
            ttl: DEFAULT_TTL,
            expire_stale: true,
        }
    }
}
