use std::collections::{HashMap, HashSet, hash_map::Entry};
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::IteratorRandom;
use tracing::{debug, info, warn};

use crate::cache::key::{CacheKey, CachePayload};
use crate::cache::snapshot::{
    Snapshot, SnapshotEntry, SnapshotRoot, SnapshotStore,
};
use crate::cache::MetaCacheConfig;
use crate::error::Result;

/// Caches smaller than this are inspected in full on persist.
pub const SAMPLE_SIZE: usize = 25;

/// Stale hits in one sample that trigger another sampling round.
pub const RESAMPLE_THRESHOLD: usize = 5;

/// Upper bound on sampling rounds per persist, so at most
/// `MAX_SAMPLE_ROUNDS * SAMPLE_SIZE` entries are inspected.
pub const MAX_SAMPLE_ROUNDS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: CachePayload,
    /// Unix timestamp in seconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing changed since the last snapshot.
    Skipped,
    /// The cache has no snapshot store.
    InMemory,
    Written { entries: usize, bytes: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SampleReport {
    rounds: usize,
    inspected: usize,
    stale_positive: usize,
    evicted: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Positive keys present in the last written snapshot.
    persisted_keys: HashSet<CacheKey>,
}

/// Process-wide key/payload store with sliding TTL and negative caching.
///
/// Every operation takes one coarse lock over the whole map. Construct one
/// instance and share it behind an `Arc`.
#[derive(Debug)]
pub struct MetaCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    expire_stale: bool,
    store: Option<SnapshotStore>,
}

impl MetaCache {
    /// Cache without durable storage.
    pub fn in_memory(config: &MetaCacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl: config.ttl,
            expire_stale: config.expire_stale,
            store: None,
        }
    }

    /// Opens the cache at `config.path`, loading any existing snapshot.
    ///
    /// A missing or unreadable snapshot yields an empty cache.
    pub async fn open(config: &MetaCacheConfig) -> Self {
        let store =
            SnapshotStore::new(SnapshotRoot::new(config.path.clone()));
        let mut cache = Self::in_memory(config);

        match store.load().await {
            Ok(Some(snapshot)) => {
                let count = snapshot.entries.len();
                cache.restore(snapshot);
                info!(entries = count, path = ?store.root(), "loaded metadata cache snapshot");
            }
            Ok(None) => {
                debug!(path = ?store.root(), "no metadata cache snapshot yet");
            }
            Err(e) => {
                warn!(error = %e, path = ?store.root(), "discarding unreadable metadata cache snapshot");
            }
        }

        cache.store = Some(store);
        cache
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let state = self.state.get_mut();
        for entry in snapshot.entries {
            state.persisted_keys.insert(entry.key.clone());
            state.entries.insert(
                entry.key,
                CacheEntry {
                    payload: CachePayload::Found(entry.record),
                    expires_at: entry.expires_at,
                },
            );
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up `key`, sliding its expiry forward on a live hit.
    ///
    /// Expired entries are dropped when `expire_stale` is set and returned
    /// unrefreshed otherwise.
    pub fn get(&self, key: &CacheKey) -> Option<CachePayload> {
        let now = unix_now();
        let mut state = self.state.lock();

        let entry = state.entries.get_mut(key)?;
        if entry.expires_at > now {
            entry.expires_at = self.expiry_from(now);
            return Some(entry.payload.clone());
        }
        if !self.expire_stale {
            return Some(entry.payload.clone());
        }

        state.entries.remove(key);
        debug!(key = %key, "dropped expired cache entry");
        None
    }

    /// Inserts unless `key` is already present. Returns whether it inserted.
    pub fn put_if_absent(&self, key: CacheKey, payload: CachePayload) -> bool {
        let expires_at = self.expiry_from(unix_now());
        let mut state = self.state.lock();
        match state.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry {
                    payload,
                    expires_at,
                });
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn delete(&self, key: &CacheKey) -> Option<CachePayload> {
        self.state.lock().entries.remove(key).map(|e| e.payload)
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Removes every key resolved to provider record `id`.
    pub fn delete_by_provider_id(&self, id: u64) -> usize {
        self.retain(|entry| {
            entry.payload.record().is_none_or(|record| record.id != id)
        })
    }

    /// Forgets every negative entry so those titles are retried.
    pub fn delete_negative(&self) -> usize {
        self.retain(|entry| entry.payload.is_found())
    }

    fn retain(&self, mut keep: impl FnMut(&CacheEntry) -> bool) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| keep(entry));
        before - state.entries.len()
    }

    /// Page of entries ordered by key.
    pub fn entries(
        &self,
        offset: usize,
        limit: usize,
    ) -> Vec<(CacheKey, CacheEntry)> {
        let state = self.state.lock();
        let mut all: Vec<_> = state
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        drop(state);
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all.into_iter().skip(offset).take(limit).collect()
    }

    /// Writes positive entries to the snapshot store when something changed.
    ///
    /// Staleness is detected by sampling rather than a full scan; see
    /// [`SAMPLE_SIZE`], [`RESAMPLE_THRESHOLD`] and [`MAX_SAMPLE_ROUNDS`].
    pub async fn persist(&self, force: bool) -> Result<PersistOutcome> {
        let Some(store) = &self.store else {
            return Ok(PersistOutcome::InMemory);
        };

        let now = unix_now();
        let (snapshot, keys) = {
            let mut state = self.state.lock();
            let report = self.sample_stale(&mut state, now);
            debug!(
                rounds = report.rounds,
                inspected = report.inspected,
                evicted = report.evicted,
                "sampled metadata cache for staleness"
            );

            let keys: HashSet<CacheKey> = state
                .entries
                .iter()
                .filter(|(_, e)| e.payload.is_found())
                .map(|(k, _)| k.clone())
                .collect();
            if !force
                && report.stale_positive == 0
                && keys == state.persisted_keys
            {
                return Ok(PersistOutcome::Skipped);
            }

            let entries = state
                .entries
                .iter()
                .filter_map(|(key, entry)| {
                    entry.payload.record().map(|record| SnapshotEntry {
                        key: key.clone(),
                        record: record.clone(),
                        expires_at: entry.expires_at,
                    })
                })
                .collect();
            (Snapshot::new(now, entries), keys)
        };

        let stored = store.save(&snapshot).await?;
        let written = snapshot.entries.len();
        self.state.lock().persisted_keys = keys;
        info!(
            entries = written,
            bytes = stored.byte_len,
            "persisted metadata cache snapshot"
        );
        Ok(PersistOutcome::Written {
            entries: written,
            bytes: stored.byte_len,
        })
    }

    fn sample_stale(&self, state: &mut CacheState, now: i64) -> SampleReport {
        let mut rng = rand::rng();
        let mut report = SampleReport::default();

        while report.rounds < MAX_SAMPLE_ROUNDS {
            report.rounds += 1;
            let full_scan = state.entries.len() < SAMPLE_SIZE;
            let sample: Vec<CacheKey> = if full_scan {
                state.entries.keys().cloned().collect()
            } else {
                state
                    .entries
                    .keys()
                    .choose_multiple(&mut rng, SAMPLE_SIZE)
                    .into_iter()
                    .cloned()
                    .collect()
            };
            report.inspected += sample.len();

            let mut stale = 0;
            for key in sample {
                let Some(entry) = state.entries.get(&key) else {
                    continue;
                };
                if entry.expires_at > now {
                    continue;
                }
                stale += 1;
                if entry.payload.is_found() {
                    report.stale_positive += 1;
                }
                if self.expire_stale {
                    state.entries.remove(&key);
                    report.evicted += 1;
                }
            }

            // Without eviction a re-sample would only find the same entries.
            if full_scan || stale < RESAMPLE_THRESHOLD || !self.expire_stale {
                break;
            }
        }
        report
    }

    fn expiry_from(&self, now: i64) -> i64 {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        now.saturating_add(ttl)
    }

    #[cfg(test)]
    fn insert_with_expiry(
        &self,
        key: CacheKey,
        payload: CachePayload,
        expires_at: i64,
    ) {
        self.state.lock().entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at,
            },
        );
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelmeta_model::{MediaKind, ProviderKind, ProviderRecord};
    use std::path::PathBuf;

    fn config(expire_stale: bool) -> MetaCacheConfig {
        MetaCacheConfig {
            path: PathBuf::from("unused"),
            ttl: Duration::from_secs(3600),
            expire_stale,
        }
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::new(MediaKind::Movie, name, Some(2014), None)
    }

    fn found(id: u64) -> CachePayload {
        CachePayload::Found(ProviderRecord {
            id,
            kind: ProviderKind::Movie,
            title: format!("title {id}"),
            ..ProviderRecord::default()
        })
    }

    #[test]
    fn first_writer_wins() {
        let cache = MetaCache::in_memory(&config(true));
        assert!(cache.put_if_absent(key("a"), found(1)));
        assert!(!cache.put_if_absent(key("a"), found(2)));
        assert_eq!(cache.get(&key("a")), Some(found(1)));
    }

    #[test]
    fn live_hit_slides_expiry() {
        let cache = MetaCache::in_memory(&config(true));
        let soon = unix_now() + 10;
        cache.insert_with_expiry(key("a"), found(1), soon);

        assert!(cache.get(&key("a")).is_some());
        let (_, entry) = cache.entries(0, 1).remove(0);
        assert!(entry.expires_at >= soon + 3000);
    }

    #[test]
    fn expired_entry_dropped_or_served_per_config() {
        let past = unix_now() - 1;

        let dropping = MetaCache::in_memory(&config(true));
        dropping.insert_with_expiry(key("a"), found(1), past);
        assert_eq!(dropping.get(&key("a")), None);
        assert!(dropping.is_empty());

        let serving = MetaCache::in_memory(&config(false));
        serving.insert_with_expiry(key("a"), found(1), past);
        assert_eq!(serving.get(&key("a")), Some(found(1)));
        let (_, entry) = serving.entries(0, 1).remove(0);
        assert_eq!(entry.expires_at, past);
    }

    #[test]
    fn admin_deletes() {
        let cache = MetaCache::in_memory(&config(true));
        cache.put_if_absent(key("a"), found(7));
        cache.put_if_absent(key("b"), found(7));
        cache.put_if_absent(key("c"), found(8));
        cache.put_if_absent(key("d"), CachePayload::NotFound);

        assert_eq!(cache.delete_negative(), 1);
        assert_eq!(cache.delete_by_provider_id(7), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.delete(&key("c")), Some(found(8)));
        cache.put_if_absent(key("e"), found(9));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn small_cache_is_scanned_in_full() {
        let cache = MetaCache::in_memory(&config(true));
        let past = unix_now() - 1;
        for i in 0..10 {
            cache.insert_with_expiry(key(&format!("stale {i}")), found(i), past);
        }
        cache.put_if_absent(key("fresh"), found(100));

        let mut state = cache.state.lock();
        let report = cache.sample_stale(&mut state, unix_now());
        assert_eq!(report.rounds, 1);
        assert_eq!(report.evicted, 10);
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn heavy_staleness_resamples_until_clean() {
        let cache = MetaCache::in_memory(&config(true));
        let past = unix_now() - 1;
        for i in 0..100 {
            cache.insert_with_expiry(key(&format!("stale {i}")), found(i), past);
        }

        let mut state = cache.state.lock();
        let report = cache.sample_stale(&mut state, unix_now());
        // 4 full samples of 25, then an empty full scan.
        assert_eq!(report.rounds, 5);
        assert_eq!(report.evicted, 100);
        assert!(state.entries.is_empty());
    }

    #[test]
    fn sampling_is_bounded() {
        let cache = MetaCache::in_memory(&config(true));
        let past = unix_now() - 1;
        for i in 0..1000 {
            cache.insert_with_expiry(key(&format!("stale {i}")), found(i), past);
        }

        let mut state = cache.state.lock();
        let report = cache.sample_stale(&mut state, unix_now());
        assert_eq!(report.rounds, MAX_SAMPLE_ROUNDS);
        assert_eq!(report.inspected, MAX_SAMPLE_ROUNDS * SAMPLE_SIZE);
        assert_eq!(state.entries.len(), 1000 - MAX_SAMPLE_ROUNDS * SAMPLE_SIZE);
    }

    #[tokio::test]
    async fn in_memory_cache_never_writes() {
        let cache = MetaCache::in_memory(&config(true));
        cache.put_if_absent(key("a"), found(1));
        assert_eq!(cache.persist(true).await.unwrap(), PersistOutcome::InMemory);
    }
}
