use std::{
    fmt,
    path::{Path, PathBuf},
};

use cacache::Integrity;
use reelmeta_model::ProviderRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::key::CacheKey;
use crate::error::{IdentifyError, Result};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Index key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "reelmeta:meta-snapshot";

/// Durable form of the positive cache entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub written_at: i64,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: CacheKey,
    pub record: ProviderRecord,
    pub expires_at: i64,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

impl Snapshot {
    pub fn new(written_at: i64, entries: Vec<SnapshotEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            written_at,
            entries,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header: SnapshotHeader = serde_json::from_slice(bytes)
            .map_err(|e| IdentifyError::CorruptSnapshot(e.to_string()))?;
        if header.version != SNAPSHOT_VERSION {
            return Err(IdentifyError::CorruptSnapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                header.version
            )));
        }
        serde_json::from_slice(bytes)
            .map_err(|e| IdentifyError::CorruptSnapshot(e.to_string()))
    }
}

/// Root directory of the snapshot store.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SnapshotRoot(PathBuf);

impl SnapshotRoot {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for SnapshotRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnapshotRoot").field(&self.0).finish()
    }
}

/// Metadata returned from a successful snapshot write.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub integrity: Integrity,
    pub byte_len: usize,
}

/// A thin typed wrapper over `cacache` holding one snapshot blob.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    root: SnapshotRoot,
}

impl SnapshotStore {
    pub fn new(root: SnapshotRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SnapshotRoot {
        &self.root
    }

    /// Reads the stored snapshot. `Ok(None)` means nothing was written yet.
    pub async fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match cacache::read(self.root.as_path(), SNAPSHOT_KEY).await
        {
            Ok(bytes) => bytes,
            Err(cacache::Error::EntryNotFound(_, _)) => return Ok(None),
            Err(e) => return Err(map_cacache_error("read", e)),
        };
        Snapshot::decode(&bytes).map(Some)
    }

    /// Writes `snapshot` and drops the content it replaces.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<StoredSnapshot> {
        let bytes = snapshot.encode()?;
        let previous = cacache::metadata(self.root.as_path(), SNAPSHOT_KEY)
            .await
            .ok()
            .flatten()
            .map(|meta| meta.integrity);

        let integrity =
            cacache::write(self.root.as_path(), SNAPSHOT_KEY, &bytes)
                .await
                .map_err(|e| map_cacache_error("write", e))?;

        if let Some(previous) = previous
            && previous != integrity
            && let Err(e) =
                cacache::remove_hash(self.root.as_path(), &previous).await
        {
            warn!(error = %e, "failed to remove superseded snapshot content");
        }

        Ok(StoredSnapshot {
            integrity,
            byte_len: bytes.len(),
        })
    }
}

fn map_cacache_error(op: &str, e: cacache::Error) -> IdentifyError {
    match e {
        cacache::Error::EntryNotFound(_, key) => {
            IdentifyError::NotFound(format!("snapshot entry not found: {key}"))
        }
        cacache::Error::IntegrityError(err) => IdentifyError::CorruptSnapshot(
            format!("snapshot failed integrity check ({err})"),
        ),
        cacache::Error::SizeMismatch(wanted, actual) => {
            IdentifyError::CorruptSnapshot(format!(
                "snapshot size mismatch: wanted={wanted}, actual={actual}"
            ))
        }
        cacache::Error::IoError(_, msg) => {
            IdentifyError::Internal(format!("cacache {op} I/O error: {msg}"))
        }
        cacache::Error::SerdeError(_, msg) => {
            IdentifyError::Internal(format!("cacache {op} serde error: {msg}"))
        }
    }
}
