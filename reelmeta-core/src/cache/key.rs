use std::fmt;

use reelmeta_model::{MediaDescriptor, MediaKind, ProviderRecord};
use serde::{Deserialize, Serialize};

use crate::matching::normalize_title;

/// Composite lookup key: kind, normalized name, year and first season.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CacheKey {
    pub kind: MediaKind,
    pub name: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
}

impl CacheKey {
    pub fn new(
        kind: MediaKind,
        name: &str,
        year: Option<u16>,
        season: Option<u32>,
    ) -> Self {
        // The provider has no anime catalogue, so anime shares tv keys.
        let kind = match kind {
            MediaKind::Anime => MediaKind::Tv,
            other => other,
        };
        Self {
            kind,
            name: normalize_title(name),
            year,
            season,
        }
    }

    /// Key for a parsed descriptor, or `None` when it has no usable name.
    pub fn for_descriptor(desc: &MediaDescriptor) -> Option<Self> {
        let name = desc.primary_name()?;
        let key = Self::new(desc.kind, name, desc.year, desc.begin_season);
        (!key.name.is_empty()).then_some(key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}-", self.kind, self.name)?;
        if let Some(year) = self.year {
            write!(f, "{year}")?;
        }
        f.write_str("-")?;
        if let Some(season) = self.season {
            write!(f, "{season}")?;
        }
        Ok(())
    }
}

/// Cached outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum CachePayload {
    Found(ProviderRecord),
    /// The provider was asked and had no match.
    NotFound,
}

impl CachePayload {
    pub fn is_found(&self) -> bool {
        matches!(self, CachePayload::Found(_))
    }

    pub fn record(&self) -> Option<&ProviderRecord> {
        match self {
            CachePayload::Found(record) => Some(record),
            CachePayload::NotFound => None,
        }
    }
}
