use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;

/// Kind of work a release title refers to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaKind {
    Movie,
    Tv,
    Anime,
    #[default]
    Unknown,
}

impl MediaKind {
    /// Series kinds carry season and episode numbering.
    pub fn is_series(self) -> bool {
        matches!(self, MediaKind::Tv | MediaKind::Anime)
    }

    /// Provider catalogue searched for this kind, if it is known.
    pub fn provider_kind(self) -> Option<ProviderKind> {
        match self {
            MediaKind::Movie => Some(ProviderKind::Movie),
            MediaKind::Tv | MediaKind::Anime => Some(ProviderKind::Show),
            MediaKind::Unknown => None,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
            MediaKind::Anime => write!(f, "anime"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "film" => Ok(MediaKind::Movie),
            "tv" | "show" | "series" => Ok(MediaKind::Tv),
            "anime" => Ok(MediaKind::Anime),
            "unknown" | "" => Ok(MediaKind::Unknown),
            other => Err(ModelError::InvalidKind(other.to_string())),
        }
    }
}

/// The two catalogues a metadata provider exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProviderKind {
    #[default]
    Movie,
    Show,
}

impl ProviderKind {
    pub fn other(self) -> Self {
        match self {
            ProviderKind::Movie => ProviderKind::Show,
            ProviderKind::Show => ProviderKind::Movie,
        }
    }

    /// Path segment used by the provider's REST layout.
    pub fn as_path(self) -> &'static str {
        match self {
            ProviderKind::Movie => "movie",
            ProviderKind::Show => "tv",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Movie => write!(f, "Movie"),
            ProviderKind::Show => write!(f, "Show"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_aliases() {
        assert_eq!("Series".parse::<MediaKind>().unwrap(), MediaKind::Tv);
        assert_eq!("film".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert!("podcast".parse::<MediaKind>().is_err());
    }

    #[test]
    fn anime_searches_show_catalogue() {
        assert_eq!(MediaKind::Anime.provider_kind(), Some(ProviderKind::Show));
        assert_eq!(MediaKind::Unknown.provider_kind(), None);
    }
}
