use crate::media_kind::{MediaKind, ProviderKind};

/// One candidate returned by a provider search.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProviderRecord {
    pub id: u64,
    pub kind: ProviderKind,
    /// Localized title in the configured provider language.
    pub title: String,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    /// Release year for movies, first-air year for shows.
    pub year: Option<u16>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub genre_ids: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin_country: Vec<String>,
    pub rating: Option<f32>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl ProviderRecord {
    pub fn has_genre(&self, genre: u32) -> bool {
        self.genre_ids.contains(&genre)
    }
}

/// Summary of one season of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonSummary {
    pub season_number: u32,
    pub air_year: Option<u16>,
    pub episode_count: Option<u32>,
}

/// Provider fields merged into a descriptor after a successful match.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedMedia {
    pub provider_id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    pub year: Option<u16>,
    pub category: Option<String>,
    /// Vote average rounded to one decimal.
    pub rating: Option<f32>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub genre_ids: Vec<u32>,
}
