//! Secondary categories assigned to resolved media, such as "Documentary"
//! or "Japanese Anime".

use reelmeta_model::{MediaKind, ProviderRecord};
use serde::{Deserialize, Serialize};

/// One named rule. Every attribute that is set must intersect the
/// record's values; a rule with no attributes matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRule {
    pub name: String,
    pub genre_ids: Vec<u32>,
    pub original_language: Vec<String>,
    pub origin_country: Vec<String>,
}

impl CategoryRule {
    pub fn matches(&self, record: &ProviderRecord) -> bool {
        let genres = self.genre_ids.is_empty()
            || self.genre_ids.iter().any(|g| record.has_genre(*g));
        let language = self.original_language.is_empty()
            || record.original_language.as_deref().is_some_and(|lang| {
                self.original_language
                    .iter()
                    .any(|l| l.eq_ignore_ascii_case(lang))
            });
        let country = self.origin_country.is_empty()
            || record.origin_country.iter().any(|c| {
                self.origin_country.iter().any(|rule| rule.eq_ignore_ascii_case(c))
            });
        genres && language && country
    }
}

/// Ordered rule lists per media kind. The first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub movie: Vec<CategoryRule>,
    pub tv: Vec<CategoryRule>,
    pub anime: Vec<CategoryRule>,
}

impl CategoryConfig {
    pub fn is_empty(&self) -> bool {
        self.movie.is_empty() && self.tv.is_empty() && self.anime.is_empty()
    }

    pub fn rules_for(&self, kind: MediaKind) -> &[CategoryRule] {
        match kind {
            MediaKind::Movie => &self.movie,
            MediaKind::Tv => &self.tv,
            MediaKind::Anime => &self.anime,
            MediaKind::Unknown => &[],
        }
    }

    pub fn classify(
        &self,
        kind: MediaKind,
        record: &ProviderRecord,
    ) -> Option<String> {
        self.rules_for(kind)
            .iter()
            .find(|rule| rule.matches(record))
            .map(|rule| rule.name.clone())
    }
}
