use std::fmt;

use crate::media_kind::{MediaKind, ProviderKind};
use crate::record::{ProviderRecord, ResolvedMedia};

/// Provider genre id for animation.
pub const ANIMATION_GENRE_ID: u32 = 16;

/// Structured metadata derived from one release title.
///
/// Classification fields are filled by the parsers. `resolved` is filled at
/// most once by [`MediaDescriptor::merge`] after a provider match.
#[derive(Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaDescriptor {
    /// Verbatim input, kept for audit.
    pub original_string: String,
    pub kind: MediaKind,
    /// Name built from CJK tokens.
    pub cn_name: Option<String>,
    /// Name built from romanized tokens.
    pub en_name: Option<String>,
    pub year: Option<u16>,
    pub begin_season: Option<u32>,
    pub end_season: Option<u32>,
    pub begin_episode: Option<u32>,
    pub end_episode: Option<u32>,
    pub part_marker: Option<String>,
    /// Normalized source tag such as `BLURAY` or `WEB-DL`.
    pub resource_type: Option<String>,
    /// Space-joined effect tags such as `REMUX HDR`.
    pub resource_effect: Option<String>,
    pub resource_resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub release_group: Option<String>,
    pub resolved: Option<ResolvedMedia>,
}

impl MediaDescriptor {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original_string: original.into(),
            ..Self::default()
        }
    }

    /// Name used for provider queries.
    ///
    /// A purely CJK name wins, then the romanized name, then any CJK name.
    pub fn primary_name(&self) -> Option<&str> {
        if let Some(cn) = self.cn_name.as_deref()
            && is_all_cjk(cn)
        {
            return Some(cn);
        }
        self.en_name.as_deref().or(self.cn_name.as_deref())
    }

    /// Every non-empty name the parser produced.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [self.cn_name.as_deref(), self.en_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|name| !name.trim().is_empty())
    }

    pub fn has_name(&self) -> bool {
        self.names().next().is_some()
    }

    pub fn has_series_evidence(&self) -> bool {
        self.begin_season.is_some() || self.begin_episode.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// `S01`, `S01-S03` or `None`.
    pub fn season_label(&self) -> Option<String> {
        range_label('S', self.begin_season, self.end_season)
    }

    /// `E05`, `E05-E12` or `None`.
    pub fn episode_label(&self) -> Option<String> {
        range_label('E', self.begin_episode, self.end_episode)
    }

    /// Sets the provider fields. Returns `false` if they were already set.
    pub fn merge(
        &mut self,
        record: &ProviderRecord,
        category: Option<String>,
        image_base: &str,
    ) -> bool {
        if self.resolved.is_some() {
            return false;
        }

        let kind = match record.kind {
            ProviderKind::Movie => MediaKind::Movie,
            ProviderKind::Show
                if self.kind == MediaKind::Anime
                    || record.has_genre(ANIMATION_GENRE_ID) =>
            {
                MediaKind::Anime
            }
            ProviderKind::Show => MediaKind::Tv,
        };
        let image_url = |path: &Option<String>| {
            path.as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{}", image_base.trim_end_matches('/'), p))
        };

        self.resolved = Some(ResolvedMedia {
            provider_id: record.id,
            kind,
            title: record.title.clone(),
            original_title: record.original_title.clone(),
            original_language: record.original_language.clone(),
            year: record.year,
            category,
            rating: record.rating.map(|r| (r * 10.0).round() / 10.0),
            overview: record.overview.clone(),
            poster_url: image_url(&record.poster_path),
            backdrop_url: image_url(&record.backdrop_path),
            genre_ids: record.genre_ids.clone(),
        });
        true
    }
}

impl fmt::Debug for MediaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaDescriptor")
            .field("original", &self.original_string)
            .field("kind", &self.kind)
            .field("cn_name", &self.cn_name)
            .field("en_name", &self.en_name)
            .field("year", &self.year)
            .field("season", &self.season_label())
            .field("episode", &self.episode_label())
            .field("part", &self.part_marker)
            .field("resource_type", &self.resource_type)
            .field("resolution", &self.resource_resolution)
            .field("resolved", &self.resolved.as_ref().map(|r| r.provider_id))
            .finish()
    }
}

fn range_label(
    prefix: char,
    begin: Option<u32>,
    end: Option<u32>,
) -> Option<String> {
    let begin = begin?;
    Some(match end {
        Some(end) if end > begin => {
            format!("{prefix}{begin:02}-{prefix}{end:02}")
        }
        _ => format!("{prefix}{begin:02}"),
    })
}

/// True for ideographs and kana.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{3040}'..='\u{30ff}'
        | '\u{f900}'..='\u{faff}')
}

/// True when every letter in `text` is CJK. Digits and spaces are ignored.
pub fn is_all_cjk(text: &str) -> bool {
    let mut saw_cjk = false;
    for c in text.chars() {
        if is_cjk(c) {
            saw_cjk = true;
        } else if !(c.is_whitespace() || c.is_ascii_digit()) {
            return false;
        }
    }
    saw_cjk
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_record() -> ProviderRecord {
        ProviderRecord {
            id: 1399,
            kind: ProviderKind::Show,
            title: "Some Show".into(),
            year: Some(2019),
            rating: Some(8.46),
            poster_path: Some("/poster.jpg".into()),
            genre_ids: vec![18],
            ..ProviderRecord::default()
        }
    }

    #[test]
    fn primary_name_prefers_pure_cjk() {
        let mut desc = MediaDescriptor::new("x");
        desc.cn_name = Some("权力的游戏".into());
        desc.en_name = Some("Game of Thrones".into());
        assert_eq!(desc.primary_name(), Some("权力的游戏"));

        desc.cn_name = Some("权力的游戏 GoT".into());
        assert_eq!(desc.primary_name(), Some("Game of Thrones"));
    }

    #[test]
    fn merge_is_write_once() {
        let mut desc = MediaDescriptor::new("Some.Show.S01");
        desc.kind = MediaKind::Tv;

        assert!(desc.merge(&show_record(), Some("Drama".into()), "https://img/w500/"));
        let resolved = desc.resolved.clone().unwrap();
        assert_eq!(resolved.kind, MediaKind::Tv);
        assert_eq!(resolved.rating, Some(8.5));
        assert_eq!(resolved.poster_url.as_deref(), Some("https://img/w500/poster.jpg"));

        let mut other = show_record();
        other.id = 7;
        assert!(!desc.merge(&other, None, "https://img/w500"));
        assert_eq!(desc.resolved.unwrap().provider_id, 1399);
    }

    #[test]
    fn animated_show_merges_as_anime() {
        let mut record = show_record();
        record.genre_ids.push(ANIMATION_GENRE_ID);
        let mut desc = MediaDescriptor::new("x");
        desc.merge(&record, None, "");
        assert_eq!(desc.resolved.unwrap().kind, MediaKind::Anime);
    }

    #[test]
    fn labels_collapse_non_ranges() {
        let mut desc = MediaDescriptor::new("x");
        desc.begin_season = Some(1);
        desc.end_season = Some(3);
        desc.begin_episode = Some(5);
        assert_eq!(desc.season_label().as_deref(), Some("S01-S03"));
        assert_eq!(desc.episode_label().as_deref(), Some("E05"));
    }
}
