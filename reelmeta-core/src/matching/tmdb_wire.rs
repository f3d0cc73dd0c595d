use chrono::{Datelike, NaiveDate};
use reelmeta_model::{ProviderKind, ProviderRecord, SeasonSummary};
use serde::{Deserialize, Serialize};

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

fn year_of(date: Option<NaiveDate>) -> Option<u16> {
    date.and_then(|d| u16::try_from(d.year()).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieItem {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub vote_average: Option<f32>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl From<MovieItem> for ProviderRecord {
    fn from(item: MovieItem) -> Self {
        ProviderRecord {
            id: item.id,
            kind: ProviderKind::Movie,
            title: item.title,
            original_title: non_empty(item.original_title),
            original_language: non_empty(item.original_language),
            year: year_of(item.release_date),
            genre_ids: item.genre_ids,
            origin_country: Vec::new(),
            rating: item.vote_average,
            overview: non_empty(item.overview),
            poster_path: non_empty(item.poster_path),
            backdrop_path: non_empty(item.backdrop_path),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvItem {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub original_language: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    pub vote_average: Option<f32>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl From<TvItem> for ProviderRecord {
    fn from(item: TvItem) -> Self {
        ProviderRecord {
            id: item.id,
            kind: ProviderKind::Show,
            title: item.name,
            original_title: non_empty(item.original_name),
            original_language: non_empty(item.original_language),
            year: year_of(item.first_air_date),
            genre_ids: item.genre_ids,
            origin_country: item.origin_country,
            rating: item.vote_average,
            overview: non_empty(item.overview),
            poster_path: non_empty(item.poster_path),
            backdrop_path: non_empty(item.backdrop_path),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowDetails {
    #[serde(default)]
    pub seasons: Vec<SeasonItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonItem {
    pub season_number: u32,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub air_date: Option<NaiveDate>,
    pub episode_count: Option<u32>,
}

impl From<SeasonItem> for SeasonSummary {
    fn from(item: SeasonItem) -> Self {
        SeasonSummary {
            season_number: item.season_number,
            air_year: year_of(item.air_date),
            episode_count: item.episode_count,
        }
    }
}

/// Details payload with `alternative_titles` and `translations` appended.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleVariants {
    #[serde(default)]
    pub alternative_titles: AlternativeTitles,
    #[serde(default)]
    pub translations: Translations,
}

/// Movies list alternates under `titles`, shows under `results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlternativeTitles {
    #[serde(default)]
    pub titles: Vec<AlternativeTitle>,
    #[serde(default)]
    pub results: Vec<AlternativeTitle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlternativeTitle {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub data: TranslationData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationData {
    pub title: Option<String>,
    pub name: Option<String>,
}

impl TitleVariants {
    pub fn into_titles(self) -> Vec<String> {
        let alternates = self
            .alternative_titles
            .titles
            .into_iter()
            .chain(self.alternative_titles.results)
            .map(|t| t.title);
        let translated = self
            .translations
            .translations
            .into_iter()
            .filter_map(|t| t.data.title.or(t.data.name));

        let mut out: Vec<String> = Vec::new();
        for title in alternates.chain(translated) {
            if !title.trim().is_empty() && !out.contains(&title) {
                out.push(title);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieSearchQuery<'a> {
    pub api_key: &'a str,
    pub query: &'a str,
    pub include_adult: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowSearchQuery<'a> {
    pub api_key: &'a str,
    pub query: &'a str,
    pub include_adult: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date_year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailsQuery<'a> {
    pub api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_to_response: Option<&'a str>,
}
