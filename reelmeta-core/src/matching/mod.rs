pub mod provider;
pub mod strategy;
pub mod title;
pub mod tmdb;
mod tmdb_wire;

pub use provider::{MetadataProvider, ProviderError};
pub use strategy::{MatchStrategy, MatcherConfig, Resolution};
pub use title::{collapse_whitespace, normalize_title, titles_match};
pub use tmdb::{TMDB_IMAGE_BASE, TmdbConfig, TmdbProvider};
