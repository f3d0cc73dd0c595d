//! Release-title parsing.
//!
//! [`ReleaseParser`] picks the anime variant for fansub layouts and the
//! video variant for everything else. Both run the configured word rules
//! first and finish by recovering season/episode data from CJK phrases
//! and the optional subtitle.

pub mod anime;
pub mod numerals;
pub mod patterns;
pub mod state;
pub mod subtitle;
pub mod tokenizer;
pub mod video;
pub mod words;

use reelmeta_model::{MediaDescriptor, MediaKind};
use tracing::debug;

pub use anime::{AnimeParser, ReleaseForm, is_anime};
pub use numerals::cn_numeral_to_u32;
pub use state::{Claim, Classified, NamePhase, ParseState, classify, fold_tokens};
pub use subtitle::{AugmentScope, augment};
pub use tokenizer::tokenize;
pub use video::TitleParser;
pub use words::{CompiledWordRules, Replacement, WordRules};

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct ReleaseParser {
    video: TitleParser,
    anime: AnimeParser,
}

impl ReleaseParser {
    pub fn new(rules: &WordRules) -> Result<Self> {
        let compiled = rules.compile()?;
        Ok(Self {
            video: TitleParser::new(compiled.clone()),
            anime: AnimeParser::new(compiled),
        })
    }

    /// Parses `raw` with the variant that fits it, then applies `hint`.
    pub fn parse(
        &self,
        raw: &str,
        subtitle: Option<&str>,
        hint: Option<MediaKind>,
    ) -> MediaDescriptor {
        let use_anime = hint == Some(MediaKind::Anime) || is_anime(raw);
        let mut desc = if use_anime {
            self.anime.parse(raw, subtitle)
        } else {
            self.video.parse(raw, subtitle)
        };

        // A hint never turns a title with series evidence into a movie or
        // an unknown.
        if let Some(hint) = hint
            && (hint.is_series() || !desc.has_series_evidence())
        {
            desc.kind = hint;
        }

        debug!(
            raw,
            variant = if use_anime { "anime" } else { "video" },
            kind = %desc.kind,
            name = ?desc.primary_name(),
            year = ?desc.year,
            season = ?desc.season_label(),
            episode = ?desc.episode_label(),
            "parsed release title"
        );
        desc
    }
}
