use reelmeta_model::MediaDescriptor;
use tracing::trace;

use crate::parser::patterns::{
    DATE_RE, LEADING_GROUP_RE, MEDIA_EXTENSION_RE, SIZE_RE, TRAILING_GROUP_RE,
    YEAR_SPAN_RE, is_vocabulary,
};
use crate::parser::state::{fold_tokens, kind_from_evidence};
use crate::parser::subtitle::{AugmentScope, augment};
use crate::parser::tokenizer::{bracket_inner, is_bracketed, tokenize};
use crate::parser::words::CompiledWordRules;

/// Largest episode span a single file may carry (double episodes).
const MAX_FILE_EPISODE_SPAN: u32 = 2;

/// Title after pre-processing, plus what was lifted out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Prepared {
    title: String,
    release_group: Option<String>,
    file_mode: bool,
}

/// Parser for movie and TV release titles.
#[derive(Debug, Clone, Default)]
pub struct TitleParser {
    rules: CompiledWordRules,
}

impl TitleParser {
    pub fn new(rules: CompiledWordRules) -> Self {
        Self { rules }
    }

    /// Parses `raw` and augments season/episode data from `subtitle`.
    pub fn parse(&self, raw: &str, subtitle: Option<&str>) -> MediaDescriptor {
        let prepared = self.prepare(raw);
        let tokens = expand_brackets(tokenize(&prepared.title));
        trace!(?tokens, "tokenized title");

        let mut desc = fold_tokens(&tokens).finish(raw);
        desc.release_group = prepared.release_group;

        augment(&mut desc, &prepared.title, AugmentScope::CjkOnly);
        if let Some(subtitle) = subtitle {
            augment(&mut desc, subtitle, AugmentScope::All);
        }
        if prepared.file_mode {
            apply_file_mode(&mut desc);
        }
        desc.kind = kind_from_evidence(&desc);
        desc
    }

    fn prepare(&self, raw: &str) -> Prepared {
        let mut title = self.rules.apply(raw);
        let mut prepared = Prepared::default();

        if let Some(found) = MEDIA_EXTENSION_RE.find(&title) {
            title.truncate(found.start());
            prepared.file_mode = true;
        }

        if let Some(caps) = LEADING_GROUP_RE.captures(&title) {
            let group = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().trim().to_string())
                .filter(|g| !g.is_empty());
            let end = caps.get(0).map_or(0, |m| m.end());
            prepared.release_group = group;
            title = title[end..].to_string();
        }

        title = YEAR_SPAN_RE.replace_all(&title, "$1").into_owned();
        title = SIZE_RE.replace_all(&title, " ").into_owned();
        title = DATE_RE.replace_all(&title, " ").into_owned();

        if let Some((head, group)) = trailing_group(title.trim()) {
            prepared.release_group.get_or_insert(group);
            title = head;
        }

        prepared.title = title.trim().to_string();
        prepared
    }
}

/// Splits off `-GROUP` when the token before the dash is a release tag.
fn trailing_group(title: &str) -> Option<(String, String)> {
    let caps = TRAILING_GROUP_RE.captures(title)?;
    let head = caps.name("head")?.as_str();
    let group = caps.name("group")?.as_str();
    if is_vocabulary(group) {
        return None;
    }
    let tokens = tokenize(head);
    let last = tokens.last()?;
    // split tags such as `H.264` count as one
    let joined = match tokens.as_slice() {
        [.., before, last] => format!("{before}{last}"),
        _ => last.clone(),
    };
    (is_vocabulary(last) || is_vocabulary(&joined))
        .then(|| (head.to_string(), group.to_string()))
}

/// Replaces bracket tokens with the tokens inside them.
fn expand_brackets(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .flat_map(|token| {
            if is_bracketed(&token) {
                tokenize(bracket_inner(&token))
            } else {
                vec![token]
            }
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn apply_file_mode(desc: &mut MediaDescriptor) {
    if desc.begin_episode.is_none()
        && desc.cn_name.is_none()
        && let Some(episode) = desc
            .en_name
            .as_deref()
            .filter(|name| name.chars().all(|c| c.is_ascii_digit()))
            .and_then(|name| name.parse().ok())
    {
        desc.begin_episode = Some(episode);
        desc.en_name = None;
    }
    desc.end_season = None;
    if let (Some(begin), Some(end)) = (desc.begin_episode, desc.end_episode)
        && end - begin > MAX_FILE_EPISODE_SPAN
    {
        desc.end_episode = None;
    }
}

#[cfg(test)]
mod tests {
    use reelmeta_model::MediaKind;

    use super::*;
    use crate::parser::words::{Replacement, WordRules};

    fn parse(raw: &str) -> MediaDescriptor {
        TitleParser::default().parse(raw, None)
    }

    #[test]
    fn movie_release() {
        let desc = parse("Interstellar.2014.1080p.BluRay.x264");
        assert_eq!(desc.kind, MediaKind::Movie);
        assert_eq!(desc.en_name.as_deref(), Some("Interstellar"));
        assert_eq!(desc.year, Some(2014));
        assert_eq!(desc.resource_resolution.as_deref(), Some("1080p"));
        assert_eq!(desc.resource_type.as_deref(), Some("BLURAY"));
        assert_eq!(desc.video_codec.as_deref(), Some("x264"));
    }

    #[test]
    fn tv_release() {
        let desc = parse("Some.Show.S02E05.720p.HDTV");
        assert_eq!(desc.kind, MediaKind::Tv);
        assert_eq!(desc.en_name.as_deref(), Some("Some Show"));
        assert_eq!(desc.begin_season, Some(2));
        assert_eq!(desc.begin_episode, Some(5));
        assert_eq!(desc.resource_resolution.as_deref(), Some("720p"));
        assert_eq!(desc.resource_type.as_deref(), Some("HDTV"));
    }

    #[test]
    fn trailing_group_needs_release_tag() {
        let desc = parse("Movie.2014.1080p.BluRay.x264-SPARKS");
        assert_eq!(desc.release_group.as_deref(), Some("SPARKS"));

        let desc = parse("Spider-Man.2002.1080p");
        assert_eq!(desc.en_name.as_deref(), Some("Spider Man"));
        assert_eq!(desc.release_group, None);

        let desc = parse("Show.S01.WEB-DL");
        assert_eq!(desc.resource_type.as_deref(), Some("WEB-DL"));
        assert_eq!(desc.release_group, None);
    }

    #[test]
    fn leading_group_and_noise_are_stripped() {
        let desc = parse("[HDHome] Movie 2019-2020 4.5GB 1080p");
        assert_eq!(desc.release_group.as_deref(), Some("HDHome"));
        assert_eq!(desc.en_name.as_deref(), Some("Movie"));
        assert_eq!(desc.year, Some(2019));
    }

    #[test]
    fn file_mode_numeric_name_is_episode() {
        let desc = parse("05.mkv");
        assert_eq!(desc.begin_episode, Some(5));
        assert_eq!(desc.en_name, None);
        assert_eq!(desc.kind, MediaKind::Tv);
    }

    #[test]
    fn file_mode_clears_wide_ranges() {
        let desc = parse("Show.S01-S02.E01-E05.mkv");
        assert_eq!(desc.end_season, None);
        assert_eq!(desc.end_episode, None);

        let desc = parse("Show.S01E01E02.mkv");
        assert_eq!(desc.end_episode, Some(2));
    }

    #[test]
    fn subtitle_fills_missing_season() {
        let desc = TitleParser::default()
            .parse("权力的游戏 Game of Thrones 1080p", Some("第二季 全10集"));
        assert_eq!(desc.cn_name.as_deref(), Some("权力的游戏"));
        assert_eq!(desc.en_name.as_deref(), Some("Game Of Thrones"));
        assert_eq!(desc.begin_season, Some(2));
        assert_eq!(desc.kind, MediaKind::Tv);
    }

    #[test]
    fn cjk_season_in_title() {
        let desc = parse("权力的游戏.第二季.1080p");
        assert_eq!(desc.begin_season, Some(2));
        assert_eq!(desc.kind, MediaKind::Tv);
    }

    #[test]
    fn word_rules_run_first() {
        let rules = WordRules {
            ignored: vec![],
            replaced: vec![Replacement {
                from: "Hallows Part".into(),
                to: "Hallows.Part".into(),
            }],
        }
        .compile()
        .unwrap();
        let desc = TitleParser::new(rules)
            .parse("Deathly Hallows Part 1 2010 1080p", None);
        assert_eq!(desc.en_name.as_deref(), Some("Deathly Hallows"));
        assert_eq!(desc.part_marker.as_deref(), Some("PART1"));
    }

    #[test]
    fn degenerate_input_still_yields_descriptor() {
        let desc = parse("   ");
        assert_eq!(desc.kind, MediaKind::Movie);
        assert!(!desc.has_name());
    }
}
