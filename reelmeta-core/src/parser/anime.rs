//! Bracket-oriented parser for fansub anime releases.
//!
//! Anime titles put the release group, episode index and encode tags in
//! `[...]` runs and the work title in one bracket or in free text before a
//! ` - NN` episode marker. Brackets are read first; free text only supplies
//! the name when no bracket did.

use once_cell::sync::Lazy;
use regex::Regex;
use reelmeta_model::{MediaDescriptor, MediaKind, is_cjk};
use tracing::trace;

use crate::parser::patterns::{MEDIA_EXTENSION_RE, SIZE_RE};
use crate::parser::state::{classify, fold_tokens};
use crate::parser::subtitle::{AugmentScope, augment};
use crate::parser::tokenizer::tokenize;
use crate::parser::words::CompiledWordRules;

static CN_BRACKET_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)【[+0-9XVPI-]+】\s*【")
        .expect("cjk bracket episode regex should compile")
});

static DASH_EPISODE_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+-\s+[\dv]{1,4}\s+")
        .expect("dash episode hint regex should compile")
});

static WESTERN_SE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)S\d{2}\s*-\s*S\d{2}|S\d{2}|\s+S\d{1,2}|EP?\d{2,4}\s*-\s*EP?\d{2,4}|EP?\d{2,4}|\s+EP?\d{1,4}",
    )
    .expect("western season/episode regex should compile")
});

static BRACKET_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[[+0-9XVPI-]+]\s*\[")
        .expect("bracket episode regex should compile")
});

static SEASONAL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[?(?:\d{1,2}月)?[新月]番\]?")
        .expect("seasonal prefix regex should compile")
});

static TV_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[TV\s*(\d{1,4})\]").expect("tv episode regex should compile")
});

static FOUR_K_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[4K\]").expect("4k bracket regex should compile")
});

static EPISODE_BRACKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:第\s*)?(\d{1,4})(?:v\d)?(?:\s*[-~]\s*(\d{1,4})(?:v\d)?)?\s*[话話集]?(?:\s*END)?$",
    )
    .expect("episode bracket regex should compile")
});

static YEAR_BRACKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:19|20)\d{2})$").expect("year bracket regex should compile")
});

static DASH_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.*?)\s+-\s+(?P<ep>\d{1,4})(?:v\d)?(?:\s*[-~]\s*(?P<end>\d{1,4})(?:v\d)?)?(?:\s+(?P<rest>.*))?$",
    )
    .expect("dash episode regex should compile")
});

static TRAILING_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<name>.+?)\s+(?:第\s*)?(?P<ep>\d{1,3})(?:v\d)?\s*[话話集]?$")
        .expect("trailing episode regex should compile")
});

static SINGLE_RELEASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"剧场版|劇場版|(?i:\bMOVIE\b)")
        .expect("single release regex should compile")
});

static LANGUAGE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[简繁體体日中英双雙語语字幕内封嵌外挂]+|CHS|CHT|JP|JPN|SC|TC|ENG|ASS|SRT|MP4|MKV)$",
    )
    .expect("language tag regex should compile")
});

/// Detects the fansub layout. Western `SxxEyy` markers rule it out unless
/// a `【..】【` run or a ` - NN ` marker is present.
pub fn is_anime(raw: &str) -> bool {
    if CN_BRACKET_EPISODE_RE.is_match(raw) || DASH_EPISODE_HINT_RE.is_match(raw)
    {
        return true;
    }
    if WESTERN_SE_RE.is_match(raw) {
        return false;
    }
    BRACKET_EPISODE_RE.is_match(raw)
}

/// Whether the release is one work or a run of episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseForm {
    Single,
    #[default]
    Series,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Bracket(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BracketMeaning {
    Episode(u32, Option<u32>),
    Year(u16),
    Tags(Vec<String>),
    Ignored,
    Text,
}

#[derive(Debug, Default)]
struct Collected {
    name: Option<String>,
    year: Option<u16>,
    episode: Option<(u32, Option<u32>)>,
    tags: Vec<String>,
}

impl Collected {
    fn episode(&mut self, begin: u32, end: Option<u32>) {
        self.episode.get_or_insert((begin, end.filter(|e| *e > begin)));
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimeParser {
    rules: CompiledWordRules,
}

impl AnimeParser {
    pub fn new(rules: CompiledWordRules) -> Self {
        Self { rules }
    }

    pub fn parse(&self, raw: &str, subtitle: Option<&str>) -> MediaDescriptor {
        let title = prepare(&self.rules.apply(raw));
        let form = if SINGLE_RELEASE_RE.is_match(&title) {
            ReleaseForm::Single
        } else {
            ReleaseForm::Series
        };

        let segments = split_segments(&title);
        trace!(?segments, ?form, "anime segments");

        let mut desc = MediaDescriptor::new(raw);
        let mut collected = Collected::default();
        let mut rest = segments.as_slice();

        if let [Segment::Bracket(group), tail @ ..] = rest
            && !tail.is_empty()
            && bracket_meaning(group) == BracketMeaning::Text
        {
            desc.release_group = Some(group.trim().to_string());
            rest = tail;
        }

        for segment in rest {
            match segment {
                Segment::Bracket(inner) => match bracket_meaning(inner) {
                    BracketMeaning::Episode(begin, end) => collected.episode(begin, end),
                    BracketMeaning::Year(year) => {
                        collected.year.get_or_insert(year);
                    }
                    BracketMeaning::Tags(tags) => collected.tags.extend(tags),
                    BracketMeaning::Ignored => {}
                    BracketMeaning::Text => {
                        if collected.name.is_none() {
                            collected.name = Some(inner.trim().to_string());
                        }
                    }
                },
                Segment::Text(text) => read_text(text, &mut collected),
            }
        }

        apply_names(&mut desc, collected.name.as_deref().unwrap_or_default(), &mut collected.tags);

        let tagged = fold_tokens(&collected.tags).finish(raw);
        desc.year = collected.year;
        desc.begin_season = tagged.begin_season;
        desc.end_season = tagged.end_season;
        if let Some((begin, end)) = collected.episode {
            desc.begin_episode = Some(begin);
            desc.end_episode = end;
        } else {
            desc.begin_episode = tagged.begin_episode;
            desc.end_episode = tagged.end_episode;
        }
        desc.resource_resolution = tagged.resource_resolution;
        desc.resource_type = tagged.resource_type;
        desc.resource_effect = tagged.resource_effect;
        desc.video_codec = tagged.video_codec;
        desc.audio_codec = tagged.audio_codec;

        augment(&mut desc, &title, AugmentScope::CjkOnly);
        if let Some(subtitle) = subtitle {
            augment(&mut desc, subtitle, AugmentScope::All);
        }

        desc.kind = match form {
            ReleaseForm::Single => MediaKind::Movie,
            ReleaseForm::Series => MediaKind::Anime,
        };
        if desc.kind == MediaKind::Anime
            && desc.begin_episode.is_some()
            && desc.begin_season.is_none()
        {
            desc.begin_season = Some(1);
        }
        desc
    }
}

fn prepare(title: &str) -> String {
    let mut title = title.replace('【', "[").replace('】', "]");
    if let Some(found) = MEDIA_EXTENSION_RE.find(&title) {
        title.truncate(found.start());
    }
    let title = SEASONAL_PREFIX_RE.replace_all(&title, "");
    let title = SIZE_RE.replace_all(&title, "");
    let title = TV_EPISODE_RE.replace_all(&title, "[$1]");
    let title = FOUR_K_RE.replace_all(&title, "[2160p]");
    title.trim().to_string()
}

fn split_segments(title: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = title.chars();

    while let Some(c) = chars.next() {
        if c != '[' {
            text.push(c);
            continue;
        }
        push_text(&mut text, &mut segments);
        let inner: String = chars.by_ref().take_while(|&c| c != ']').collect();
        if !inner.trim().is_empty() {
            segments.push(Segment::Bracket(inner));
        }
    }
    push_text(&mut text, &mut segments);
    segments
}

fn push_text(text: &mut String, segments: &mut Vec<Segment>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        segments.push(Segment::Text(trimmed.to_string()));
    }
    text.clear();
}

fn bracket_meaning(inner: &str) -> BracketMeaning {
    let inner = inner.trim();
    if let Some(caps) = YEAR_BRACKET_RE.captures(inner)
        && let Ok(year) = caps[1].parse()
    {
        return BracketMeaning::Year(year);
    }
    if let Some(caps) = EPISODE_BRACKET_RE.captures(inner)
        && let Ok(begin) = caps[1].parse()
    {
        let end = caps.get(2).and_then(|m| m.as_str().parse().ok());
        return BracketMeaning::Episode(begin, end);
    }

    let tokens = tokenize(inner);
    if tokens.iter().all(|t| LANGUAGE_TAG_RE.is_match(t)) {
        return BracketMeaning::Ignored;
    }
    let tags = tag_tokens(&tokens);
    if tags.len() == tokens.len() {
        return BracketMeaning::Tags(tags);
    }
    BracketMeaning::Text
}

/// Tokens claimed by a structured classifier or ignorable as language tags.
fn tag_tokens(tokens: &[String]) -> Vec<String> {
    let mut tags = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1).map(String::as_str);
        if is_tag(token, next) || LANGUAGE_TAG_RE.is_match(token) {
            tags.push(token.clone());
        } else if i > 0 && is_tag(&tokens[i - 1], Some(token)) {
            // second half of a split tag such as WEB DL
            tags.push(token.clone());
        }
    }
    tags
}

fn is_tag(token: &str, next: Option<&str>) -> bool {
    classify(&Default::default(), token, next).claim.is_structured()
}

fn read_text(text: &str, collected: &mut Collected) {
    if let Some(caps) = DASH_EPISODE_RE.captures(text) {
        if let Ok(begin) = caps["ep"].parse() {
            let end = caps.name("end").and_then(|m| m.as_str().parse().ok());
            collected.episode(begin, end);
        }
        let name = caps["name"].trim();
        if collected.name.is_none() && !name.is_empty() {
            collected.name = Some(name.to_string());
        }
        if let Some(rest) = caps.name("rest") {
            collected.tags.extend(tag_tokens(&tokenize(rest.as_str())));
        }
        return;
    }

    if collected.name.is_some() {
        collected.tags.extend(tag_tokens(&tokenize(text)));
        return;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let split = words
        .iter()
        .enumerate()
        .position(|(i, w)| is_tag(w, words.get(i + 1).copied()))
        .unwrap_or(words.len());
    let name = words[..split].join(" ");
    collected.tags.extend(words[split..].iter().map(|w| w.to_string()));

    if let Some(caps) = TRAILING_EPISODE_RE.captures(&name)
        && let Ok(begin) = caps["ep"].parse()
    {
        collected.episode(begin, None);
        collected.name = Some(caps["name"].trim().to_string());
    } else if !name.is_empty() {
        collected.name = Some(name);
    }
}

/// Splits `/`-separated alternatives by script. Western season words in a
/// name are moved to the tag list.
fn apply_names(desc: &mut MediaDescriptor, name: &str, tags: &mut Vec<String>) {
    let cleaned = SINGLE_RELEASE_RE.replace_all(name, " ");
    for alternative in cleaned.split('/') {
        let mut words = Vec::new();
        let parts: Vec<&str> = alternative.split_whitespace().collect();
        for (i, word) in parts.iter().enumerate() {
            if is_tag(word, parts.get(i + 1).copied()) {
                tags.push(word.to_string());
            } else {
                words.push(*word);
            }
        }
        let alternative = words.join(" ");
        if alternative.is_empty() {
            continue;
        }
        let slot = if alternative.chars().any(is_cjk) {
            &mut desc.cn_name
        } else {
            &mut desc.en_name
        };
        slot.get_or_insert(alternative);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> MediaDescriptor {
        AnimeParser::default().parse(raw, None)
    }

    #[test]
    fn detects_fansub_layouts() {
        assert!(is_anime("[ANi] Frieren - 05 [1080P][Baha][WEB-DL][AAC AVC][CHT].mp4"));
        assert!(is_anime("【喵萌奶茶屋】【05】【1080P】"));
        assert!(is_anime("[Group][Title][05][1080P]"));
        assert!(!is_anime("Some.Show.S02E05.720p.HDTV"));
        assert!(!is_anime("Interstellar.2014.1080p.BluRay.x264"));
    }

    #[test]
    fn dash_episode_release() {
        let desc =
            parse("[ANi] Frieren - 05 [1080P][Baha][WEB-DL][AAC AVC][CHT].mp4");
        assert_eq!(desc.release_group.as_deref(), Some("ANi"));
        assert_eq!(desc.en_name.as_deref(), Some("Frieren"));
        assert_eq!(desc.begin_episode, Some(5));
        assert_eq!(desc.begin_season, Some(1));
        assert_eq!(desc.resource_resolution.as_deref(), Some("1080p"));
        assert_eq!(desc.resource_type.as_deref(), Some("WEB-DL"));
        assert_eq!(desc.kind, MediaKind::Anime);
    }

    #[test]
    fn bracketed_name_and_alternatives() {
        let desc = parse("【喵萌奶茶屋】【葬送的芙莉莲 / Sousou no Frieren】【05】【1080P】【简日双语】");
        assert_eq!(desc.release_group.as_deref(), Some("喵萌奶茶屋"));
        assert_eq!(desc.cn_name.as_deref(), Some("葬送的芙莉莲"));
        assert_eq!(desc.en_name.as_deref(), Some("Sousou no Frieren"));
        assert_eq!(desc.begin_episode, Some(5));
    }

    #[test]
    fn season_in_name_and_episode_range() {
        let desc = parse("[Group] Kimetsu no Yaiba S2 - 01-11 [1080p]");
        assert_eq!(desc.en_name.as_deref(), Some("Kimetsu no Yaiba"));
        assert_eq!(desc.begin_season, Some(2));
        assert_eq!((desc.begin_episode, desc.end_episode), (Some(1), Some(11)));

        let desc = parse("[Group] 鬼灭之刃 第二季 - 05 [1080p]");
        assert_eq!(desc.cn_name.as_deref(), Some("鬼灭之刃"));
        assert_eq!(desc.begin_season, Some(2));
    }

    #[test]
    fn theatrical_release_is_a_movie() {
        let desc = parse("[Group][剧场版 紫罗兰永恒花园][1080P]");
        assert_eq!(desc.kind, MediaKind::Movie);
        assert_eq!(desc.cn_name.as_deref(), Some("紫罗兰永恒花园"));
        assert_eq!(desc.begin_season, None);
    }

    #[test]
    fn prefixes_are_normalized() {
        let desc = parse("[Group][Title][TV 07][4K]");
        assert_eq!(desc.begin_episode, Some(7));
        assert_eq!(desc.resource_resolution.as_deref(), Some("2160p"));
    }
}
