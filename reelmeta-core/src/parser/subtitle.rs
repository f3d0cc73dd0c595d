//! Recovers season/episode numbers from free text such as a torrent
//! subtitle ("第二季 第1-8集").

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reelmeta_model::MediaDescriptor;
use tracing::debug;

use crate::parser::numerals::cn_numeral_to_u32;

const CN_NUM: &str = "[0-9０-９一二三四五六七八九十百零两]+";

static CN_SEASON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"第\s*({CN_NUM})(?:\s*[-~至到]\s*({CN_NUM}))?\s*季"))
        .expect("cjk season regex should compile")
});

static CN_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"第\s*({CN_NUM})(?:\s*[-~至到]\s*({CN_NUM}))?\s*[集话話期]"
    ))
    .expect("cjk episode regex should compile")
});

static CN_ALL_SEASONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"全\s*({CN_NUM})\s*季|({CN_NUM})\s*季全"))
        .expect("cjk full season regex should compile")
});

static CN_ALL_EPISODES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"全\s*({CN_NUM})\s*[集话話期]|({CN_NUM})\s*[集话話期]全"
    ))
    .expect("cjk full episode regex should compile")
});

static SEASON_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])S(\d{1,2})(?:\s*-\s*S(\d{1,2}))?(?:[^0-9]|$)")
        .expect("season text regex should compile")
});

static EPISODE_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^a-z])EP?(\d{1,4})(?:\s*-\s*EP?(\d{1,4}))?(?:[^0-9]|$)",
    )
    .expect("episode text regex should compile")
});

/// Which pattern families to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentScope {
    /// Chinese phrases only. Used on the main title, whose ASCII markers
    /// were already classified token by token.
    CjkOnly,
    All,
}

/// Fills season/episode slots of `desc` that are still empty.
///
/// Existing begins are never overwritten and an end is only set when it
/// is greater than its begin. Returns whether anything was filled.
pub fn augment(
    desc: &mut MediaDescriptor,
    text: &str,
    scope: AugmentScope,
) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let mut changed = false;

    if let Some((begin, end)) = capture_range(&CN_SEASON_RE, text) {
        changed |= fill(&mut desc.begin_season, &mut desc.end_season, begin, end);
    }
    if let Some(caps) = CN_ALL_SEASONS_RE.captures(text)
        && let Some(total) = first_number(&caps)
    {
        changed |= fill(&mut desc.begin_season, &mut desc.end_season, 1, Some(total));
    }
    if let Some((begin, end)) = capture_range(&CN_EPISODE_RE, text) {
        changed |= fill(&mut desc.begin_episode, &mut desc.end_episode, begin, end);
    }
    if CN_ALL_EPISODES_RE.is_match(text) && desc.begin_season.is_none() {
        desc.begin_season = Some(1);
        changed = true;
    }

    if scope == AugmentScope::All {
        if let Some((begin, end)) = capture_range(&SEASON_TEXT_RE, text) {
            changed |= fill(&mut desc.begin_season, &mut desc.end_season, begin, end);
        }
        if let Some((begin, end)) = capture_range(&EPISODE_TEXT_RE, text) {
            changed |= fill(&mut desc.begin_episode, &mut desc.end_episode, begin, end);
        }
    }

    if changed {
        debug!(
            text,
            season = ?desc.season_label(),
            episode = ?desc.episode_label(),
            "recovered season/episode from text"
        );
    }
    changed
}

fn capture_range(re: &Regex, text: &str) -> Option<(u32, Option<u32>)> {
    let caps = re.captures(text)?;
    let begin = cn_numeral_to_u32(caps.get(1)?.as_str())?;
    let end = caps.get(2).and_then(|m| cn_numeral_to_u32(m.as_str()));
    Some((begin, end))
}

fn first_number(caps: &Captures<'_>) -> Option<u32> {
    caps.iter()
        .skip(1)
        .flatten()
        .find_map(|m| cn_numeral_to_u32(m.as_str()))
}

fn fill(
    begin: &mut Option<u32>,
    end: &mut Option<u32>,
    new_begin: u32,
    new_end: Option<u32>,
) -> bool {
    if begin.is_some() {
        return false;
    }
    *begin = Some(new_begin);
    if end.is_none()
        && let Some(new_end) = new_end
        && new_end > new_begin
    {
        *end = Some(new_end);
    }
    true
}
