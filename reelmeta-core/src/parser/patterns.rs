//! Compiled patterns and vocabularies shared by the title parsers.
//!
//! Token patterns match against the upper-cased token.

use once_cell::sync::Lazy;
use regex::Regex;

pub static SEASON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^S(\d{1,2})$").expect("season regex should compile")
});

pub static SEASON_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^S(\d{1,2})EP?(\d{1,4})(?:EP?(\d{1,4}))?$")
        .expect("season/episode regex should compile")
});

pub static EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^EP?(\d{1,4})$").expect("episode regex should compile")
});

pub static PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(PART|CD|DVD|DISK|DISC)([0-9]{1,2}|[ABC]|I{1,3})?$")
        .expect("part regex should compile")
});

pub static PART_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]{1,2}|[ABC]|I{1,3})$")
        .expect("part suffix regex should compile")
});

pub static RESOLUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[SBUHD]*(\d{3,4})([PI])$")
        .expect("resolution regex should compile")
});

pub static RESOLUTION_DIMENSIONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{3,4}X(\d{3,4})$")
        .expect("resolution dimensions regex should compile")
});

pub static RESOLUTION_K_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([248])K$").expect("4k regex should compile")
});

pub static VIDEO_CODEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[HX]26[45]|AVC|HEVC|VC-?1|MPEG-?[24]|XVID|DIVX)$")
        .expect("video codec regex should compile")
});

pub static BIT_DEPTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:8|10|12)BITS?$").expect("bit depth regex should compile")
});

pub static AUDIO_CODEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:DTS(?:HD)?(?:MA)?\d?|DTSX|ATMOS|TRUEHD\d?|E?AC3|\d{1,2}AUDIOS?|DDP\d?|DD\d?|LPCM\d?|AAC\d?|FLAC\d?|OPUS|MP3)$",
    )
    .expect("audio codec regex should compile")
});

/// Tokens that may follow an audio codec as part of its name.
pub static AUDIO_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:HD|MA|X|ES|HRA)$").expect("audio suffix regex should compile")
});

/// Chinese season/episode phrases such as `第2季` or `全12集`.
pub static CN_SE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[共第全]|[季集话話期部])$|第\s*[0-9一二三四五六七八九十百零两]+\s*[季集话話期部]|[全共]\s*[0-9一二三四五六七八九十百零两]+\s*[季集话話期]|[0-9一二三四五六七八九十百零两]+\s*[季集话話期]全",
    )
    .expect("cjk season/episode regex should compile")
});

pub static FOUR_DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}$").expect("four digit regex should compile")
});

/// Leading `[...]` or `【...】` group.
pub static LEADING_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\[([^\]]+)\]|【([^】]+)】)")
        .expect("leading group regex should compile")
});

pub static YEAR_SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:19|20)\d{2})\s*-\s*(?:19|20)\d{2}\b")
        .expect("year span regex should compile")
});

pub static SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*[MGT]i?B\b").expect("size regex should compile")
});

pub static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:19|20)\d{2}[\s._-]\d{1,2}[\s._-]\d{1,2}\b")
        .expect("date regex should compile")
});

pub static MEDIA_EXTENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\.(?:mp4|mkv|ts|iso|rmvb|avi|mov|mpeg|mpg|wmv|3gp|asf|m4v|flv|m2ts|tp|f4v)$",
    )
    .expect("media extension regex should compile")
});

/// Trailing `-GROUP` after the last separator.
pub static TRAILING_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<head>.+?)-(?P<group>[A-Za-z0-9]+)$")
        .expect("trailing group regex should compile")
});

/// Normalized source tag for a single token.
pub fn source_tag(token: &str) -> Option<&'static str> {
    Some(match token {
        "BLURAY" => "BLURAY",
        "BDRIP" => "BDRIP",
        "BD" => "BLURAY",
        "UHDTV" => "UHDTV",
        "HDTV" => "HDTV",
        "HDDVD" => "HDDVD",
        "WEBRIP" => "WEBRIP",
        "WEBDL" => "WEB-DL",
        "WEB" => "WEB",
        "DVD" => "DVD",
        "DVDRIP" => "DVDRIP",
        "HDRIP" => "HDRIP",
        _ => return None,
    })
}

/// Effect tags kept apart from the source.
pub fn effect_tag(token: &str) -> Option<&'static str> {
    Some(match token {
        "REMUX" => "REMUX",
        "UHD" => "UHD",
        "SDR" => "SDR",
        "HDR" => "HDR",
        "HDR10" => "HDR10",
        "DOLBY" => "DOLBY",
        "DOVI" | "DV" => "DOVI",
        "VISION" => "VISION",
        "3D" => "3D",
        "REPACK" => "REPACK",
        _ => return None,
    })
}

/// Release noise that is structured but carries no data.
pub fn is_noise(token: &str) -> bool {
    matches!(
        token,
        "COMPLETE"
            | "PROPER"
            | "LIMITED"
            | "EXTENDED"
            | "UNRATED"
            | "UNCUT"
            | "INTERNAL"
            | "IMAX"
            | "MULTI"
            | "DUAL"
            | "SUBBED"
            | "DUBBED"
            | "CHS"
            | "CHT"
            | "BIG5"
            | "GB"
            | "中字"
            | "中英"
            | "国语"
            | "國語"
            | "粤语"
            | "双语"
            | "简繁"
            | "特效"
            | "字幕"
            | "内封"
            | "内嵌"
    )
}

/// Tags a trailing `-GROUP` must not be mistaken for.
pub fn is_vocabulary(token: &str) -> bool {
    let upper = token.to_ascii_uppercase();
    matches!(upper.as_str(), "DL" | "RAY" | "HD" | "MA" | "X")
        || source_tag(&upper).is_some()
        || effect_tag(&upper).is_some()
        || VIDEO_CODEC_RE.is_match(&upper)
        || AUDIO_CODEC_RE.is_match(&upper)
        || RESOLUTION_RE.is_match(&upper)
}
