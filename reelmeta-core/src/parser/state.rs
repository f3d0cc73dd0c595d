//! Token classification as a fold over an immutable parse state.
//!
//! [`classify`] decides what one token is, given the state built so far and
//! a one-token lookahead. [`ParseState::apply`] folds that decision in and
//! returns the next state. The first classifier that claims a token wins;
//! name material is only considered when no structured classifier claims
//! it.

use reelmeta_model::{MediaDescriptor, MediaKind, is_cjk};

use crate::parser::patterns::{
    AUDIO_CODEC_RE, AUDIO_SUFFIX_RE, BIT_DEPTH_RE, CN_SE_TOKEN_RE,
    EPISODE_RE, FOUR_DIGITS_RE, PART_RE, PART_SUFFIX_RE, RESOLUTION_DIMENSIONS_RE,
    RESOLUTION_K_RE, RESOLUTION_RE, SEASON_EPISODE_RE, SEASON_RE,
    VIDEO_CODEC_RE, effect_tag, is_noise, source_tag,
};

const YEAR_RANGE: std::ops::RangeInclusive<u16> = 1900..=2100;

/// What the previous token was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenClass {
    #[default]
    Start,
    Name,
    PendingName,
    Part,
    Year,
    Resolution,
    Season,
    Episode,
    Source,
    Effect,
    VideoCodec,
    AudioCodec,
    Marker,
    Ignored,
}

/// Progress of the name buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamePhase {
    #[default]
    Open,
    /// A 4-digit token seen before any name. It becomes name material
    /// unless a year claim settles it first.
    Pending(String),
    /// A structured token followed the name; nothing more is appended.
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    Name(String),
    PendingName(String),
    Part(String),
    Year(u16),
    Resolution(String),
    Season(u32),
    Episode(u32),
    SeasonEpisode {
        season: u32,
        episode: u32,
        episode_end: Option<u32>,
    },
    SeasonEnd(u32),
    EpisodeEnd(u32),
    Source(String),
    Effect(String),
    VideoCodec(String),
    BitDepth(String),
    AudioCodec(String),
    AudioSuffix(String),
    /// Structured token without data: AKA, CJK season words, release noise.
    Marker,
    Ignored,
}

impl Claim {
    pub fn class(&self) -> TokenClass {
        match self {
            Claim::Name(_) => TokenClass::Name,
            Claim::PendingName(_) => TokenClass::PendingName,
            Claim::Part(_) => TokenClass::Part,
            Claim::Year(_) => TokenClass::Year,
            Claim::Resolution(_) => TokenClass::Resolution,
            Claim::Season(_) | Claim::SeasonEnd(_) => TokenClass::Season,
            Claim::Episode(_)
            | Claim::EpisodeEnd(_)
            | Claim::SeasonEpisode { .. } => TokenClass::Episode,
            Claim::Source(_) => TokenClass::Source,
            Claim::Effect(_) => TokenClass::Effect,
            Claim::VideoCodec(_) | Claim::BitDepth(_) => TokenClass::VideoCodec,
            Claim::AudioCodec(_) | Claim::AudioSuffix(_) => {
                TokenClass::AudioCodec
            }
            Claim::Marker => TokenClass::Marker,
            Claim::Ignored => TokenClass::Ignored,
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(
            self,
            Claim::Name(_) | Claim::PendingName(_) | Claim::Ignored
        )
    }
}

/// A claim plus whether it also swallowed the lookahead token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub claim: Claim,
    pub consumes_next: bool,
}

impl Classified {
    fn one(claim: Claim) -> Self {
        Self {
            claim,
            consumes_next: false,
        }
    }

    fn two(claim: Claim) -> Self {
        Self {
            claim,
            consumes_next: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseState {
    name_phase: NamePhase,
    cn_words: Vec<String>,
    en_words: Vec<String>,
    part: Option<String>,
    year: Option<u16>,
    resolution: Option<String>,
    begin_season: Option<u32>,
    end_season: Option<u32>,
    begin_episode: Option<u32>,
    end_episode: Option<u32>,
    source: Option<String>,
    effects: Vec<String>,
    video_codec: Option<String>,
    bit_depth: Option<String>,
    audio: Vec<String>,
    last: TokenClass,
    skip_next: bool,
}

impl ParseState {
    pub fn has_name(&self) -> bool {
        !self.cn_words.is_empty() || !self.en_words.is_empty()
    }

    pub fn name_locked(&self) -> bool {
        self.name_phase == NamePhase::Locked
    }

    pub fn has_pending(&self) -> bool {
        matches!(self.name_phase, NamePhase::Pending(_))
    }

    pub fn last(&self) -> TokenClass {
        self.last
    }

    pub fn skip_next(&self) -> bool {
        self.skip_next
    }

    /// State after a token swallowed by the previous claim.
    pub fn skipped(mut self) -> Self {
        self.skip_next = false;
        self
    }

    pub fn apply(mut self, classified: Classified) -> Self {
        let Classified {
            claim,
            consumes_next,
        } = classified;
        self.skip_next = consumes_next;
        self.last = claim.class();

        if claim.is_structured() {
            self.settle_pending();
            if self.has_name() {
                self.name_phase = NamePhase::Locked;
            }
        }

        match claim {
            Claim::Name(word) => {
                self.settle_pending();
                if word.chars().any(is_cjk) {
                    self.cn_words.push(word);
                } else {
                    self.en_words.push(word);
                }
            }
            Claim::PendingName(digits) => {
                self.name_phase = NamePhase::Pending(digits);
            }
            Claim::Part(part) => set_once(&mut self.part, part),
            Claim::Year(year) => set_once(&mut self.year, year),
            Claim::Resolution(res) => set_once(&mut self.resolution, res),
            Claim::Season(season) => self.season(season),
            Claim::Episode(episode) => self.episode(episode),
            Claim::SeasonEpisode {
                season,
                episode,
                episode_end,
            } => {
                self.season(season);
                self.episode(episode);
                if let Some(end) = episode_end {
                    self.extend_episode(end);
                }
            }
            Claim::SeasonEnd(end) => self.extend_season(end),
            Claim::EpisodeEnd(end) => self.extend_episode(end),
            Claim::Source(source) => set_once(&mut self.source, source),
            Claim::Effect(effect) => {
                if !self.effects.contains(&effect) {
                    self.effects.push(effect);
                }
            }
            Claim::VideoCodec(codec) => set_once(&mut self.video_codec, codec),
            Claim::BitDepth(depth) => set_once(&mut self.bit_depth, depth),
            Claim::AudioCodec(codec) => {
                if !self.audio.contains(&codec) {
                    self.audio.push(codec);
                }
            }
            Claim::AudioSuffix(suffix) => {
                if let Some(codec) = self.audio.last_mut() {
                    codec.push(' ');
                    codec.push_str(&suffix);
                }
            }
            Claim::Marker | Claim::Ignored => {}
        }
        self
    }

    /// A pending number turns into name material.
    fn settle_pending(&mut self) {
        if let NamePhase::Pending(digits) = std::mem::take(&mut self.name_phase)
        {
            self.en_words.push(digits);
        }
    }

    fn season(&mut self, season: u32) {
        match self.begin_season {
            None => self.begin_season = Some(season),
            Some(_) => self.extend_season(season),
        }
    }

    fn episode(&mut self, episode: u32) {
        match self.begin_episode {
            None => self.begin_episode = Some(episode),
            Some(_) => self.extend_episode(episode),
        }
    }

    fn extend_season(&mut self, end: u32) {
        if let Some(begin) = self.begin_season
            && end > begin
            && self.end_season.is_none()
        {
            self.end_season = Some(end);
        }
    }

    fn extend_episode(&mut self, end: u32) {
        if let Some(begin) = self.begin_episode
            && end > begin
            && self.end_episode.is_none()
        {
            self.end_episode = Some(end);
        }
    }

    /// Builds the descriptor. `kind` is TV with any season or episode and
    /// Movie otherwise.
    pub fn finish(mut self, original: &str) -> MediaDescriptor {
        self.settle_pending();

        let mut desc = MediaDescriptor::new(original);
        desc.cn_name = join_words(&self.cn_words);
        desc.en_name = join_words(&self.en_words).map(|name| title_case(&name));
        desc.year = self.year;
        desc.begin_season = self.begin_season;
        desc.end_season = self.end_season;
        desc.begin_episode = self.begin_episode;
        desc.end_episode = self.end_episode;
        desc.part_marker = self.part.filter(|part| part != "PART");
        desc.resource_type = self.source.or_else(|| self.effects.first().cloned());
        desc.resource_effect =
            (!self.effects.is_empty()).then(|| self.effects.join(" "));
        desc.resource_resolution = self.resolution;
        desc.video_codec = match (self.video_codec, self.bit_depth) {
            (Some(codec), Some(depth)) => Some(format!("{codec} {depth}")),
            (codec, _) => codec,
        };
        desc.audio_codec = join_words(&self.audio);
        desc.kind = kind_from_evidence(&desc);
        desc
    }
}

/// TV when any season or episode is known, otherwise Movie.
pub fn kind_from_evidence(desc: &MediaDescriptor) -> MediaKind {
    if desc.has_series_evidence() {
        MediaKind::Tv
    } else {
        MediaKind::Movie
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

fn join_words(words: &[String]) -> Option<String> {
    let joined = words.join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Upper-cases the first letter of each word and leaves the rest alone.
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn plausible_year(digits: &str) -> Option<u16> {
    digits.parse().ok().filter(|y| YEAR_RANGE.contains(y))
}

/// Classifies `token` given the state so far and the following token.
pub fn classify(
    state: &ParseState,
    token: &str,
    next: Option<&str>,
) -> Classified {
    let upper = token.to_uppercase();
    let next_upper = next.map(str::to_uppercase);
    structured(state, token, &upper, next, next_upper.as_deref())
        .unwrap_or_else(|| Classified::one(name_claim(state, token)))
}

fn structured(
    state: &ParseState,
    token: &str,
    upper: &str,
    next: Option<&str>,
    next_upper: Option<&str>,
) -> Option<Classified> {
    let all_digits =
        !upper.is_empty() && upper.chars().all(|c| c.is_ascii_digit());

    // A plausible year outranks a season or episode continuation.
    if FOUR_DIGITS_RE.is_match(upper)
        && (state.has_name() || state.has_pending())
        && let Some(year) = plausible_year(upper)
    {
        return Some(Classified::one(Claim::Year(year)));
    }

    // Bare numbers right after a season or episode token continue its run.
    if all_digits && upper.len() <= 4 {
        let n: u32 = upper.parse().ok()?;
        match state.last() {
            TokenClass::Season => {
                let extends = upper.len() <= 2
                    && state.end_season.is_none()
                    && state.begin_season.is_some_and(|b| n > b);
                return Some(Classified::one(if extends {
                    Claim::SeasonEnd(n)
                } else {
                    Claim::Ignored
                }));
            }
            TokenClass::Episode => {
                let extends = state.end_episode.is_none()
                    && state.begin_episode.is_some_and(|b| n > b);
                return Some(Classified::one(if extends {
                    Claim::EpisodeEnd(n)
                } else {
                    Claim::Ignored
                }));
            }
            _ => {}
        }
    }

    if let Some(part) = part_claim(state, upper, next_upper) {
        return Some(part);
    }

    if let Some(resolution) = resolution(upper) {
        return Some(Classified::one(Claim::Resolution(resolution)));
    }

    if let Some(caps) = SEASON_EPISODE_RE.captures(upper) {
        let number = |i: usize| -> Option<u32> {
            caps.get(i).and_then(|m| m.as_str().parse().ok())
        };
        if let (Some(season), Some(episode)) = (number(1), number(2)) {
            return Some(Classified::one(Claim::SeasonEpisode {
                season,
                episode,
                episode_end: number(3),
            }));
        }
    }
    if let Some(caps) = SEASON_RE.captures(upper)
        && let Ok(season) = caps[1].parse()
    {
        return Some(Classified::one(Claim::Season(season)));
    }
    if let Some(caps) = EPISODE_RE.captures(upper)
        && let Ok(episode) = caps[1].parse()
    {
        return Some(Classified::one(Claim::Episode(episode)));
    }
    if matches!(upper, "SEASON" | "EPISODE")
        && let Some(n) = next_upper.and_then(|n| n.parse::<u32>().ok())
    {
        let claim = if upper == "SEASON" {
            Claim::Season(n)
        } else {
            Claim::Episode(n)
        };
        return Some(Classified::two(claim));
    }

    if upper == "WEB" && next_upper == Some("DL") {
        return Some(Classified::two(Claim::Source("WEB-DL".into())));
    }
    if upper == "BLU" && next_upper == Some("RAY") {
        return Some(Classified::two(Claim::Source("BLURAY".into())));
    }
    if let Some(tag) = source_tag(upper) {
        return Some(Classified::one(Claim::Source(tag.into())));
    }
    if let Some(tag) = effect_tag(upper) {
        return Some(Classified::one(Claim::Effect(tag.into())));
    }

    if matches!(upper, "H" | "X")
        && let Some(n) = next
        && matches!(n, "264" | "265")
    {
        return Some(Classified::two(Claim::VideoCodec(format!("{token}{n}"))));
    }
    if VIDEO_CODEC_RE.is_match(upper) {
        return Some(Classified::one(Claim::VideoCodec(token.to_string())));
    }
    if BIT_DEPTH_RE.is_match(upper) {
        return Some(Classified::one(Claim::BitDepth(token.to_lowercase())));
    }

    if AUDIO_CODEC_RE.is_match(upper) {
        return Some(Classified::one(Claim::AudioCodec(token.to_string())));
    }
    if state.last() == TokenClass::AudioCodec && AUDIO_SUFFIX_RE.is_match(upper)
    {
        return Some(Classified::one(Claim::AudioSuffix(upper.to_string())));
    }

    if upper == "AKA" || is_noise(upper) || CN_SE_TOKEN_RE.is_match(token) {
        return Some(Classified::one(Claim::Marker));
    }

    None
}

fn part_claim(
    state: &ParseState,
    upper: &str,
    next_upper: Option<&str>,
) -> Option<Classified> {
    if !state.has_name() {
        return None;
    }
    let caps = PART_RE.captures(upper)?;
    let marker = &caps[1];
    if caps.get(2).is_some() {
        return Some(Classified::one(Claim::Part(upper.to_string())));
    }
    match next_upper {
        Some(suffix) if PART_SUFFIX_RE.is_match(suffix) => {
            Some(Classified::two(Claim::Part(format!("{marker}{suffix}"))))
        }
        // A bare disc marker is a source tag, a bare PART is dropped later.
        _ if marker == "PART" => Some(Classified::one(Claim::Part(upper.to_string()))),
        _ => None,
    }
}

fn resolution(upper: &str) -> Option<String> {
    if let Some(caps) = RESOLUTION_RE.captures(upper) {
        return Some(format!("{}{}", &caps[1], caps[2].to_lowercase()));
    }
    if let Some(caps) = RESOLUTION_DIMENSIONS_RE.captures(upper) {
        return Some(format!("{}p", &caps[1]));
    }
    if let Some(caps) = RESOLUTION_K_RE.captures(upper) {
        return Some(format!("{}k", &caps[1]));
    }
    None
}

fn name_claim(state: &ParseState, token: &str) -> Claim {
    if token.is_empty() || state.name_locked() {
        return Claim::Ignored;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return match token.len() {
            0..=2 => Claim::Name(token.to_string()),
            4 if !state.has_name() && !state.has_pending() => {
                Claim::PendingName(token.to_string())
            }
            _ => Claim::Ignored,
        };
    }
    Claim::Name(token.to_string())
}

/// Folds `tokens` through [`classify`] and [`ParseState::apply`].
pub fn fold_tokens<S: AsRef<str>>(tokens: &[S]) -> ParseState {
    tokens
        .iter()
        .enumerate()
        .fold(ParseState::default(), |state, (i, token)| {
            if state.skip_next() {
                return state.skipped();
            }
            let next = tokens.get(i + 1).map(AsRef::as_ref);
            let classified = classify(&state, token.as_ref(), next);
            state.apply(classified)
        })
}
