//! Line classifier for hand-history and tournament-summary text.
//!
//! Exporter versions drift, so everything here is matched by pattern rather
//! than by column. The classifier is stateless; the hand reconstructor decides
//! what a line means in context.

use std::sync::LazyLock;

use regex::Regex;

use crate::amount::{chips_or_zero, parse_chips, Cents};

static RE_HAND_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Poker Hand #([A-Za-z0-9]+)?").unwrap());
static RE_TOURNAMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Tournament\s*#(\d+)").unwrap());
static RE_SEAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Seat \d+: ([^()]+?) \(([-\d,]+) in chips\)").unwrap());
static RE_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<p>[^:]+): (?P<act>posts|bets|calls|raises|all-in|checks|folds)\b(?P<rest>.*)$")
        .unwrap()
});
static RE_FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*").unwrap());
static RE_RAISE_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"raises [\d,]+ to ([\d,]+)").unwrap());
static RE_UNCALLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Uncalled bet \(([\d,]+)\) returned to (.+)$").unwrap());
static RE_COLLECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]+?) collected ([\d,]+) from (?:the )?(?:main |side )?pot").unwrap()
});

static RE_BUY_IN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Buy[- ]?In\s*:.*?\$([\d,.]+)").unwrap());
static RE_PLAYERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Players\s*:\D*?(\d+)").unwrap());
static RE_PLAYERS_TRAILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+Players").unwrap());
static RE_START_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Start\s*Time\s*:[ \t]*([\d\-/: \t]+)").unwrap());
static RE_PLACE_PRIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)\s+place[^\n$]*\n?[^\n$]*\$([\d,.]+)").unwrap()
});

/// Betting verbs understood by the action accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// `posts the ante`: dead money outside the street's betting.
    Ante,
    Post,
    Bet,
    Call,
    Raise,
    AllIn,
    Check,
    Fold,
}

impl ActionKind {
    fn from_verb(verb: &str) -> Option<Self> {
        Some(match verb {
            "posts" => ActionKind::Post,
            "bets" => ActionKind::Bet,
            "calls" => ActionKind::Call,
            "raises" => ActionKind::Raise,
            "all-in" => ActionKind::AllIn,
            "checks" => ActionKind::Check,
            "folds" => ActionKind::Fold,
            _ => return None,
        })
    }
}

/// One classified hand-history line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandLine<'a> {
    /// `Poker Hand #<id>: ...`
    HandStart { source_id: Option<&'a str> },
    /// `Seat N: <name> (<stack> in chips)`
    Seat { name: &'a str, stack: u64 },
    HoleCards,
    /// Flop, turn and river separators.
    Street,
    Showdown,
    Summary,
    Action {
        player: &'a str,
        kind: ActionKind,
        /// First chip number after the verb (zero when absent or malformed).
        amount: u64,
        /// The `to Y` total of a raise, when present.
        raise_to: Option<u64>,
    },
    Uncalled { player: &'a str, amount: u64 },
    Collected { player: &'a str, amount: u64 },
    Blank,
    Other,
}

/// Classify a single line of a hand history.
pub fn classify(line: &str) -> HandLine<'_> {
    let line = line.trim_start_matches('\u{feff}').trim_end();
    if line.trim().is_empty() {
        return HandLine::Blank;
    }

    if let Some(marker) = line.strip_prefix("*** ") {
        return if marker.starts_with("HOLE") {
            HandLine::HoleCards
        } else if marker.starts_with("SHOWDOWN") {
            HandLine::Showdown
        } else if marker.starts_with("SUMMARY") {
            HandLine::Summary
        } else {
            HandLine::Street
        };
    }

    if let Some(caps) = RE_HAND_START.captures(line) {
        return HandLine::HandStart {
            source_id: caps.get(1).map(|m| m.as_str()),
        };
    }

    if let Some(caps) = RE_SEAT.captures(line) {
        return HandLine::Seat {
            name: caps.get(1).map_or("", |m| m.as_str().trim()),
            stack: chips_or_zero(&caps[2]),
        };
    }

    if let Some(caps) = RE_UNCALLED.captures(line) {
        return HandLine::Uncalled {
            player: caps.get(2).map_or("", |m| m.as_str().trim()),
            amount: chips_or_zero(&caps[1]),
        };
    }

    if let Some(caps) = RE_COLLECTED.captures(line) {
        return HandLine::Collected {
            player: caps.get(1).map_or("", |m| m.as_str().trim()),
            amount: chips_or_zero(&caps[2]),
        };
    }

    if let Some(caps) = RE_ACTION.captures(line) {
        let Some(mut kind) = ActionKind::from_verb(&caps["act"]) else {
            return HandLine::Other;
        };
        let rest = caps.name("rest").map_or("", |m| m.as_str());
        if kind == ActionKind::Post && rest.contains("ante") {
            kind = ActionKind::Ante;
        }
        let amount = RE_FIRST_NUMBER
            .find(rest)
            .map_or(0, |m| chips_or_zero(m.as_str()));
        let raise_to = RE_RAISE_TO
            .captures(line)
            .and_then(|c| parse_chips(&c[1]));
        return HandLine::Action {
            player: caps.name("p").map_or("", |m| m.as_str().trim()),
            kind,
            amount,
            raise_to,
        };
    }

    HandLine::Other
}

/// First `Tournament #<id>` in a document.
pub fn tournament_id(text: &str) -> Option<String> {
    RE_TOURNAMENT_ID.captures(text).map(|c| c[1].to_string())
}

/// Buy-in amount (`Buy-in: ... $10`).
pub fn buy_in(text: &str) -> Option<Cents> {
    RE_BUY_IN.captures(text).and_then(|c| Cents::parse(&c[1]))
}

/// Registered player count (`Players: 18` or `18 Players`).
pub fn player_count(text: &str) -> Option<u32> {
    RE_PLAYERS
        .captures(text)
        .or_else(|| RE_PLAYERS_TRAILING.captures(text))
        .and_then(|c| c[1].parse().ok())
}

/// Raw start timestamp text, trimmed.
pub fn start_time(text: &str) -> Option<&str> {
    RE_START_TIME
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// First generic `<n>th place ... $<prize>` block.
pub fn place_and_prize(text: &str) -> Option<(u32, Cents)> {
    let caps = RE_PLACE_PRIZE.captures(text)?;
    Some((caps[1].parse().ok()?, Cents::parse(&caps[2])?))
}

/// Pattern for the hero's own finish block (`25th : Hero ... $16.37`).
///
/// The name is matched literally; `case_sensitive = false` folds case.
pub fn hero_finish_pattern(hero: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    let flags = if case_sensitive { "" } else { "(?i)" };
    Regex::new(&format!(
        r"(\d+)(?:st|nd|rd|th) :[ \t]*{flags}{}(?-i)[^\n$]*\$([\d,.]+)",
        regex::escape(hero)
    ))
}

/// Last match of the hero finish pattern; the final block is authoritative.
pub fn hero_place_and_prize(pattern: &Regex, text: &str) -> Option<(u32, Cents)> {
    let caps = pattern.captures_iter(text).last()?;
    Some((caps[1].parse().ok()?, Cents::parse(&caps[2])?))
}

/// Marker heuristics used to route a document before parsing.
pub fn looks_like_summary(text: &str) -> bool {
    text.contains("Tournament #")
        && text.to_lowercase().contains("buy")
        && text.contains("place")
}

pub fn looks_like_hand_history(text: &str) -> bool {
    text.contains("Poker Hand #")
        || text.contains("Hand #")
        || (text.contains("Table") && text.contains("Seat"))
}
