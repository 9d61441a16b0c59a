//! Document routing and per-document outcomes.
//!
//! Each input file is one document: either a hand history or a tournament
//! summary. [`Analyzer`] turns a document's text into a fact, and every
//! document ends in exactly one [`Outcome`]. A bad document never stops a
//! batch.

use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::error::ParseError;
use crate::hand::{Hand, reconstruct_hands};
use crate::knockout::{HeroMatcher, KnockoutFact, knockouts};
use crate::lexer;
use crate::summary::{SummaryParser, TournamentSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    HandHistory,
    TournamentSummary,
}

impl DocumentKind {
    /// Classify by markers. A `Poker Hand #` header always means a hand
    /// history; otherwise summary markers are checked before the looser
    /// hand-history ones.
    pub fn detect(text: &str) -> Option<Self> {
        if text.contains("Poker Hand #") {
            Some(DocumentKind::HandHistory)
        } else if lexer::looks_like_summary(text) {
            Some(DocumentKind::TournamentSummary)
        } else if lexer::looks_like_hand_history(text) {
            Some(DocumentKind::HandHistory)
        } else {
            None
        }
    }
}

/// Terminal state of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Success(T),
    /// Nothing to extract; not an error.
    Skipped(String),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Skipped(reason) => Outcome::Skipped(reason),
            Outcome::Failed(reason) => Outcome::Failed(reason),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Facts extracted from one hand-history document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandHistoryReport {
    pub tournament_id: Option<String>,
    pub hands_count: usize,
    pub knockouts: Vec<KnockoutFact>,
    /// Mean seat stack of the first hand; zero when it lists no seats.
    pub average_initial_stack: f64,
}

impl HandHistoryReport {
    pub fn from_hands(tournament_id: Option<String>, hands: &[Hand], hero: &HeroMatcher) -> Self {
        let average_initial_stack = hands
            .first()
            .filter(|h| !h.seats.is_empty())
            .map_or(0.0, |h| {
                let total: u64 = h.seats.iter().map(|(_, stack)| stack).sum();
                total as f64 / h.seats.len() as f64
            });
        Self {
            tournament_id,
            hands_count: hands.len(),
            knockouts: knockouts(hands, hero),
            average_initial_stack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    HandHistory(HandHistoryReport),
    Summary(TournamentSummary),
}

/// Stateless per-document processor; cheap to share between tasks.
#[derive(Debug, Clone)]
pub struct Analyzer {
    hero: HeroMatcher,
    summary: SummaryParser,
    max_finish_place: Option<u32>,
}

impl Analyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ParseError> {
        Ok(Self {
            hero: config.hero_matcher(),
            summary: SummaryParser::new(config)?,
            max_finish_place: config.max_finish_place,
        })
    }

    pub fn hero(&self) -> &HeroMatcher {
        &self.hero
    }

    pub fn hand_history(&self, text: &str) -> Outcome<HandHistoryReport> {
        let hands = reconstruct_hands(text);
        if hands.is_empty() {
            return Outcome::Skipped("no hands found".to_string());
        }
        let report = HandHistoryReport::from_hands(lexer::tournament_id(text), &hands, &self.hero);
        tracing::debug!(
            tournament = ?report.tournament_id,
            hands = report.hands_count,
            knockouts = report.knockouts.len(),
            "hand history processed"
        );
        Outcome::Success(report)
    }

    pub fn summary(&self, text: &str) -> Outcome<TournamentSummary> {
        let summary = match self.summary.parse(text) {
            Ok(summary) => summary,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        if let Some(limit) = self.max_finish_place
            && summary.finish_place > limit
        {
            return Outcome::Skipped(format!("finished {} (limit {limit})", summary.finish_place));
        }
        Outcome::Success(summary)
    }

    pub fn process(&self, kind: DocumentKind, text: &str) -> Outcome<Fact> {
        match kind {
            DocumentKind::HandHistory => self.hand_history(text).map(Fact::HandHistory),
            DocumentKind::TournamentSummary => self.summary(text).map(Fact::Summary),
        }
    }

    /// Detect the kind, then process.
    pub fn analyze(&self, text: &str) -> Outcome<Fact> {
        match DocumentKind::detect(text) {
            Some(kind) => self.process(kind, text),
            None => Outcome::Skipped("unrecognised document".to_string()),
        }
    }
}

/// One document that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub source: String,
    pub skipped: bool,
    pub reason: String,
}

/// Running tally of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub problems: Vec<Problem>,
}

impl BatchReport {
    pub fn record<T>(&mut self, source: &str, outcome: &Outcome<T>) {
        match outcome {
            Outcome::Success(_) => self.succeeded += 1,
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                tracing::debug!(source, %reason, "document skipped");
                self.problems.push(Problem {
                    source: source.to_string(),
                    skipped: true,
                    reason: reason.clone(),
                });
            }
            Outcome::Failed(reason) => {
                self.failed += 1;
                tracing::warn!(source, %reason, "document failed");
                self.problems.push(Problem {
                    source: source.to_string(),
                    skipped: false,
                    reason: reason.clone(),
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}
