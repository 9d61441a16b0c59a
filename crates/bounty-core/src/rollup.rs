//! Per-tournament merge of summary and hand-history facts.
//!
//! A tournament usually arrives as one summary plus one or more hand-history
//! files. Summaries own the field size; hand histories own the starting
//! stack. Knockouts from every hand-history document are concatenated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::HandHistoryReport;
use crate::knockout::KnockoutFact;
use crate::summary::TournamentSummary;

/// Which value wins when two documents of one tournament disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Keep the value from the first document merged.
    #[default]
    First,
    /// Replace with every later document.
    Last,
    /// Keep the larger value.
    Max,
}

impl Precedence {
    fn prefers_incoming<T: PartialOrd>(self, current: &T, incoming: &T) -> bool {
        match self {
            Precedence::First => false,
            Precedence::Last => true,
            Precedence::Max => incoming > current,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TournamentRecord {
    pub tournament_id: String,
    pub summary: Option<TournamentSummary>,
    pub average_initial_stack: Option<f64>,
    pub hands_count: usize,
    pub knockouts: Vec<KnockoutFact>,
    pub summary_documents: usize,
    pub hand_history_documents: usize,
}

impl TournamentRecord {
    fn new(tournament_id: &str) -> Self {
        Self {
            tournament_id: tournament_id.to_string(),
            ..Self::default()
        }
    }

    pub fn player_count(&self) -> Option<u32> {
        self.summary.as_ref().map(|s| s.player_count)
    }

    pub fn knockout_count(&self) -> usize {
        self.knockouts.len()
    }

    pub fn multi_way_count(&self) -> usize {
        self.knockouts.iter().filter(|k| k.multi_way).count()
    }
}

/// Tournament records keyed by id, in id order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rollup {
    #[serde(skip)]
    precedence: Precedence,
    tournaments: BTreeMap<String, TournamentRecord>,
}

impl Rollup {
    pub fn new(precedence: Precedence) -> Self {
        Self {
            precedence,
            tournaments: BTreeMap::new(),
        }
    }

    fn record(&mut self, tournament_id: &str) -> &mut TournamentRecord {
        self.tournaments
            .entry(tournament_id.to_string())
            .or_insert_with(|| TournamentRecord::new(tournament_id))
    }

    /// Merge a summary. Returns `false` when it has no tournament id.
    pub fn add_summary(&mut self, summary: TournamentSummary) -> bool {
        let Some(id) = summary.tournament_id.clone() else {
            tracing::debug!("summary without tournament id left out of rollup");
            return false;
        };
        let precedence = self.precedence;
        let record = self.record(&id);
        record.summary_documents += 1;
        let replace = match &record.summary {
            None => true,
            Some(current) => {
                if current.player_count != summary.player_count {
                    tracing::warn!(
                        tournament = %id,
                        current = current.player_count,
                        incoming = summary.player_count,
                        ?precedence,
                        "conflicting player counts"
                    );
                }
                precedence.prefers_incoming(&current.player_count, &summary.player_count)
            }
        };
        if replace {
            record.summary = Some(summary);
        }
        true
    }

    /// Merge a hand-history report. Returns `false` when it has no tournament id.
    pub fn add_hand_history(&mut self, report: HandHistoryReport) -> bool {
        let Some(id) = report.tournament_id.clone() else {
            tracing::debug!("hand history without tournament id left out of rollup");
            return false;
        };
        let precedence = self.precedence;
        let record = self.record(&id);
        record.hand_history_documents += 1;
        record.hands_count += report.hands_count;
        record.knockouts.extend(report.knockouts);

        // A zero average means the document carried no seat listing.
        if report.average_initial_stack > 0.0 {
            record.average_initial_stack = Some(match record.average_initial_stack {
                Some(current) if !precedence.prefers_incoming(&current, &report.average_initial_stack) => current,
                _ => report.average_initial_stack,
            });
        }
        true
    }

    pub fn get(&self, tournament_id: &str) -> Option<&TournamentRecord> {
        self.tournaments.get(tournament_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &TournamentRecord> {
        self.tournaments.values()
    }

    pub fn len(&self) -> usize {
        self.tournaments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tournaments.is_empty()
    }
}
