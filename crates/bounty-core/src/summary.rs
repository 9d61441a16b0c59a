//! Tournament summary facts.
//!
//! A summary names the buy-in, the field size and the hero's finish with the
//! total prize paid. The prize is split into the flat top-three payout and the
//! bounty, and the bounty is decomposed into buckets.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use crate::amount::Cents;
use crate::bounty::{BountyInput, BucketCounts, BucketUnit, decompose, reconcile_player_count};
use crate::config::AnalyzerConfig;
use crate::error::{DataWarning, ParseError};
use crate::lexer;

const START_TIME_FORMATS: [&str; 2] = ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Places are normalized onto a nine-seat table.
const NORMALIZED_SEATS: u32 = 9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentSummary {
    pub tournament_id: Option<String>,
    pub buy_in: Cents,
    /// Field size after reconciliation with the finish place.
    pub player_count: u32,
    pub finish_place: u32,
    pub total_prize: Cents,
    pub base_payout: Cents,
    pub bounty: Cents,
    pub buckets: BucketCounts,
    pub remainder: Cents,
    pub start_time: Option<NaiveDateTime>,
    pub warnings: Vec<DataWarning>,
}

impl TournamentSummary {
    /// Finish place scaled onto a nine-seat table, `1..=9`.
    pub fn normalized_place(&self) -> u32 {
        normalized_place(self.finish_place, self.player_count)
    }
}

pub fn normalized_place(finish_place: u32, player_count: u32) -> u32 {
    let players = u64::from(player_count.max(1));
    let scaled = (u64::from(finish_place) * u64::from(NORMALIZED_SEATS)).div_ceil(players);
    scaled.clamp(1, u64::from(NORMALIZED_SEATS)) as u32
}

fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parses summaries for one hero.
#[derive(Debug, Clone)]
pub struct SummaryParser {
    finish: Regex,
    unit: BucketUnit,
    default_player_count: u32,
}

impl SummaryParser {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ParseError> {
        Ok(Self {
            finish: lexer::hero_finish_pattern(config.hero.trim(), config.hero_case_sensitive)?,
            unit: config.bucket_unit,
            default_player_count: config.default_player_count.max(1),
        })
    }

    pub fn parse(&self, text: &str) -> Result<TournamentSummary, ParseError> {
        let (finish_place, total_prize) = lexer::hero_place_and_prize(&self.finish, text)
            .or_else(|| lexer::place_and_prize(text))
            .ok_or(ParseError::MissingField("finish place"))?;
        if finish_place == 0 {
            return Err(ParseError::InvalidField {
                field: "finish place",
                value: finish_place.to_string(),
            });
        }

        let mut warnings = Vec::new();

        let buy_in = lexer::buy_in(text).unwrap_or_else(|| {
            tracing::warn!("summary has no buy-in");
            warnings.push(DataWarning::BuyInMissing);
            Cents::ZERO
        });

        let parsed_count = lexer::player_count(text).unwrap_or_else(|| {
            tracing::debug!(assumed = self.default_player_count, "summary has no player count");
            warnings.push(DataWarning::PlayerCountMissing {
                assumed: self.default_player_count,
            });
            self.default_player_count
        });
        let (player_count, correction) = reconcile_player_count(finish_place, parsed_count);
        warnings.extend(correction);

        let start_time = lexer::start_time(text).and_then(parse_start_time);

        let split = decompose(
            &BountyInput {
                finish_place,
                buy_in,
                player_count,
                total_prize,
            },
            self.unit,
        );

        let summary = TournamentSummary {
            tournament_id: lexer::tournament_id(text),
            buy_in,
            player_count,
            finish_place,
            total_prize,
            base_payout: split.base_payout,
            bounty: split.bounty,
            buckets: split.buckets,
            remainder: split.remainder,
            start_time,
            warnings,
        };
        tracing::debug!(
            tournament = ?summary.tournament_id,
            place = finish_place,
            players = player_count,
            prize = %total_prize,
            bounty = %summary.bounty,
            "parsed summary"
        );
        Ok(summary)
    }
}
