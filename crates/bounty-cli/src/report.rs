//! Human-readable and JSON output for a finished batch.

use std::fmt::Write;

use serde::Serialize;

use bounty_core::bounty::Bucket;
use bounty_core::document::BatchReport;
use bounty_core::rollup::{Rollup, TournamentRecord};

#[derive(Serialize)]
struct JsonReport<'a> {
    batch: &'a BatchReport,
    tournaments: Vec<&'a TournamentRecord>,
}

pub fn render_json(batch: &BatchReport, rollup: &Rollup) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        batch,
        tournaments: rollup.records().collect(),
    })
}

fn render_record(out: &mut String, record: &TournamentRecord) {
    let _ = writeln!(out, "Tournament #{}", record.tournament_id);

    if let Some(s) = &record.summary {
        let _ = writeln!(
            out,
            "  finish   {} of {} (normalized {}), prize ${}, buy-in ${}",
            s.finish_place,
            s.player_count,
            s.normalized_place(),
            s.total_prize,
            s.buy_in
        );
        let buckets: Vec<String> = Bucket::DESCENDING
            .iter()
            .rev()
            .map(|&b| format!("{} {}", b.label(), s.buckets.get(b)))
            .collect();
        let _ = writeln!(
            out,
            "  bounty   ${} = {} + ${} remainder",
            s.bounty,
            buckets.join(", "),
            s.remainder
        );
        for warning in &s.warnings {
            let _ = writeln!(out, "  warning  {warning}");
        }
    }

    if record.hand_history_documents > 0 {
        let _ = writeln!(
            out,
            "  hands    {} in {} file(s), average starting stack {:.0}",
            record.hands_count,
            record.hand_history_documents,
            record.average_initial_stack.unwrap_or(0.0)
        );
        let _ = writeln!(
            out,
            "  knockouts {} ({} multi-way)",
            record.knockout_count(),
            record.multi_way_count()
        );
        for ko in &record.knockouts {
            let source = ko.source_hand_id.as_deref().unwrap_or(&ko.hand_id);
            let _ = writeln!(
                out,
                "    {} in {}{}",
                ko.eliminated,
                source,
                if ko.multi_way { " (split)" } else { "" }
            );
        }
    }
}

pub fn render_text(batch: &BatchReport, rollup: &Rollup) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} documents: {} succeeded, {} skipped, {} failed",
        batch.total(),
        batch.succeeded,
        batch.skipped,
        batch.failed
    );
    for problem in &batch.problems {
        let status = if problem.skipped { "skipped" } else { "failed" };
        let _ = writeln!(out, "  {status:<8} {}: {}", problem.source, problem.reason);
    }

    for record in rollup.records() {
        out.push('\n');
        render_record(&mut out, record);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::batch::tests::{HAND_HISTORY, SUMMARY};
    use crate::batch::{Processed, tally};
    use bounty_core::config::AnalyzerConfig;
    use bounty_core::document::{Analyzer, Outcome};
    use bounty_core::rollup::Precedence;

    fn sample() -> (BatchReport, Rollup) {
        let analyzer = Arc::new(Analyzer::new(&AnalyzerConfig::default()).unwrap());
        let processed = vec![
            Processed {
                source: PathBuf::from("a/hands.txt"),
                outcome: analyzer.analyze(HAND_HISTORY),
            },
            Processed {
                source: PathBuf::from("a/summary.txt"),
                outcome: analyzer.analyze(SUMMARY),
            },
            Processed {
                source: PathBuf::from("b/broken.txt"),
                outcome: Outcome::Failed("missing required field: finish place".to_string()),
            },
        ];
        tally(processed, Precedence::First)
    }

    #[test]
    fn text_report_lists_problems_and_tournaments() {
        let (batch, rollup) = sample();
        let text = render_text(&batch, &rollup);
        assert!(text.starts_with("3 documents: 2 succeeded, 0 skipped, 1 failed\n"));
        assert!(text.contains("failed   b/broken.txt: missing required field: finish place"));
        assert!(text.contains("Tournament #555"));
        assert!(text.contains("finish   1 of 9 (normalized 1), prize $834.00, buy-in $10.00"));
        assert!(text.contains("knockouts 1 (0 multi-way)"));
        assert!(text.contains("Villain in TM1"));
    }

    #[test]
    fn json_report_is_structured() {
        let (batch, rollup) = sample();
        let value: serde_json::Value = serde_json::from_str(&render_json(&batch, &rollup).unwrap()).unwrap();
        assert_eq!(value["batch"]["succeeded"], 2);
        assert_eq!(value["batch"]["problems"][0]["source"], "b/broken.txt");
        let tournament = &value["tournaments"][0];
        assert_eq!(tournament["tournament_id"], "555");
        assert_eq!(tournament["knockouts"][0]["eliminated"], "Villain");
        assert_eq!(tournament["summary"]["player_count"], 9);
    }
}
