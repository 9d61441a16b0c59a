//! Hand reconstruction.
//!
//! A hand-history document is a run of hands, each a header, a seat listing,
//! the betting, an optional showdown, and a summary block closed by a blank
//! line. [`reconstruct_hands`] walks the lines once through a small state
//! machine and emits one immutable [`Hand`] per header.

use serde::Serialize;

use crate::ledger::{ActionAccumulator, Collections, Contributions, SeatSnapshot};
use crate::lexer::{HandLine, classify};
use crate::pot::{Pot, assign_winners, build_pots};

/// A fully reconstructed hand.
#[derive(Debug, Clone, Serialize)]
pub struct Hand {
    /// Position of the hand within its document, from zero.
    pub index: usize,
    /// Exporter's own hand number, when the header carries one.
    pub source_id: Option<String>,
    pub seats: SeatSnapshot,
    pub contributions: Contributions,
    pub collections: Collections,
    pub pots: Vec<Pot>,
}

impl Hand {
    /// Build a hand from finished ledgers: pots, then winners.
    pub fn from_ledgers(
        index: usize,
        source_id: Option<String>,
        seats: SeatSnapshot,
        contributions: Contributions,
        collections: Collections,
    ) -> Self {
        let pots = assign_winners(build_pots(&contributions), &collections);
        Self {
            index,
            source_id,
            seats,
            contributions,
            collections,
            pots,
        }
    }

    /// Synthetic sequence id (`hand-<index>`), stable within a document.
    pub fn id(&self) -> String {
        format!("hand-{}", self.index)
    }

    pub fn is_seated(&self, name: &str) -> bool {
        self.seats.contains(name)
    }

    pub fn total_pot(&self) -> u64 {
        self.pots.iter().fold(0, |acc, p| acc.saturating_add(p.size))
    }
}

/// Where the scanner is inside a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Seats,
    Actions,
    Collections,
    SummarySkip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
}

struct HandBuilder {
    index: usize,
    source_id: Option<String>,
    stage: Stage,
    seats: SeatSnapshot,
    actions: ActionAccumulator,
    collections: Collections,
}

impl HandBuilder {
    fn new(index: usize, source_id: Option<&str>) -> Self {
        Self {
            index,
            source_id: source_id.map(str::to_string),
            stage: Stage::Seats,
            seats: SeatSnapshot::new(),
            actions: ActionAccumulator::new(),
            collections: Collections::new(),
        }
    }

    fn feed(&mut self, line: &HandLine<'_>) -> Step {
        match (self.stage, line) {
            (Stage::Seats, HandLine::Seat { name, stack }) => {
                self.seats.insert(name, *stack);
            }
            // Blinds and antes are posted before the hole-cards marker.
            (Stage::Seats, HandLine::Action { .. }) => self.actions.apply(line),
            (Stage::Seats, HandLine::HoleCards) => self.stage = Stage::Actions,

            (Stage::Actions, HandLine::Action { .. } | HandLine::Uncalled { .. } | HandLine::Street) => {
                self.actions.apply(line)
            }

            (Stage::Actions | Stage::Collections, HandLine::Collected { player, amount }) => {
                let slot = self.collections.slot(player);
                *slot = slot.saturating_add(*amount);
            }
            (Stage::Collections, HandLine::Uncalled { .. }) => self.actions.apply(line),

            (Stage::Seats | Stage::Actions, HandLine::Showdown) => {
                if self.stage == Stage::Seats {
                    tracing::debug!(hand = self.index, "no hole-cards marker before showdown");
                }
                self.stage = Stage::Collections;
            }
            (Stage::Seats | Stage::Actions | Stage::Collections, HandLine::Summary) => {
                if self.stage == Stage::Seats {
                    tracing::debug!(hand = self.index, "no hole-cards marker before summary");
                }
                self.stage = Stage::SummarySkip;
            }

            (Stage::SummarySkip, HandLine::Blank) => return Step::Done,
            _ => {}
        }
        Step::Continue
    }

    fn finish(self) -> Hand {
        Hand::from_ledgers(
            self.index,
            self.source_id,
            self.seats,
            self.actions.finish(),
            self.collections,
        )
    }
}

/// Reconstruct every hand in a hand-history document, in order.
///
/// A hand ends at the blank line after its summary block, at the next
/// header, or at the end of the text, whichever comes first. Lines outside
/// any hand are ignored.
pub fn reconstruct_hands(text: &str) -> Vec<Hand> {
    let mut hands = Vec::new();
    let mut current: Option<HandBuilder> = None;

    for raw in text.lines() {
        let line = classify(raw);
        if let HandLine::HandStart { source_id } = line {
            if let Some(builder) = current.take() {
                hands.push(builder.finish());
            }
            current = Some(HandBuilder::new(hands.len(), source_id));
            continue;
        }
        let done = current
            .as_mut()
            .is_some_and(|builder| builder.feed(&line) == Step::Done);
        if done && let Some(builder) = current.take() {
            hands.push(builder.finish());
        }
    }
    if let Some(builder) = current.take() {
        hands.push(builder.finish());
    }

    tracing::debug!(hands = hands.len(), "reconstructed hands");
    hands
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Compact hand text builder for tests.
    pub(crate) fn hand_text(id: &str, seats: &[(&str, u64)], body: &[&str], collected: &[(&str, u64)]) -> String {
        let mut out = format!("Poker Hand #{id}: Tournament #777, Mystery Battle Royale $10 Hold'em No Limit\n");
        out.push_str("Table '1' 9-max Seat #1 is the button\n");
        for (i, (name, stack)) in seats.iter().enumerate() {
            out.push_str(&format!("Seat {}: {} ({} in chips)\n", i + 1, name, stack));
        }
        out.push_str("*** HOLE CARDS ***\n");
        for line in body {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("*** SHOWDOWN ***\n");
        for (name, amount) in collected {
            out.push_str(&format!("{name} collected {amount} from pot\n"));
        }
        out.push_str("*** SUMMARY ***\n");
        out.push_str("Total pot 0 | Rake 0 | Jackpot 0 | Bingo 0\n");
        for (i, (name, _)) in seats.iter().enumerate() {
            out.push_str(&format!("Seat {}: {} folded before Flop\n", i + 1, name));
        }
        out.push('\n');
        out
    }

    #[test]
    fn reconstructs_a_heads_up_all_in() {
        let text = hand_text(
            "TM1",
            &[("A", 1000), ("B", 100)],
            &["A: posts big blind 100", "B: calls 100 and is all-in"],
            &[("A", 200)],
        );
        let hands = reconstruct_hands(&text);
        assert_eq!(hands.len(), 1);

        let hand = &hands[0];
        assert_eq!(hand.id(), "hand-0");
        assert_eq!(hand.source_id.as_deref(), Some("TM1"));
        assert_eq!(hand.seats.get("A"), 1000);
        assert_eq!(hand.seats.get("B"), 100);
        assert_eq!(hand.contributions.get("A"), 100);
        assert_eq!(hand.contributions.get("B"), 100);
        assert_eq!(hand.collections.get("A"), 200);
        assert_eq!(hand.pots.len(), 1);
        assert_eq!(hand.pots[0].size, 200);
        assert_eq!(hand.pots[0].winners, vec!["A"]);
    }

    #[test]
    fn summary_seat_lines_do_not_leak_into_seats() {
        let text = hand_text("TM1", &[("A", 500), ("B", 500)], &["A: folds"], &[]);
        let hands = reconstruct_hands(&text);
        assert_eq!(hands[0].seats.len(), 2);
    }

    #[test]
    fn blinds_before_hole_cards_are_counted() {
        let text = "Poker Hand #TM9: Tournament #1\n\
                    Seat 1: A (1,000 in chips)\n\
                    Seat 2: B (1,000 in chips)\n\
                    A: posts the ante 10\n\
                    B: posts the ante 10\n\
                    A: posts small blind 50\n\
                    B: posts big blind 100\n\
                    *** HOLE CARDS ***\n\
                    A: folds\n\
                    Uncalled bet (50) returned to B\n\
                    B collected 120 from pot\n\
                    *** SUMMARY ***\n\
                    Total pot 120\n\n";
        let hand = &reconstruct_hands(text)[0];
        assert_eq!(hand.contributions.get("A"), 60);
        assert_eq!(hand.contributions.get("B"), 60);
        assert_eq!(hand.collections.get("B"), 120);
        assert_eq!(hand.total_pot(), 120);
        assert_eq!(hand.pots[0].winners, vec!["B"]);
    }

    #[test]
    fn multiple_hands_split_on_headers_and_blank_lines() {
        let mut text = String::from("garbage before the first hand\n\n");
        text.push_str(&hand_text("TM1", &[("A", 500), ("B", 500)], &["A: folds"], &[]));
        text.push_str(&hand_text("TM2", &[("A", 500)], &[], &[]));
        let hands = reconstruct_hands(&text);
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[1].index, 1);
        assert_eq!(hands[1].source_id.as_deref(), Some("TM2"));
    }

    #[test]
    fn truncated_hand_is_still_emitted() {
        let text = "Poker Hand #TM1: Tournament #1\nSeat 1: A (500 in chips)\nA: posts big blind 20";
        let hands = reconstruct_hands(text);
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].contributions.get("A"), 20);
    }

    #[test]
    fn collections_without_showdown_marker() {
        let text = "Poker Hand #TM1: Tournament #1\n\
                    Seat 1: A (500 in chips)\n\
                    Seat 2: B (500 in chips)\n\
                    *** HOLE CARDS ***\n\
                    A: bets 100\n\
                    B: calls 100\n\
                    A collected 200 from pot\n\
                    *** SUMMARY ***\n";
        let hand = &reconstruct_hands(text)[0];
        assert_eq!(hand.collections.get("A"), 200);
        assert_eq!(hand.pots[0].winners, vec!["A"]);
    }

    #[test]
    fn empty_text_has_no_hands() {
        assert!(reconstruct_hands("").is_empty());
        assert!(reconstruct_hands("Tournament #1\nnothing else").is_empty());
    }
}
