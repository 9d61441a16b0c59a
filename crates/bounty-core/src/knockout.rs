//! Elimination detection and hero knockout attribution.

use serde::Serialize;

use crate::hand::Hand;
use crate::pot::{Pot, by_eligible_size};

/// Matches the tracked player's display name.
#[derive(Debug, Clone)]
pub struct HeroMatcher {
    name: String,
    case_sensitive: bool,
}

impl HeroMatcher {
    pub fn new(name: &str, case_sensitive: bool) -> Self {
        Self {
            name: name.trim().to_string(),
            case_sensitive,
        }
    }

    /// Exact, case-sensitive match on `name`.
    pub fn exact(name: &str) -> Self {
        Self::new(name, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn matches(&self, candidate: &str) -> bool {
        if self.case_sensitive {
            candidate == self.name
        } else {
            candidate.to_lowercase() == self.name.to_lowercase()
        }
    }

    /// Total collected by the hero in `hand`.
    pub fn collected(&self, hand: &Hand) -> u64 {
        hand.collections
            .iter()
            .filter(|&(name, _)| self.matches(name))
            .fold(0, |acc, (_, amount)| acc.saturating_add(amount))
    }

    fn won(&self, pot: &Pot) -> bool {
        pot.winners.iter().any(|w| self.matches(w))
    }
}

/// One elimination caused by the hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnockoutFact {
    /// Synthetic sequence id of the hand (`hand-<n>`).
    pub hand_id: String,
    /// Exporter's hand number, when known.
    pub source_hand_id: Option<String>,
    pub eliminated: String,
    /// Hero's total collection in the hand.
    pub amount: u64,
    /// The busting pot was split between the hero and someone else.
    pub multi_way: bool,
}

/// Players seated in `current` and missing from `next`.
///
/// Without a following hand nothing can be inferred, so the last hand of a
/// document never reports eliminations.
pub fn eliminated(current: &Hand, next: Option<&Hand>) -> Vec<String> {
    let Some(next) = next else {
        return Vec::new();
    };
    current
        .seats
        .names()
        .filter(|name| !next.is_seated(name))
        .map(str::to_string)
        .collect()
}

/// The smallest pot each player was eligible for, as `(player, pot index)`.
///
/// Pots are scanned once by ascending eligible-set size; a player keeps the
/// first pot they are found in and later matches are ignored.
pub fn busting_pots(hand: &Hand) -> Vec<(&str, usize)> {
    let mut map: Vec<(&str, usize)> = Vec::new();
    for idx in by_eligible_size(&hand.pots) {
        for name in &hand.pots[idx].eligible {
            if !map.iter().any(|(n, _)| *n == name.as_str()) {
                map.push((name.as_str(), idx));
            }
        }
    }
    map
}

/// Knockout facts for the hero among `eliminated` players of `hand`.
pub fn attribute(hand: &Hand, eliminated: &[String], hero: &HeroMatcher) -> Vec<KnockoutFact> {
    if eliminated.is_empty() {
        return Vec::new();
    }
    let busting = busting_pots(hand);
    let amount = hero.collected(hand);

    eliminated
        .iter()
        .filter_map(|bust| {
            let &(_, idx) = busting.iter().find(|(name, _)| *name == bust.as_str())?;
            let pot = &hand.pots[idx];
            if !hero.won(pot) {
                return None;
            }
            tracing::debug!(hand = hand.index, player = %bust, multi_way = pot.is_split(), "hero knockout");
            Some(KnockoutFact {
                hand_id: hand.id(),
                source_hand_id: hand.source_id.clone(),
                eliminated: bust.clone(),
                amount,
                multi_way: pot.is_split(),
            })
        })
        .collect()
}

/// Walk consecutive hand pairs and collect every hero knockout.
pub fn knockouts(hands: &[Hand], hero: &HeroMatcher) -> Vec<KnockoutFact> {
    hands
        .iter()
        .enumerate()
        .flat_map(|(i, hand)| {
            let gone = eliminated(hand, hands.get(i + 1));
            attribute(hand, &gone, hero)
        })
        .collect()
}
