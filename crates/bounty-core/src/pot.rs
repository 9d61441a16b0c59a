//! Main and side pots rebuilt from final contributions.
//!
//! [`build_pots`] layers the contributions into tiers; [`assign_winners`]
//! spreads each player's declared collection over the pots they could win,
//! most specific side pot first.

use serde::Serialize;

use crate::ledger::{Collections, Contributions, PlayerMap};

/// One layer of the contribution structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pot {
    /// Chips in this layer.
    pub size: u64,
    /// Players whose contribution reached this layer, in first-seen order.
    pub eligible: Vec<String>,
    /// Eligible players credited with part of this layer.
    pub winners: Vec<String>,
}

impl Pot {
    pub fn new(size: u64, eligible: Vec<String>) -> Self {
        Self {
            size,
            eligible,
            winners: Vec::new(),
        }
    }

    pub fn is_eligible(&self, name: &str) -> bool {
        self.eligible.iter().any(|p| p == name)
    }

    pub fn is_winner(&self, name: &str) -> bool {
        self.winners.iter().any(|p| p == name)
    }

    /// More than one player shared this pot.
    pub fn is_split(&self) -> bool {
        self.winners.len() > 1
    }

    fn credit(&mut self, name: &str) {
        if !self.is_winner(name) {
            self.winners.push(name.to_string());
        }
    }
}

/// Build the ordered pot list, main pot first.
///
/// Each distinct positive contribution is a tier. A tier's layer holds
/// `(tier - previous tier) * |players at or above tier|` chips. Players with
/// a zero or negative contribution never appear in any pot.
pub fn build_pots(contributions: &Contributions) -> Vec<Pot> {
    let mut tiers: Vec<u64> = contributions
        .iter()
        .filter(|&(_, v)| v > 0)
        .map(|(_, v)| v as u64)
        .collect();
    tiers.sort_unstable();
    tiers.dedup();

    let mut pots = Vec::with_capacity(tiers.len());
    let mut prev = 0;
    for tier in tiers {
        let eligible: Vec<String> = contributions
            .iter()
            .filter(|&(_, v)| v > 0 && v as u64 >= tier)
            .map(|(name, _)| name.to_string())
            .collect();
        let size = (tier - prev).saturating_mul(eligible.len() as u64);
        pots.push(Pot::new(size, eligible));
        prev = tier;
    }
    pots
}

/// Indices of `pots` ordered by ascending eligible-set size.
///
/// The sort is stable, so pots of equal size keep build order. Both the
/// winner assigner and the knockout attributor walk pots in this order.
pub fn by_eligible_size(pots: &[Pot]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pots.len()).collect();
    order.sort_by_key(|&i| pots[i].eligible.len());
    order
}

/// Mark the winners of every pot from the hand's collection ledger.
///
/// Pots are visited smallest eligible set first so a player who only won a
/// side pot is not credited with the larger pot. Any chips left unexplained
/// go to the first eligible player, so a non-empty pot always has a winner.
pub fn assign_winners(mut pots: Vec<Pot>, collections: &Collections) -> Vec<Pot> {
    let mut remaining: PlayerMap<u64> = collections.iter().map(|(n, v)| (n.to_string(), v)).collect();

    for idx in by_eligible_size(&pots) {
        let pot = &mut pots[idx];
        let mut left = pot.size;
        for name in pot.eligible.clone() {
            let owed = remaining.get(&name);
            if owed == 0 || left == 0 {
                continue;
            }
            let take = owed.min(left);
            pot.credit(&name);
            *remaining.slot(&name) -= take;
            left -= take;
        }

        if left > 0
            && let Some(first) = pot.eligible.first().cloned()
        {
            tracing::trace!(residual = left, player = %first, "unexplained pot residual");
            pot.credit(&first);
        }
    }
    pots
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rng;
    use rand::seq::SliceRandom;

    fn ledger<V: Copy + Default>(entries: &[(&str, V)]) -> PlayerMap<V> {
        entries.iter().map(|&(n, v)| (n.to_string(), v)).collect()
    }

    fn total(pots: &[Pot]) -> u64 {
        pots.iter().map(|p| p.size).sum()
    }

    #[test]
    fn single_main_pot() {
        let pots = build_pots(&ledger(&[("A", 100), ("B", 100)]));
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].size, 200);
        assert_eq!(pots[0].eligible, vec!["A", "B"]);
    }

    #[test]
    fn short_all_in_creates_side_pot() {
        let pots = build_pots(&ledger(&[("A", 500), ("B", 200), ("C", 500)]));
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].size, 600);
        assert_eq!(pots[0].eligible, vec!["A", "B", "C"]);
        assert_eq!(pots[1].size, 600);
        assert_eq!(pots[1].eligible, vec!["A", "C"]);
    }

    #[test]
    fn non_positive_contributions_are_never_eligible() {
        let pots = build_pots(&ledger(&[("A", 100), ("B", 100), ("C", -50), ("D", 0)]));
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].size, 200);
        assert!(!pots[0].is_eligible("C"));
        assert!(!pots[0].is_eligible("D"));
    }

    #[test]
    fn empty_ledger_has_no_pots() {
        assert!(build_pots(&Contributions::new()).is_empty());
        assert!(build_pots(&ledger(&[("C", -50)])).is_empty());
    }

    #[test]
    fn chips_are_conserved() {
        let mut entries = vec![("A", 1200), ("B", 300), ("C", 300), ("D", 50), ("E", 4000), ("F", 1200)];
        let expected: i64 = entries.iter().map(|&(_, v)| v).sum();
        for _ in 0..10 {
            entries.shuffle(&mut rng());
            let pots = build_pots(&ledger(&entries));
            assert_eq!(total(&pots), expected as u64);
            // Every tier shrinks the field, main pot first.
            assert!(pots.windows(2).all(|w| w[0].eligible.len() > w[1].eligible.len()));
        }
    }

    #[test]
    fn sole_collector_wins_main_pot() {
        let pots = build_pots(&ledger(&[("A", 100), ("B", 100)]));
        let pots = assign_winners(pots, &ledger(&[("A", 200)]));
        assert_eq!(pots[0].winners, vec!["A"]);
    }

    #[test]
    fn side_pot_winner_not_credited_with_main_pot() {
        // B is all-in for 200 and wins the main pot; C beats A for the side pot.
        let pots = build_pots(&ledger(&[("A", 500), ("B", 200), ("C", 500)]));
        let pots = assign_winners(pots, &ledger(&[("B", 600), ("C", 600)]));
        assert_eq!(pots[0].winners, vec!["B"]);
        assert_eq!(pots[1].winners, vec!["C"]);
    }

    #[test]
    fn split_pot_has_two_winners() {
        let pots = build_pots(&ledger(&[("A", 300), ("B", 300), ("Hero", 300)]));
        let pots = assign_winners(pots, &ledger(&[("A", 450), ("Hero", 450)]));
        assert_eq!(pots[0].winners, vec!["A", "Hero"]);
        assert!(pots[0].is_split());
    }

    #[test]
    fn unexplained_pot_still_gets_a_winner() {
        let pots = build_pots(&ledger(&[("A", 500), ("B", 200), ("C", 500)]));
        let pots = assign_winners(pots, &Collections::new());
        for pot in &pots {
            assert!(pot.size > 0);
            assert_eq!(pot.winners.len(), 1);
            assert_eq!(pot.winners[0], pot.eligible[0]);
        }
    }

    #[test]
    fn every_positive_pot_has_a_winner_under_partial_collections() {
        let contributions = ledger(&[("A", 50), ("B", 400), ("C", 900), ("D", 900)]);
        let collections = ledger(&[("C", 700)]);
        let pots = assign_winners(build_pots(&contributions), &collections);
        assert!(pots.iter().all(|p| p.size == 0 || !p.winners.is_empty()));
    }
}
