//! Bounty decomposition into multiplier buckets.
//!
//! A finish in the top three pays a flat multiple of the buy-in; everything
//! above that is bounty. The bounty is then greedily broken into x10000,
//! x1000, x100, x10 and x2 buckets, largest first.

use serde::{Deserialize, Serialize};

use crate::amount::Cents;
use crate::error::DataWarning;

/// A canonical bounty size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    X2,
    X10,
    X100,
    X1000,
    X10000,
}

impl Bucket {
    /// Extraction order: largest multiplier first.
    pub const DESCENDING: [Bucket; 5] = [
        Bucket::X10000,
        Bucket::X1000,
        Bucket::X100,
        Bucket::X10,
        Bucket::X2,
    ];

    pub fn multiplier(self) -> i64 {
        match self {
            Bucket::X2 => 2,
            Bucket::X10 => 10,
            Bucket::X100 => 100,
            Bucket::X1000 => 1_000,
            Bucket::X10000 => 10_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::X2 => "x2",
            Bucket::X10 => "x10",
            Bucket::X100 => "x100",
            Bucket::X1000 => "x1000",
            Bucket::X10000 => "x10000",
        }
    }
}

/// Knockout counts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub x2: u32,
    pub x10: u32,
    pub x100: u32,
    pub x1000: u32,
    pub x10000: u32,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::X2 => self.x2,
            Bucket::X10 => self.x10,
            Bucket::X100 => self.x100,
            Bucket::X1000 => self.x1000,
            Bucket::X10000 => self.x10000,
        }
    }

    fn set(&mut self, bucket: Bucket, count: u32) {
        match bucket {
            Bucket::X2 => self.x2 = count,
            Bucket::X10 => self.x10 = count,
            Bucket::X100 => self.x100 = count,
            Bucket::X1000 => self.x1000 = count,
            Bucket::X10000 => self.x10000 = count,
        }
    }

    pub fn total(&self) -> u32 {
        Bucket::DESCENDING.iter().map(|&b| self.get(b)).sum()
    }
}

/// What one bucket multiplier is a multiple of.
///
/// The buy-in is the natural unit. A fixed unit prices every bucket at
/// `multiplier * unit` regardless of the buy-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketUnit {
    #[default]
    BuyIn,
    Fixed(f64),
}

impl BucketUnit {
    fn price(self, buy_in: Cents) -> Cents {
        match self {
            BucketUnit::BuyIn => buy_in,
            BucketUnit::Fixed(units) => Cents::from_units(units),
        }
    }
}

/// Inputs for one tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BountyInput {
    /// 1-based finish place.
    pub finish_place: u32,
    pub buy_in: Cents,
    pub player_count: u32,
    /// Total prize including any bounty.
    pub total_prize: Cents,
}

/// Result of a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decomposition {
    pub base_payout: Cents,
    pub bounty: Cents,
    pub buckets: BucketCounts,
    /// Bounty left after every bucket was extracted.
    pub remainder: Cents,
}

/// Flat top-three payout: 4x, 3x and 2x the buy-in.
///
/// A payout past `i64::MAX` cents saturates; no real prize can exceed it, so
/// the bounty is zero either way.
pub fn base_payout(finish_place: u32, buy_in: Cents) -> Cents {
    match finish_place {
        1 => buy_in.saturating_mul(4),
        2 => buy_in.saturating_mul(3),
        3 => buy_in.saturating_mul(2),
        _ => Cents::ZERO,
    }
}

/// Raise an impossible player count to the finish place.
///
/// A count of zero or one below the finish place cannot be right; the
/// corrected value is returned along with a warning describing it.
pub fn reconcile_player_count(finish_place: u32, player_count: u32) -> (u32, Option<DataWarning>) {
    if player_count == 0 || player_count < finish_place {
        let corrected = finish_place.max(1);
        tracing::warn!(parsed = player_count, corrected, "player count below finish place");
        (
            corrected,
            Some(DataWarning::PlayerCountCorrected {
                parsed: player_count,
                corrected,
            }),
        )
    } else {
        (player_count, None)
    }
}

/// Greedy decomposition of the bounty portion of `input.total_prize`.
///
/// `input.player_count` is expected to be reconciled already; each bucket is
/// capped at `player_count - 1` knockouts.
pub fn decompose(input: &BountyInput, unit: BucketUnit) -> Decomposition {
    let base = base_payout(input.finish_place, input.buy_in);
    let bounty = if input.total_prize > base {
        input.total_prize - base
    } else {
        Cents::ZERO
    };

    let mut buckets = BucketCounts::default();
    let unit_price = unit.price(input.buy_in);
    if !input.buy_in.is_positive() || !unit_price.is_positive() {
        return Decomposition {
            base_payout: base,
            bounty,
            buckets,
            remainder: bounty,
        };
    }

    let cap = i64::from(input.player_count.saturating_sub(1));
    let mut remaining = bounty;
    for bucket in Bucket::DESCENDING {
        // An unrepresentable price is larger than any bounty: zero of that bucket.
        let Some(price) = unit_price.checked_mul(bucket.multiplier()) else {
            tracing::debug!(bucket = bucket.label(), buy_in = %input.buy_in, "bucket price overflows");
            continue;
        };
        let count = (remaining.0 / price.0).min(cap);
        // count <= remaining / price, so the product stays in range.
        remaining = remaining - price * count;
        buckets.set(bucket, count as u32);
    }

    Decomposition {
        base_payout: base,
        bounty,
        buckets,
        remainder: remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(finish_place: u32, buy_in: f64, player_count: u32, total_prize: f64) -> BountyInput {
        BountyInput {
            finish_place,
            buy_in: Cents::from_units(buy_in),
            player_count,
            total_prize: Cents::from_units(total_prize),
        }
    }

    #[test]
    fn base_payout_schedule() {
        let b = Cents::from_units(10.0);
        assert_eq!(base_payout(1, b), Cents::from_units(40.0));
        assert_eq!(base_payout(2, b), Cents::from_units(30.0));
        assert_eq!(base_payout(3, b), Cents::from_units(20.0));
        assert_eq!(base_payout(4, b), Cents::ZERO);
        assert_eq!(base_payout(0, b), Cents::ZERO);
    }

    #[test]
    fn worked_example_with_unit_of_one() {
        let d = decompose(&input(1, 10.0, 9, 834.0), BucketUnit::Fixed(1.0));
        assert_eq!(d.base_payout, Cents::from_units(40.0));
        assert_eq!(d.bounty, Cents::from_units(794.0));
        assert_eq!(
            d.buckets,
            BucketCounts { x2: 7, x10: 8, x100: 7, x1000: 0, x10000: 0 }
        );
        assert_eq!(d.remainder, Cents::ZERO);
    }

    #[test]
    fn buy_in_priced_buckets() {
        // 1st of 18 at $10: bounty $1,060 is one x100 ($1,000) and three x2 ($20).
        let d = decompose(&input(1, 10.0, 18, 1100.0), BucketUnit::BuyIn);
        assert_eq!(d.bounty, Cents::from_units(1060.0));
        assert_eq!(d.buckets, BucketCounts { x2: 3, x10: 0, x100: 1, x1000: 0, x10000: 0 });
        assert_eq!(d.remainder, Cents::ZERO);
    }

    #[test]
    fn prize_below_base_payout_has_no_bounty() {
        let d = decompose(&input(2, 10.0, 18, 25.0), BucketUnit::BuyIn);
        assert_eq!(d.bounty, Cents::ZERO);
        assert_eq!(d.buckets.total(), 0);
    }

    #[test]
    fn zero_buy_in_yields_empty_buckets() {
        let d = decompose(&input(5, 0.0, 18, 500.0), BucketUnit::BuyIn);
        assert_eq!(d.buckets, BucketCounts::default());
        assert_eq!(d.remainder, d.bounty);
        let d = decompose(&input(5, 0.0, 18, 500.0), BucketUnit::Fixed(1.0));
        assert_eq!(d.buckets, BucketCounts::default());
    }

    #[test]
    fn counts_never_exceed_field_size() {
        for players in 1..=12 {
            for prize in [0.0, 19.99, 250.0, 9_999.0, 123_456.78, 2_500_000.0] {
                let d = decompose(&input(7.min(players), 1.0, players, prize), BucketUnit::BuyIn);
                for bucket in Bucket::DESCENDING {
                    assert!(d.buckets.get(bucket) <= players - 1);
                }
                assert!(d.remainder >= Cents::ZERO);
                let spent: i64 = Bucket::DESCENDING
                    .iter()
                    .map(|&b| i64::from(d.buckets.get(b)) * b.multiplier() * 100)
                    .sum();
                assert_eq!(Cents(spent) + d.remainder, d.bounty);
            }
        }
    }

    #[test]
    fn huge_buy_in_does_not_overflow() {
        // $1e15 buy-in: the x100 and larger prices exceed i64 cents.
        let buy_in = Cents::parse("1,000,000,000,000,000").unwrap();
        let input = BountyInput {
            finish_place: 5,
            buy_in,
            player_count: 9,
            total_prize: Cents::from_units(10.0),
        };
        let d = decompose(&input, BucketUnit::BuyIn);
        assert_eq!(d.buckets, BucketCounts::default());
        assert_eq!(d.remainder, Cents::from_units(10.0));

        let first = BountyInput { finish_place: 1, buy_in: Cents(i64::MAX), ..input };
        let d = decompose(&first, BucketUnit::BuyIn);
        assert_eq!(d.base_payout, Cents(i64::MAX));
        assert_eq!(d.bounty, Cents::ZERO);

        let d = decompose(&input, BucketUnit::Fixed(1e30));
        assert_eq!(d.buckets, BucketCounts::default());
    }

    #[test]
    fn player_count_is_raised_to_finish_place() {
        let (count, warning) = reconcile_player_count(5, 0);
        assert_eq!(count, 5);
        assert_eq!(
            warning,
            Some(DataWarning::PlayerCountCorrected { parsed: 0, corrected: 5 })
        );

        let d = decompose(&input(5, 1.0, count, 60.0), BucketUnit::BuyIn);
        assert!(Bucket::DESCENDING.iter().all(|&b| d.buckets.get(b) <= 4));
        assert_eq!(d.buckets.x10, 4);
        assert_eq!(d.buckets.x2, 4);
        assert_eq!(d.remainder, Cents::from_units(12.0));

        assert_eq!(reconcile_player_count(3, 2).0, 3);
        assert_eq!(reconcile_player_count(3, 9), (9, None));
    }
}
