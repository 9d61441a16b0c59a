//! Chip and currency amounts as they appear in log text.
//!
//! Chips are whole numbers with optional thousands separators (`1,500`).
//! Currency is parsed into integer [`Cents`] so bounty arithmetic stays exact.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Parse a chip count such as `"12,500"`.
///
/// Returns `None` for empty or malformed input; callers that must not fail
/// (the action accumulator) treat that as zero.
pub fn parse_chips(text: &str) -> Option<u64> {
    let digits: String = text.trim().chars().filter(|&c| c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Like [`parse_chips`] but malformed input counts as zero.
pub fn chips_or_zero(text: &str) -> u64 {
    parse_chips(text).unwrap_or(0)
}

/// A currency amount in hundredths.
///
/// Operators saturate at the `i64` bounds instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Build from a whole-unit float, rounding to the nearest cent.
    pub fn from_units(units: f64) -> Self {
        Cents((units * 100.0).round() as i64)
    }

    /// Parse `"1,234.5"`, `"$16.37"` or `"10"`.
    ///
    /// Fractions beyond two digits are truncated.
    pub fn parse(text: &str) -> Option<Self> {
        let cleaned: String = text
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|&c| c != ',')
            .collect();
        let (whole, frac) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().ok()? * 10,
            _ => frac[..2].parse().ok()?,
        };
        whole.checked_mul(100)?.checked_add(frac).map(Cents)
    }

    pub fn as_units(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Cents> {
        self.0.checked_mul(rhs).map(Cents)
    }

    pub fn saturating_mul(self, rhs: i64) -> Cents {
        Cents(self.0.saturating_mul(rhs))
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<i64> for Cents {
    type Output = Cents;

    fn mul(self, rhs: i64) -> Cents {
        Cents(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
