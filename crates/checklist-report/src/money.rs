//! Exact money arithmetic in øre
//!
//! Captured prices are decimal kroner. They are converted once, rounding
//! half away from zero, and every total after that is an integer sum, so a
//! displayed total always equals the sum of the displayed lines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in øre (1/100 krone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

/// Largest kroner magnitude accepted from captured input
const MAX_KRONER: f64 = 1.0e13;

impl Money {
    pub const ZERO: Money = Money(0);

    /// From whole øre
    #[inline]
    #[must_use]
    pub const fn from_ore(ore: i64) -> Self {
        Self(ore)
    }

    /// From decimal kroner, `None` for non-finite or absurd values
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_kroner(kroner: f64) -> Option<Self> {
        if !kroner.is_finite() || kroner.abs() > MAX_KRONER {
            return None;
        }
        Some(Self((kroner * 100.0).round() as i64))
    }

    /// Amount in øre
    #[inline]
    #[must_use]
    pub const fn ore(self) -> i64 {
        self.0
    }

    /// `quantity × self`, rounded to whole øre
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn times(self, quantity: f64) -> Option<Self> {
        if !quantity.is_finite() {
            return None;
        }
        let total = (quantity * self.0 as f64).round();
        if total.abs() > MAX_KRONER * 100.0 {
            return None;
        }
        Some(Self(total as i64))
    }

    #[inline]
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum that reports overflow instead of wrapping
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }
}

/// Norwegian formatting: space-grouped kroner, comma, two-digit øre
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let kroner = (abs / 100).to_string();
        let mut grouped = String::with_capacity(kroner.len() + kroner.len() / 3);
        for (i, digit) in kroner.chars().enumerate() {
            if i > 0 && (kroner.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(digit);
        }
        write!(f, "{sign}{grouped},{:02}", abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kroner_round_half_away_from_zero() {
        assert_eq!(Money::from_kroner(450.0), Some(Money::from_ore(45_000)));
        assert_eq!(Money::from_kroner(0.125), Some(Money::from_ore(13)));
        assert_eq!(Money::from_kroner(-0.125), Some(Money::from_ore(-13)));
        assert_eq!(Money::from_kroner(f64::NAN), None);
        assert_eq!(Money::from_kroner(f64::INFINITY), None);
    }

    #[test]
    fn times_rounds_to_ore() {
        let unit = Money::from_ore(95_000);
        assert_eq!(unit.times(1.5), Some(Money::from_ore(142_500)));
        assert_eq!(Money::from_ore(333).times(0.5), Some(Money::from_ore(167)));
        assert_eq!(unit.times(f64::NAN), None);
    }

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Money::from_ore(0).to_string(), "0,00");
        assert_eq!(Money::from_ore(90_000).to_string(), "900,00");
        assert_eq!(Money::from_ore(123_456_789).to_string(), "1 234 567,89");
        assert_eq!(Money::from_ore(-105).to_string(), "-1,05");
    }

    #[test]
    fn checked_sum_detects_overflow() {
        assert_eq!(
            Money::checked_sum([Money::from_ore(1), Money::from_ore(2)]),
            Some(Money::from_ore(3))
        );
        assert_eq!(Money::checked_sum([Money::from_ore(i64::MAX), Money::from_ore(1)]), None);
    }
}
