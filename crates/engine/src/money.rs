use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for **all** monetary values in the engine (balances,
/// transfer and fund-request amounts) to avoid floating-point drift.
/// Persisted amounts are fixed-point with 2 fraction digits and at most 10
/// total digits, so the absolute value never exceeds [`Money::MAX`]
/// (99,999,999.99).
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (rejects more than 2 decimals and amounts above
/// the 10-digit cap):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("40".parse::<Money>().unwrap().minor(), 4000);
/// assert_eq!("0.05".parse::<Money>().unwrap().minor(), 5);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest representable amount: 10 digits total, 2 of them fractional.
    pub const MAX: Money = Money(99_999_999_99);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Returns `true` if the amount fits the persisted 10-digit fixed-point
    /// representation.
    #[must_use]
    pub const fn in_range(self) -> bool {
        self.0.unsigned_abs() <= Money::MAX.0 as u64
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{units}.{minor:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts an optional leading `+`/`-` and a `.` decimal separator.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - max 10 digits total (rejects `123456789.00`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || LedgerError::Validation("empty amount".to_string());
        let invalid = || LedgerError::Validation("invalid amount".to_string());
        let too_large = || LedgerError::Validation("amount exceeds 10 digits".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        if rest.is_empty() {
            return Err(empty());
        }

        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let minor_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let minor: i64 = match minor_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => {
                        return Err(LedgerError::Validation("too many decimals".to_string()));
                    }
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(too_large)?;
        if total > Money::MAX.0 {
            return Err(too_large());
        }

        Ok(Money(sign * total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_fixed_point() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(4000).to_string(), "40.00");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_plain_and_decimal() {
        assert_eq!("40".parse::<Money>().unwrap().minor(), 4000);
        assert_eq!("40.00".parse::<Money>().unwrap().minor(), 4000);
        assert_eq!("0.5".parse::<Money>().unwrap().minor(), 50);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().minor(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("0.001".parse::<Money>().is_err());
    }

    #[test]
    fn parse_rejects_amounts_beyond_ten_digits() {
        assert_eq!("99999999.99".parse::<Money>().unwrap(), Money::MAX);
        assert!("100000000.00".parse::<Money>().is_err());
    }

    #[test]
    fn range_guard_matches_cap() {
        assert!(Money::MAX.in_range());
        assert!(Money::new(-Money::MAX.minor()).in_range());
        assert!(!Money::new(Money::MAX.minor() + 1).in_range());
    }
}
