//! Exact currency amounts.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// A US-dollar amount held as whole cents.
///
/// Obligations can be negative (de-obligations). Sums are exact, so the
/// per-applicant totals always add up to the grand total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency amount '{0}'")]
pub struct MoneyParseError(pub String);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Round a floating-point dollar amount to the nearest cent.
    pub fn from_dollars_f64(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() {
            return None;
        }
        let cents = (dollars * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parse `[-]digits[.digits]` exactly; anything else goes through `f64`.
    fn parse_exact(s: &str) -> Option<Self> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().ok()? * 10,
            _ => frac.parse().ok()?,
        };
        let cents = whole.checked_mul(100)?.checked_add(frac)?;
        Some(Self(if negative { -cents } else { cents }))
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Blank input is zero; more than two fraction digits are rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        Self::parse_exact(trimmed)
            .or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Self::from_dollars_f64)
            })
            .ok_or_else(|| MoneyParseError(s.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a dollar amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {v} out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom(format!("amount {v} out of range")))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_dollars_f64(v).ok_or_else(|| E::custom(format!("amount {v} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(Money::from_cents(35_050).to_string(), "350.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-1_200).to_string(), "-12.00");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_parse_exact_forms() {
        assert_eq!("350.50".parse::<Money>().unwrap(), Money::from_cents(35_050));
        assert_eq!("350.5".parse::<Money>().unwrap(), Money::from_cents(35_050));
        assert_eq!("100".parse::<Money>().unwrap(), Money::from_cents(10_000));
        assert_eq!("-0.99".parse::<Money>().unwrap(), Money::from_cents(-99));
        assert_eq!(".25".parse::<Money>().unwrap(), Money::from_cents(25));
        assert_eq!("  ".parse::<Money>().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_parse_rounds_extra_precision() {
        assert_eq!("10.006".parse::<Money>().unwrap(), Money::from_cents(1_001));
        assert_eq!("1e3".parse::<Money>().unwrap(), Money::from_cents(100_000));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("twelve".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!("NaN".parse::<Money>().is_err());
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Money = [
            Money::from_cents(10_000),
            Money::from_cents(25_050),
            Money::from_cents(-50),
        ]
        .iter()
        .sum();
        assert_eq!(total, Money::from_cents(35_000));
    }

    #[test]
    fn test_float_amounts_do_not_drift() {
        let total: Money = std::iter::repeat(0.1)
            .take(10)
            .filter_map(Money::from_dollars_f64)
            .sum();
        assert_eq!(total, Money::from_cents(100));
    }

    #[test]
    fn test_deserialize_number_string_and_null() {
        let v: Vec<Money> = serde_json::from_str(r#"[1250.75, 3, "4.10", null]"#).unwrap();
        assert_eq!(
            v,
            vec![
                Money::from_cents(125_075),
                Money::from_cents(300),
                Money::from_cents(410),
                Money::ZERO
            ]
        );
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(-35_050)).unwrap();
        assert_eq!(json, r#""-350.50""#);
    }
}
