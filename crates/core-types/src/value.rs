use crate::enums::DataType;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A single table cell.
///
/// `Null` marks a missing value. It never equals a join key on the other side,
/// is skipped by aggregates and sorts below every non-null value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// The type of the cell, or `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(DataType::Integer),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Text(_) => Some(DataType::Text),
            Value::Date(_) => Some(DataType::Date),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell. Integers widen to `Decimal`.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(v) => Some(Decimal::from(*v)),
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Decimal(_) => 2,
            Value::Text(_) => 3,
            Value::Date(_) => 4,
        }
    }
}

/// Rounds to `dp` decimal places, half away from zero, and pads the scale so
/// `100` renders as `100.00`. Already-rounded values are returned unchanged.
pub fn round_fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.scale() < dp {
        rounded.rescale(dp);
    }
    rounded
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn null_sorts_below_everything() {
        assert!(Value::Null < Value::Integer(i64::MIN));
        assert!(Value::Null < Value::Decimal(dec!(-1000)));
        assert!(Value::Null < Value::Text(String::new()));
    }

    #[test]
    fn decimals_with_different_scale_are_equal() {
        assert_eq!(Value::Decimal(dec!(2.0)), Value::Decimal(dec!(2.00)));
        assert_eq!(
            Value::Decimal(dec!(2.0)).cmp(&Value::Decimal(dec!(2.00))),
            Ordering::Equal
        );
    }

    #[test]
    fn round_fixed_is_half_away_from_zero() {
        assert_eq!(round_fixed(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_fixed(dec!(-2.345), 2), dec!(-2.35));
        assert_eq!(round_fixed(dec!(2.344), 2), dec!(2.34));
    }

    #[test]
    fn round_fixed_is_idempotent() {
        for v in [dec!(0.005), dec!(12.3456), dec!(100), dec!(-7.125)] {
            let once = round_fixed(v, 2);
            assert_eq!(round_fixed(once, 2), once);
            assert_eq!(round_fixed(once, 2).to_string(), once.to_string());
        }
    }

    #[test]
    fn round_fixed_pads_scale() {
        assert_eq!(round_fixed(dec!(100), 2).to_string(), "100.00");
    }

    #[test]
    fn option_converts_to_null() {
        let missing: Option<i64> = None;
        assert_eq!(Value::from(missing), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
    }
}
