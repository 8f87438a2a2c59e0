//! Validated product cost.
//!
//! Costs written back to Odoo's `standard_price` must be strictly positive
//! and no larger than [`Cost::MAX`]. Values read from Odoo are not validated
//! (a product may legitimately cost `0`), so readers use plain `Decimal`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::xmlrpc::Value;

/// Errors raised when constructing a [`Cost`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    #[error("cost must be greater than 0, got {0}")]
    NotPositive(Decimal),
    #[error("cost {0} exceeds the maximum of 999999.99")]
    TooLarge(Decimal),
    #[error("invalid cost {0:?}")]
    Invalid(String),
}

/// A cost that may be written to `standard_price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Cost(Decimal);

impl Cost {
    /// Largest accepted cost.
    pub const MAX: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `CostError` if the amount is zero, negative or above [`Cost::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, CostError> {
        if amount <= Decimal::ZERO {
            return Err(CostError::NotPositive(amount));
        }
        if amount > Self::MAX {
            return Err(CostError::TooLarge(amount));
        }
        Ok(Self(amount.normalize()))
    }

    /// Validate a floating-point amount, e.g. a `standard_price` read from Odoo.
    ///
    /// # Errors
    ///
    /// Returns `CostError` if the value is not finite or fails [`Cost::new`].
    pub fn from_f64(amount: f64) -> Result<Self, CostError> {
        Decimal::from_f64(amount)
            .ok_or_else(|| CostError::Invalid(amount.to_string()))
            .and_then(Self::new)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The value Odoo expects for a float field.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Double(self.0.to_f64().unwrap_or_default())
    }
}

impl TryFrom<Decimal> for Cost {
    type Error = CostError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Cost> for Decimal {
    fn from(cost: Cost) -> Self {
        cost.0
    }
}

impl From<Cost> for Value {
    fn from(cost: Cost) -> Self {
        cost.to_value()
    }
}

impl FromStr for Cost {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| CostError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal")
    }

    #[test]
    fn test_cost_accepts_positive_amounts() {
        let cost = Cost::new(dec("55.5")).expect("valid");
        assert_eq!(cost.amount(), dec("55.5"));
        assert_eq!(cost.to_string(), "55.50");
    }

    #[test]
    fn test_cost_rejects_zero_and_negative() {
        assert_eq!(
            Cost::new(Decimal::ZERO),
            Err(CostError::NotPositive(Decimal::ZERO))
        );
        assert!(matches!(
            Cost::new(dec("-1")),
            Err(CostError::NotPositive(_))
        ));
    }

    #[test]
    fn test_cost_upper_bound() {
        assert_eq!(Cost::MAX, dec("999999.99"));
        assert!(Cost::new(dec("999999.99")).is_ok());
        assert!(matches!(
            Cost::new(dec("1000000")),
            Err(CostError::TooLarge(_))
        ));
    }

    #[test]
    fn test_cost_from_str() {
        assert_eq!("12.30".parse::<Cost>().expect("valid").amount(), dec("12.3"));
        assert!(matches!("abc".parse::<Cost>(), Err(CostError::Invalid(_))));
        assert!("0".parse::<Cost>().is_err());
    }

    #[test]
    fn test_cost_from_f64() {
        assert_eq!(Cost::from_f64(55.5).expect("valid").amount(), dec("55.5"));
        assert!(Cost::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_cost_to_value_is_double() {
        let cost = Cost::new(dec("55")).expect("valid");
        assert_eq!(cost.to_value(), Value::Double(55.0));
        assert_eq!(Value::from(cost), Value::Double(55.0));
    }

    #[test]
    fn test_cost_serde() {
        let cost: Cost = serde_json::from_str("\"19.99\"").expect("deserialize");
        assert_eq!(cost.amount(), dec("19.99"));
        assert!(serde_json::from_str::<Cost>("\"-2\"").is_err());
    }
}
