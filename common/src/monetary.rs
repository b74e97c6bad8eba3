//! Fixed-point currency values.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use crate::currency::CurrencyKind;
use crate::error::{CurrencyError, Result};

/// Smallest amount a currency value may hold.
pub const MIN_AMOUNT: Decimal = Decimal::ZERO;

/// A non-negative amount tagged with its currency kind.
///
/// Arithmetic and comparison are only defined between values of the same
/// kind; mixing kinds yields [`CurrencyError::TypeMismatch`] (or `None` from
/// `partial_cmp`).
#[derive(Debug, Clone)]
pub struct CurrencyValue {
    kind: CurrencyKind,
    amount: Decimal,
}

impl CurrencyValue {
    /// Create a new value, rejecting negative amounts.
    pub fn new(kind: CurrencyKind, amount: Decimal) -> Result<Self> {
        if amount < MIN_AMOUNT {
            return Err(CurrencyError::InvalidAmount {
                currency: kind.code().to_string(),
                amount,
            });
        }
        Ok(Self { kind, amount })
    }

    /// Create a zero amount of the given kind.
    pub fn zero(kind: CurrencyKind) -> Self {
        Self {
            kind,
            amount: MIN_AMOUNT,
        }
    }

    pub fn kind(&self) -> &CurrencyKind {
        &self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Compare amounts of two values of the same kind.
    pub fn checked_cmp(&self, other: &CurrencyValue) -> Result<Ordering> {
        self.ensure_same_kind(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    fn ensure_same_kind(&self, other: &CurrencyValue) -> Result<()> {
        if self.kind != other.kind {
            return Err(CurrencyError::TypeMismatch {
                expected: self.kind.code().to_string(),
                actual: other.kind.code().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for CurrencyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.kind)
    }
}

impl PartialEq for CurrencyValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.amount == other.amount
    }
}

impl PartialOrd for CurrencyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.checked_cmp(other).ok()
    }
}

impl Add for CurrencyValue {
    type Output = Result<CurrencyValue>;

    fn add(self, other: CurrencyValue) -> Self::Output {
        self.ensure_same_kind(&other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| CurrencyError::InvalidAmount {
                currency: self.kind.code().to_string(),
                amount: other.amount,
            })?;
        Ok(CurrencyValue {
            amount,
            kind: self.kind,
        })
    }
}

impl Sub for CurrencyValue {
    type Output = Result<CurrencyValue>;

    fn sub(self, other: CurrencyValue) -> Self::Output {
        self.ensure_same_kind(&other)?;
        if self.amount < other.amount {
            return Err(CurrencyError::InsufficientAmount {
                currency: self.kind.code().to_string(),
                available: self.amount,
                requested: other.amount,
            });
        }
        Ok(CurrencyValue {
            amount: self.amount - other.amount,
            kind: self.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyRegistry;
    use rust_decimal_macros::dec;

    fn kinds() -> (CurrencyKind, CurrencyKind) {
        let registry = CurrencyRegistry::standard();
        (
            registry.kind("USD").unwrap().clone(),
            registry.kind("EUR").unwrap().clone(),
        )
    }

    #[test]
    fn test_negative_amount_rejected() {
        let (usd, _) = kinds();

        let result = CurrencyValue::new(usd, dec!(-0.01));

        assert!(matches!(result, Err(CurrencyError::InvalidAmount { .. })));
    }

    #[test]
    fn test_value_operations() {
        let (usd, _) = kinds();
        let v1 = CurrencyValue::new(usd.clone(), dec!(100.00)).unwrap();
        let v2 = CurrencyValue::new(usd.clone(), dec!(50.25)).unwrap();

        let sum = (v1.clone() + v2.clone()).unwrap();
        assert_eq!(sum.amount(), dec!(150.25));

        let diff = (v1.clone() - v2.clone()).unwrap();
        assert_eq!(diff.amount(), dec!(49.75));

        assert!(v2 < v1);
        assert_eq!(v1.checked_cmp(&v1).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_subtract_to_zero() {
        let (usd, _) = kinds();
        let v = CurrencyValue::new(usd, dec!(7.5)).unwrap();

        let diff = (v.clone() - v).unwrap();

        assert!(diff.is_zero());
    }

    #[test]
    fn test_insufficient_amount() {
        let (usd, _) = kinds();
        let small = CurrencyValue::new(usd.clone(), dec!(10)).unwrap();
        let big = CurrencyValue::new(usd, dec!(10.01)).unwrap();

        let err = (small - big).unwrap_err();

        assert_eq!(
            err,
            CurrencyError::InsufficientAmount {
                currency: "USD".to_string(),
                available: dec!(10),
                requested: dec!(10.01),
            }
        );
    }

    #[test]
    fn test_currency_mismatch() {
        let (usd, eur) = kinds();
        let a = CurrencyValue::new(usd, dec!(1)).unwrap();
        let b = CurrencyValue::new(eur, dec!(1)).unwrap();

        assert!(matches!(
            a.clone() + b.clone(),
            Err(CurrencyError::TypeMismatch { .. })
        ));
        assert!(matches!(
            a.clone() - b.clone(),
            Err(CurrencyError::TypeMismatch { .. })
        ));
        assert_eq!(a.partial_cmp(&b), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let (usd, _) = kinds();
        let v = CurrencyValue::new(usd, dec!(12.30)).unwrap();

        assert_eq!(v.to_string(), "12.30 USD");
    }
}
