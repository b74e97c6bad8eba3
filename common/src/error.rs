//! Error types for fxbook.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain errors raised by currency values, the balance ledger and the rate table.
///
/// Everything except [`CurrencyError::TypeMismatch`] is expected in normal
/// operation and must be handled per operation by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Amount is negative, or not positive where a positive amount is required.
    #[error("Invalid amount {amount} for '{currency}'")]
    InvalidAmount { currency: String, amount: Decimal },

    /// Subtraction would take the balance below zero.
    #[error("Insufficient '{currency}': available {available}, requested {requested}")]
    InsufficientAmount {
        currency: String,
        available: Decimal,
        requested: Decimal,
    },

    /// Currency is not tracked by the ledger or not registered.
    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),

    /// Exchange rate is zero or negative.
    #[error("Exchange rate for '{currency}' must be greater than 0, got {rate}")]
    InvalidExchangeRate { currency: String, rate: Decimal },

    /// No exchange rate is known for the currency.
    #[error("No exchange rate for '{0}'")]
    MissingExchangeRate(String),

    /// Arithmetic between values of different currency kinds.
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl CurrencyError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurrencyError::InvalidAmount { .. } => "INVALID_AMOUNT",
            CurrencyError::InsufficientAmount { .. } => "INSUFFICIENT_AMOUNT",
            CurrencyError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            CurrencyError::InvalidExchangeRate { .. } => "INVALID_EXCHANGE_RATE",
            CurrencyError::MissingExchangeRate(_) => "MISSING_EXCHANGE_RATE",
            CurrencyError::TypeMismatch { .. } => "TYPE_MISMATCH",
        }
    }

    /// Whether the error means a currency or rate does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CurrencyError::UnknownCurrency(_) | CurrencyError::MissingExchangeRate(_)
        )
    }

    /// Whether the error was caused by a bad value supplied by the caller.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CurrencyError::InvalidAmount { .. }
                | CurrencyError::InsufficientAmount { .. }
                | CurrencyError::InvalidExchangeRate { .. }
        )
    }

    /// Whether this is a recoverable domain error rather than a programming error.
    pub fn is_domain_error(&self) -> bool {
        !matches!(self, CurrencyError::TypeMismatch { .. })
    }
}

/// Result type alias for currency operations.
pub type Result<T> = std::result::Result<T, CurrencyError>;

/// Errors raised while building a [`crate::CurrencyRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A currency with this code was already registered.
    #[error("Currency with name '{0}' already exists")]
    DuplicateCurrency(String),

    /// Currency code is empty or contains non-alphanumeric characters.
    #[error("Invalid currency code '{0}'")]
    InvalidCode(String),
}
