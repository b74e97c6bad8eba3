//! Currency kinds and the startup registry that enumerates them.

use std::fmt;
use std::sync::Arc;

use crate::error::{CurrencyError, RegistryError, Result};

/// Currencies registered by [`CurrencyRegistry::standard`].
pub const STANDARD_CURRENCIES: [&str; 3] = ["RUB", "USD", "EUR"];

/// A registered currency identity, e.g. RUB or USD.
///
/// Kinds can only be obtained from a [`CurrencyRegistry`], so holding one
/// proves the code was registered. Values of different kinds never combine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyKind(Arc<str>);

impl CurrencyKind {
    fn new(code: &str) -> Self {
        Self(Arc::from(code))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable table of the currency kinds known to the process.
///
/// Built once at startup and handed to the ledger and rate table
/// constructors; there is no way to register a kind afterwards.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    kinds: Vec<CurrencyKind>,
}

impl CurrencyRegistry {
    /// Start building a registry.
    pub fn builder() -> CurrencyRegistryBuilder {
        CurrencyRegistryBuilder { kinds: Vec::new() }
    }

    /// Registry with RUB, USD and EUR.
    pub fn standard() -> Self {
        Self {
            kinds: STANDARD_CURRENCIES.iter().map(|c| CurrencyKind::new(c)).collect(),
        }
    }

    /// Look up a kind by its exact code.
    pub fn get(&self, code: &str) -> Option<&CurrencyKind> {
        self.kinds.iter().find(|k| k.code() == code)
    }

    /// Look up a kind, failing with `UnknownCurrency` if absent.
    pub fn kind(&self, code: &str) -> Result<&CurrencyKind> {
        self.get(code)
            .ok_or_else(|| CurrencyError::UnknownCurrency(code.to_string()))
    }

    /// Check if a code is registered.
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Iterate over kinds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CurrencyKind> {
        self.kinds.iter()
    }

    /// Iterate over codes in registration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(CurrencyKind::code)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`CurrencyRegistry`].
#[derive(Debug, Default)]
pub struct CurrencyRegistryBuilder {
    kinds: Vec<CurrencyKind>,
}

impl CurrencyRegistryBuilder {
    /// Register a currency code. Codes are upper-cased.
    pub fn register(mut self, code: &str) -> std::result::Result<Self, RegistryError> {
        let code = code.trim().to_uppercase();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RegistryError::InvalidCode(code));
        }
        if self.kinds.iter().any(|k| k.code() == code) {
            return Err(RegistryError::DuplicateCurrency(code));
        }

        self.kinds.push(CurrencyKind::new(&code));
        Ok(self)
    }

    /// Finish registration.
    pub fn build(self) -> CurrencyRegistry {
        CurrencyRegistry { kinds: self.kinds }
    }
}
