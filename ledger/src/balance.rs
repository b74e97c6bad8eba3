//! Balance snapshots and change requests.

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Point-in-time copy of every tracked balance, in ledger order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    entries: Vec<(String, Decimal)>,
}

impl BalanceSnapshot {
    pub(crate) fn new(entries: Vec<(String, Decimal)>) -> Self {
        Self { entries }
    }

    /// Get the balance for a currency, if tracked.
    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == currency)
            .map(|(_, amount)| *amount)
    }

    /// Iterate over `(currency, amount)` pairs in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    /// Iterate over tracked currency names in ledger order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for BalanceSnapshot {
    type Item = (String, Decimal);
    type IntoIter = std::vec::IntoIter<(String, Decimal)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// Serialized as a JSON object keeping ledger order.
impl Serialize for BalanceSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, amount) in &self.entries {
            map.serialize_entry(name, amount)?;
        }
        map.end()
    }
}

/// A single balance mutation, used for bulk updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceChange {
    /// Replace the balance.
    Set { currency: String, amount: Decimal },
    /// Increase the balance by a positive amount.
    Add { currency: String, amount: Decimal },
    /// Decrease the balance by a positive amount.
    Remove { currency: String, amount: Decimal },
}

impl BalanceChange {
    /// Build a change from a signed delta: negative removes, anything else adds.
    pub fn from_delta(currency: impl Into<String>, delta: Decimal) -> Self {
        let currency = currency.into();
        if delta.is_sign_negative() && !delta.is_zero() {
            BalanceChange::Remove {
                currency,
                amount: delta.abs(),
            }
        } else {
            BalanceChange::Add {
                currency,
                amount: delta,
            }
        }
    }

    /// Currency the change applies to.
    pub fn currency(&self) -> &str {
        match self {
            BalanceChange::Set { currency, .. }
            | BalanceChange::Add { currency, .. }
            | BalanceChange::Remove { currency, .. } => currency,
        }
    }
}
