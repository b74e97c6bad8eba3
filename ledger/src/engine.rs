//! Core balance ledger implementation.

use rust_decimal::Decimal;
use tracing::debug;

use fxbook_common::{
    CurrencyError, CurrencyRegistry, CurrencyValue, Fingerprint, Result, MIN_AMOUNT,
};

use crate::balance::{BalanceChange, BalanceSnapshot};

/// Holds one balance per tracked currency.
///
/// The set of tracked currencies is fixed at construction; only amounts
/// change afterwards. Every failed mutation leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct BalanceLedger {
    /// Balances in construction order.
    balances: Vec<CurrencyValue>,
}

impl BalanceLedger {
    /// Create a ledger tracking the given currencies, all starting at zero.
    ///
    /// Fails with `UnknownCurrency` if a name is not registered. Repeated
    /// names are tracked once.
    pub fn new<'a, I>(registry: &CurrencyRegistry, currencies: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut balances: Vec<CurrencyValue> = Vec::new();
        for name in currencies {
            let kind = registry.kind(name)?;
            if balances.iter().any(|b| b.kind() == kind) {
                continue;
            }
            balances.push(CurrencyValue::zero(kind.clone()));
        }

        Ok(Self { balances })
    }

    /// Create a ledger with starting balances.
    pub fn with_balances<'a, I>(registry: &CurrencyRegistry, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Decimal)> + Clone,
    {
        let mut ledger = Self::new(registry, initial.clone().into_iter().map(|(name, _)| name))?;
        for (name, amount) in initial {
            ledger.set(name, amount)?;
        }
        Ok(ledger)
    }

    fn position(&self, currency: &str) -> Result<usize> {
        self.balances
            .iter()
            .position(|b| b.kind().code() == currency)
            .ok_or_else(|| CurrencyError::UnknownCurrency(currency.to_string()))
    }

    /// Check if a currency is tracked.
    pub fn contains(&self, currency: &str) -> bool {
        self.position(currency).is_ok()
    }

    /// Get the current balance of a currency.
    pub fn get(&self, currency: &str) -> Result<Decimal> {
        let idx = self.position(currency)?;
        Ok(self.balances[idx].amount())
    }

    /// Get a snapshot of every balance.
    pub fn get_all(&self) -> BalanceSnapshot {
        BalanceSnapshot::new(
            self.balances
                .iter()
                .map(|b| (b.kind().code().to_string(), b.amount()))
                .collect(),
        )
    }

    /// Replace the balance of a currency.
    pub fn set(&mut self, currency: &str, amount: Decimal) -> Result<()> {
        let idx = self.position(currency)?;
        let value = CurrencyValue::new(self.balances[idx].kind().clone(), amount)?;

        debug!(currency, amount = %amount, "Setting balance");
        self.balances[idx] = value;
        Ok(())
    }

    /// Increase the balance of a currency by a positive amount.
    pub fn add(&mut self, currency: &str, amount: Decimal) -> Result<()> {
        let idx = self.position(currency)?;
        let delta = self.positive_value(idx, amount)?;
        let updated = (self.balances[idx].clone() + delta)?;

        debug!(currency, amount = %amount, balance = %updated.amount(), "Adding to balance");
        self.balances[idx] = updated;
        Ok(())
    }

    /// Decrease the balance of a currency by a positive amount.
    ///
    /// Fails with `InsufficientAmount` if the balance would go negative.
    pub fn remove(&mut self, currency: &str, amount: Decimal) -> Result<()> {
        let idx = self.position(currency)?;
        let delta = self.positive_value(idx, amount)?;
        let updated = (self.balances[idx].clone() - delta)?;

        debug!(currency, amount = %amount, balance = %updated.amount(), "Removing from balance");
        self.balances[idx] = updated;
        Ok(())
    }

    /// Apply a single change.
    pub fn apply(&mut self, change: &BalanceChange) -> Result<()> {
        match change {
            BalanceChange::Set { currency, amount } => self.set(currency, *amount),
            BalanceChange::Add { currency, amount } => self.add(currency, *amount),
            BalanceChange::Remove { currency, amount } => self.remove(currency, *amount),
        }
    }

    /// Fingerprint of the current balances, for change detection only.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_entries(self.balances.iter().map(|b| (b.kind().code(), b.amount())))
    }

    /// Iterate over tracked currency names in construction order.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.balances.iter().map(|b| b.kind().code())
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    fn positive_value(&self, idx: usize, amount: Decimal) -> Result<CurrencyValue> {
        let kind = self.balances[idx].kind();
        if amount <= MIN_AMOUNT {
            return Err(CurrencyError::InvalidAmount {
                currency: kind.code().to_string(),
                amount,
            });
        }
        CurrencyValue::new(kind.clone(), amount)
    }
}
