//! Exchange rate table.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use fxbook_common::{CurrencyError, CurrencyRegistry, Fingerprint, Result, MIN_AMOUNT};

/// Exchange rates relative to a base currency.
///
/// A rate is the value of one unit of the currency expressed in the base
/// currency, so the base itself is always `1`. Cross rates are the ratio of
/// two base-relative rates. Codes that are not registered are accepted as
/// opaque keys.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: String,
    rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    /// Create a table for the given base currency.
    pub fn new(registry: &CurrencyRegistry, base: &str) -> Result<Self> {
        let base = registry.kind(base)?.code().to_string();
        let mut rates = BTreeMap::new();
        rates.insert(base.clone(), Decimal::ONE);

        Ok(Self { base, rates })
    }

    /// Base currency code.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Insert or overwrite a rate.
    ///
    /// Fails with `InvalidExchangeRate` if the rate is not positive, or if it
    /// would move the base currency away from `1`.
    pub fn set_rate(&mut self, currency: &str, rate: Decimal) -> Result<()> {
        if rate <= MIN_AMOUNT || (currency == self.base && rate != Decimal::ONE) {
            return Err(CurrencyError::InvalidExchangeRate {
                currency: currency.to_string(),
                rate,
            });
        }

        debug!(currency, rate = %rate, "Setting exchange rate");
        self.rates.insert(currency.to_string(), rate);
        Ok(())
    }

    /// Apply every rate independently.
    ///
    /// A rejected entry does not stop the rest of the batch; the rejections
    /// are returned so the caller can report them.
    pub fn set_rates<'a, I>(&mut self, rates: I) -> Vec<CurrencyError>
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        let mut skipped = Vec::new();
        for (currency, rate) in rates {
            if let Err(e) = self.set_rate(currency, rate) {
                warn!(currency, error = %e, "Skipping exchange rate");
                skipped.push(e);
            }
        }
        skipped
    }

    /// Get the rate of a currency, if known.
    pub fn get_rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Get the rate of a currency, failing with `MissingExchangeRate`.
    pub fn get_rate_checked(&self, currency: &str) -> Result<Decimal> {
        self.get_rate(currency)
            .ok_or_else(|| CurrencyError::MissingExchangeRate(currency.to_string()))
    }

    /// Number of units of `to` that one unit of `from` is worth.
    pub fn cross_rate(&self, from: &str, to: &str) -> Result<Decimal> {
        let from_rate = self.get_rate_checked(from)?;
        let to_rate = self.get_rate_checked(to)?;

        // Both rates are strictly positive, so only overflow can fail here.
        from_rate
            .checked_div(to_rate)
            .ok_or_else(|| CurrencyError::InvalidExchangeRate {
                currency: from.to_string(),
                rate: from_rate,
            })
    }

    /// Convert an amount of `from` into `to`.
    pub fn convert(&self, from: &str, amount: Decimal, to: &str) -> Result<Decimal> {
        if amount < MIN_AMOUNT {
            return Err(CurrencyError::InvalidAmount {
                currency: from.to_string(),
                amount,
            });
        }

        let rate = self.cross_rate(from, to)?;
        amount
            .checked_mul(rate)
            .ok_or_else(|| CurrencyError::InvalidAmount {
                currency: from.to_string(),
                amount,
            })
    }

    /// Iterate over `(currency, rate)` pairs ordered by code.
    pub fn rates(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Fingerprint of the current rates, for change detection only.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_entries(self.rates())
    }
}
