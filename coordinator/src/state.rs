//! Shared balance and exchange rate state.
//!
//! [`State`] is the only way to reach the ledger and the rate table. Every
//! operation takes the same lock for its whole duration and releases it on
//! return, error or panic. Nothing here performs I/O, so the lock is never
//! held across an `.await`; the guard is `!Send`, which makes holding it in a
//! spawned task a compile error.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use fxbook_common::{CurrencyError, CurrencyRegistry, Fingerprint, Result};
use fxbook_fx::RateTable;
use fxbook_ledger::{BalanceChange, BalanceLedger, BalanceSnapshot};

use crate::config::StateConfig;
use crate::report::{self, Report};

struct Books {
    ledger: BalanceLedger,
    rates: RateTable,
}

/// Lock-guarded owner of the balance ledger and the rate table.
pub struct State {
    base_currency: String,
    books: Mutex<Books>,
}

impl State {
    /// Build the ledger and the rate table from startup configuration.
    pub fn new(registry: &CurrencyRegistry, config: &StateConfig) -> Result<Self> {
        let ledger = BalanceLedger::with_balances(
            registry,
            config
                .balances
                .iter()
                .map(|(name, amount)| (name.as_str(), *amount)),
        )?;
        let rates = RateTable::new(registry, &config.base_currency)?;

        info!(
            currencies = ledger.len(),
            base = %rates.base(),
            "State initialized"
        );

        Ok(Self {
            base_currency: rates.base().to_string(),
            books: Mutex::new(Books { ledger, rates }),
        })
    }

    /// Base currency of the rate table. Fixed for the lifetime of the state.
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Get the balance of a currency.
    pub fn get_balance(&self, currency: &str) -> Result<Decimal> {
        self.books.lock().ledger.get(currency)
    }

    /// Get every balance.
    pub fn get_all_balances(&self) -> BalanceSnapshot {
        self.books.lock().ledger.get_all()
    }

    #[instrument(skip(self))]
    pub fn set_balance(&self, currency: &str, amount: Decimal) -> Result<()> {
        self.books.lock().ledger.set(currency, amount)
    }

    #[instrument(skip(self))]
    pub fn add_balance(&self, currency: &str, amount: Decimal) -> Result<()> {
        self.books.lock().ledger.add(currency, amount)
    }

    #[instrument(skip(self))]
    pub fn remove_balance(&self, currency: &str, amount: Decimal) -> Result<()> {
        self.books.lock().ledger.remove(currency, amount)
    }

    /// Set several balances at once. Nothing is applied if any entry fails.
    pub fn set_balances<I>(&self, balances: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let changes: Vec<BalanceChange> = balances
            .into_iter()
            .map(|(currency, amount)| BalanceChange::Set { currency, amount })
            .collect();
        self.apply_balance_changes(&changes)
    }

    /// Add to several balances at once. Nothing is applied if any entry fails.
    pub fn add_balances<I>(&self, balances: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let changes: Vec<BalanceChange> = balances
            .into_iter()
            .map(|(currency, amount)| BalanceChange::Add { currency, amount })
            .collect();
        self.apply_balance_changes(&changes)
    }

    /// Remove from several balances at once. Nothing is applied if any entry fails.
    pub fn remove_balances<I>(&self, balances: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let changes: Vec<BalanceChange> = balances
            .into_iter()
            .map(|(currency, amount)| BalanceChange::Remove { currency, amount })
            .collect();
        self.apply_balance_changes(&changes)
    }

    /// Apply signed deltas: negative amounts are removed, positive ones added.
    pub fn modify_balances<I>(&self, deltas: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let changes: Vec<BalanceChange> = deltas
            .into_iter()
            .map(|(currency, delta)| BalanceChange::from_delta(currency, delta))
            .collect();
        self.apply_balance_changes(&changes)
    }

    /// Apply a batch of changes atomically.
    ///
    /// Changes are staged on a copy of the ledger and committed only when
    /// every one of them succeeds.
    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    pub fn apply_balance_changes(&self, changes: &[BalanceChange]) -> Result<()> {
        let mut books = self.books.lock();
        let mut staged = books.ledger.clone();
        for change in changes {
            staged.apply(change)?;
        }
        books.ledger = staged;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_exchange_rate(&self, currency: &str, rate: Decimal) -> Result<()> {
        self.books.lock().rates.set_rate(currency, rate)
    }

    /// Bulk rate update from a feed. Each entry is applied independently;
    /// the rejected ones are returned.
    pub fn set_exchange_rates<'a, I>(&self, rates: I) -> Vec<CurrencyError>
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        self.books.lock().rates.set_rates(rates)
    }

    /// Get the base-relative rate of a currency, if known.
    pub fn get_exchange_rate(&self, currency: &str) -> Option<Decimal> {
        self.books.lock().rates.get_rate(currency)
    }

    pub fn cross_rate(&self, from: &str, to: &str) -> Result<Decimal> {
        self.books.lock().rates.cross_rate(from, to)
    }

    /// Convert an amount between currencies at the current rates.
    pub fn convert(&self, from: &str, amount: Decimal, to: &str) -> Result<Decimal> {
        self.books.lock().rates.convert(from, amount, to)
    }

    /// Fingerprint of balances and rates, for detecting changes between two
    /// points in time.
    pub fn fingerprint(&self) -> Fingerprint {
        Self::fingerprint_of(&self.books.lock())
    }

    /// Render the balance report from a consistent snapshot.
    pub fn generate_report(&self) -> Report {
        let books = self.books.lock();
        report::generate(&books.ledger.get_all(), &books.rates)
    }

    /// Render a report only if the fingerprint differs from `last`.
    ///
    /// The returned fingerprint describes exactly the snapshot the report was
    /// rendered from.
    pub fn report_if_changed(&self, last: Fingerprint) -> Option<(Fingerprint, Report)> {
        let books = self.books.lock();
        let current = Self::fingerprint_of(&books);
        if current == last {
            return None;
        }
        Some((current, report::generate(&books.ledger.get_all(), &books.rates)))
    }

    fn fingerprint_of(books: &Books) -> Fingerprint {
        Fingerprint::combine(&[books.ledger.fingerprint(), books.rates.fingerprint()])
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let books = self.books.lock();
        f.debug_struct("State")
            .field("base_currency", &self.base_currency)
            .field("balances", &books.ledger.get_all())
            .field("rates", &books.rates)
            .finish()
    }
}
