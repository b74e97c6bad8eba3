//! Balance report rendering.
//!
//! The report has three blocks separated by blank lines:
//!
//! ```text
//! rub: 100
//! usd: 10
//!
//! rub-usd: 0.0111111111111111111111111111
//! usd-rub: 90
//!
//! sum: 1000 rub / 11.111111111111111111111111110 usd
//! ```
//!
//! Cross-rate lines are listed for every ordered pair of tracked currencies
//! that both have a rate. Each currency's sum adds every other balance
//! converted into it; terms whose conversion fails are left out and
//! reported back through [`Report::skipped`].

use std::fmt::{self, Write};

use rust_decimal::Decimal;

use fxbook_common::CurrencyError;
use fxbook_fx::RateTable;
use fxbook_ledger::BalanceSnapshot;

/// A rendered report and the conversion failures that were left out of it.
#[derive(Debug, Clone)]
pub struct Report {
    text: String,
    skipped: Vec<CurrencyError>,
}

impl Report {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Conversions that could not be included in the sums.
    pub fn skipped(&self) -> &[CurrencyError] {
        &self.skipped
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render a report from a balance snapshot and the rate table.
///
/// Never fails: missing rates only drop lines or sum terms.
pub fn generate(balances: &BalanceSnapshot, rates: &RateTable) -> Report {
    let mut text = String::new();
    let mut skipped = Vec::new();

    for (name, amount) in balances.iter() {
        let _ = writeln!(text, "{}: {}", name.to_lowercase(), amount.normalize());
    }
    text.push('\n');

    for from in balances.names() {
        for to in balances.names() {
            if from == to {
                continue;
            }
            if let Ok(rate) = rates.cross_rate(from, to) {
                let _ = writeln!(
                    text,
                    "{}-{}: {}",
                    from.to_lowercase(),
                    to.to_lowercase(),
                    rate.normalize()
                );
            }
        }
    }
    text.push('\n');

    let totals: Vec<String> = balances
        .iter()
        .map(|(name, amount)| {
            let total = total_in(name, amount, balances, rates, &mut skipped);
            format!("{} {}", total.normalize(), name.to_lowercase())
        })
        .collect();
    text.push_str("sum:");
    if !totals.is_empty() {
        text.push(' ');
        text.push_str(&totals.join(" / "));
    }

    Report { text, skipped }
}

fn total_in(
    target: &str,
    own: Decimal,
    balances: &BalanceSnapshot,
    rates: &RateTable,
    skipped: &mut Vec<CurrencyError>,
) -> Decimal {
    let mut total = own;
    for (other, amount) in balances.iter() {
        if other == target {
            continue;
        }
        let term = rates.convert(other, amount, target).and_then(|converted| {
            total
                .checked_add(converted)
                .ok_or_else(|| CurrencyError::InvalidAmount {
                    currency: other.to_string(),
                    amount: converted,
                })
        });
        match term {
            Ok(sum) => total = sum,
            Err(e) => skipped.push(e),
        }
    }
    total
}
