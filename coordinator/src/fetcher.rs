//! Periodic exchange rate refresh.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use fxbook_common::CurrencyRegistry;
use fxbook_fx::RateFeed;

use crate::config::FetchConfig;
use crate::state::State;

/// Outcome of a single refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Rates written to the table.
    pub applied: usize,
    /// Rates rejected by the table.
    pub skipped: usize,
    /// Quotes dropped because the currency is not registered.
    pub ignored: usize,
}

/// Fetch quotes once and apply the registered ones to the state.
///
/// The fetch happens before the state lock is taken. Returns `None` when the
/// feed failed.
pub async fn refresh_rates(
    state: &State,
    feed: &dyn RateFeed,
    registry: &CurrencyRegistry,
) -> Option<RefreshOutcome> {
    let quotes = match feed.fetch().await {
        Ok(quotes) => quotes,
        Err(e) => {
            error!(feed = feed.name(), error = %e, "Failed to fetch exchange rates");
            return None;
        }
    };

    let total = quotes.len();
    let known: Vec<_> = quotes
        .iter()
        .filter(|(code, _)| registry.contains(code))
        .map(|(code, rate)| (code.as_str(), *rate))
        .collect();
    let ignored = total - known.len();

    let skipped = state.set_exchange_rates(known.iter().copied());
    for e in &skipped {
        warn!(feed = feed.name(), error = %e, "Exchange rate rejected");
    }

    Some(RefreshOutcome {
        applied: known.len() - skipped.len(),
        skipped: skipped.len(),
        ignored,
    })
}

/// Refresh rates every `config.period` until shutdown is signalled.
///
/// The first refresh runs immediately.
#[instrument(skip_all, fields(feed = feed.name()))]
pub async fn run_rate_fetcher(
    state: Arc<State>,
    feed: Arc<dyn RateFeed>,
    registry: CurrencyRegistry,
    config: FetchConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(period_secs = config.period.as_secs(), "Rate fetcher started");

    let mut ticker = interval(config.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(outcome) = refresh_rates(&state, feed.as_ref(), &registry).await {
                    if config.quiet {
                        debug!(?outcome, "Exchange rates were updated");
                    } else {
                        info!(
                            applied = outcome.applied,
                            skipped = outcome.skipped,
                            "Exchange rates were updated"
                        );
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Rate fetcher stopped");
}
