//! Periodic report emission.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, instrument, warn};

use fxbook_common::Fingerprint;

use crate::report::Report;
use crate::state::State;

/// Generate a report only if the state changed since `last`.
///
/// Updates `last` when a report is produced.
pub fn report_if_changed(state: &State, last: &mut Fingerprint) -> Option<Report> {
    let (current, report) = state.report_if_changed(*last)?;
    *last = current;
    Some(report)
}

/// Log a report whenever the state changes, checking every `period`, until
/// shutdown is signalled.
#[instrument(skip_all)]
pub async fn run_reporter(
    state: Arc<State>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(period_secs = period.as_secs(), "Reporter started");

    let mut last = state.fingerprint();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(report) = report_if_changed(&state, &mut last) {
                    for skipped in report.skipped() {
                        warn!(
                            error = %skipped,
                            "Report term skipped, exchange rates may be incomplete"
                        );
                    }
                    info!("Currency report:\n{}", report);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Reporter stopped");
}
