//! Service configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use rust_decimal::Decimal;

use fxbook_common::CurrencyRegistry;
use fxbook_fx::provider::CBR_DAILY_URL;

const TRUE_VALUES: [&str; 5] = ["1", "true", "True", "y", "Y"];
const FALSE_VALUES: [&str; 5] = ["0", "false", "False", "n", "N"];

/// fxbook command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "fxbook")]
#[command(about = "Multi-currency balance service with periodic exchange rate updates")]
pub struct Args {
    /// Exchange rate update interval in minutes
    #[arg(long, env = "FXBOOK_PERIOD", value_parser = parse_minutes)]
    pub period: u64,

    /// Debug mode: 1, true, True, y, Y or 0, false, False, n, N
    #[arg(long, env = "FXBOOK_DEBUG", default_value = "0", action = ArgAction::Set, value_parser = parse_debug)]
    pub debug: bool,

    /// Starting amount of RUB
    #[arg(long, env = "FXBOOK_RUB", default_value = "0")]
    pub rub: Decimal,

    /// Starting amount of USD
    #[arg(long, env = "FXBOOK_USD", default_value = "0")]
    pub usd: Decimal,

    /// Starting amount of EUR
    #[arg(long, env = "FXBOOK_EUR", default_value = "0")]
    pub eur: Decimal,

    /// Base currency of the exchange rate table
    #[arg(long, env = "FXBOOK_BASE", default_value = "RUB")]
    pub base: String,

    /// HTTP listen address
    #[arg(long, env = "FXBOOK_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Exchange rate feed URL
    #[arg(long, env = "FXBOOK_FEED_URL", default_value = CBR_DAILY_URL)]
    pub feed_url: String,

    /// Exchange rate feed request timeout in seconds
    #[arg(long, env = "FXBOOK_FEED_TIMEOUT", default_value = "30")]
    pub feed_timeout: u64,

    /// Interval between report checks in minutes
    #[arg(long, env = "FXBOOK_REPORT_INTERVAL", default_value = "1", value_parser = parse_minutes)]
    pub report_interval: u64,

    /// Emit logs as JSON
    #[arg(long, env = "FXBOOK_LOG_JSON")]
    pub log_json: bool,
}

fn parse_debug(value: &str) -> Result<bool, String> {
    if TRUE_VALUES.contains(&value) {
        return Ok(true);
    }
    if FALSE_VALUES.contains(&value) {
        return Ok(false);
    }
    Err(format!(
        "unknown value '{}', supported values: {}",
        value,
        TRUE_VALUES
            .iter()
            .chain(FALSE_VALUES.iter())
            .map(|v| format!("'{}'", v))
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

fn parse_minutes(value: &str) -> Result<u64, String> {
    let minutes: u64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of minutes", value))?;
    if minutes == 0 {
        return Err("period must be a positive integer".to_string());
    }
    Ok(minutes)
}

/// Startup values consumed once by [`crate::State::new`].
#[derive(Debug, Clone)]
pub struct StateConfig {
    /// Tracked currencies and their starting balances, in ledger order.
    pub balances: Vec<(String, Decimal)>,
    /// Base currency of the rate table.
    pub base_currency: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            balances: CurrencyRegistry::standard()
                .codes()
                .map(|code| (code.to_string(), Decimal::ZERO))
                .collect(),
            base_currency: "RUB".to_string(),
        }
    }
}

/// Rate feed polling configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Feed URL.
    pub feed_url: String,
    /// Time between fetches.
    pub period: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Suppress the per-update info line.
    pub quiet: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            feed_url: CBR_DAILY_URL.to_string(),
            period: Duration::from_secs(60),
            timeout: Duration::from_secs(30),
            quiet: false,
        }
    }
}

/// Report loop configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Time between fingerprint checks.
    pub interval: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Main service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen address.
    pub listen_addr: SocketAddr,
    /// Debug mode.
    pub debug: bool,
    /// JSON log output.
    pub log_json: bool,
    pub state: StateConfig,
    pub fetch: FetchConfig,
    pub report: ReportConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            debug: false,
            log_json: false,
            state: StateConfig::default(),
            fetch: FetchConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Build configuration from parsed command line arguments.
    pub fn from_args(args: Args) -> Self {
        Self {
            listen_addr: args.listen,
            debug: args.debug,
            log_json: args.log_json,
            state: StateConfig {
                balances: vec![
                    ("RUB".to_string(), args.rub),
                    ("USD".to_string(), args.usd),
                    ("EUR".to_string(), args.eur),
                ],
                base_currency: args.base.to_uppercase(),
            },
            fetch: FetchConfig {
                feed_url: args.feed_url,
                period: Duration::from_secs(args.period * 60),
                timeout: Duration::from_secs(args.feed_timeout),
                quiet: args.debug,
            },
            report: ReportConfig {
                interval: Duration::from_secs(args.report_interval * 60),
            },
        }
    }

    /// Validate configuration.
    pub fn validate(&self, registry: &CurrencyRegistry) -> Result<(), String> {
        if self.fetch.period.is_zero() {
            return Err("Fetch period cannot be 0".to_string());
        }

        if self.report.interval.is_zero() {
            return Err("Report interval cannot be 0".to_string());
        }

        if self.fetch.feed_url.is_empty() {
            return Err("Feed URL cannot be empty".to_string());
        }

        if !registry.contains(&self.state.base_currency) {
            return Err(format!(
                "Unknown base currency '{}'",
                self.state.base_currency
            ));
        }

        for (name, amount) in &self.state.balances {
            if !registry.contains(name) {
                return Err(format!("Unknown currency '{}'", name));
            }
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(format!("Starting amount of {} must be >= 0, got {}", name, amount));
            }
        }

        Ok(())
    }
}
