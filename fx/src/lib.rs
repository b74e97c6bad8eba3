//! fxbook FX
//!
//! Exchange rate table keyed by currency code, relative to a base currency,
//! plus the rate feed clients that keep it up to date.
//!
//! # Example
//!
//! ```rust,ignore
//! use fxbook_common::CurrencyRegistry;
//! use fxbook_fx::RateTable;
//! use rust_decimal_macros::dec;
//!
//! let mut table = RateTable::new(&CurrencyRegistry::standard(), "RUB")?;
//! table.set_rate("USD", dec!(90))?;
//!
//! // 10 USD expressed in RUB
//! let rub = table.convert("USD", dec!(10), "RUB")?;
//! ```

pub mod engine;
pub mod provider;
pub mod error;

pub use engine::RateTable;
pub use provider::{CbrDailyFeed, RateFeed, RateQuotes, StaticRateFeed};
pub use error::{FeedError, FeedResult};
