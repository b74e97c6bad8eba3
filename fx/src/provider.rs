//! Rate feed traits and implementations.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{FeedError, FeedResult};

/// Default URL of the Central Bank of Russia daily rates document.
pub const CBR_DAILY_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";

/// Rates keyed by currency code, each relative to the feed's base currency.
pub type RateQuotes = BTreeMap<String, Decimal>;

/// Trait for upstream exchange rate feeds.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Get the feed name.
    fn name(&self) -> &str;

    /// Fetch the latest quotes.
    async fn fetch(&self) -> FeedResult<RateQuotes>;
}

/// CBR daily JSON document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CbrDailyDocument {
    pub date: DateTime<FixedOffset>,
    pub timestamp: DateTime<FixedOffset>,
    pub valute: HashMap<String, CbrQuote>,
}

/// Single currency entry of the CBR document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CbrQuote {
    pub char_code: String,
    pub name: String,
    /// Number of currency units the value is quoted for.
    pub nominal: Decimal,
    /// RUB value of `nominal` units.
    pub value: Decimal,
}

impl CbrDailyDocument {
    /// Decode a document from raw bytes.
    pub fn parse(bytes: &[u8]) -> FeedResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// RUB value of one unit of each quoted currency.
    ///
    /// Quotes with a non-positive nominal, or whose per-unit value does not
    /// fit in a `Decimal`, are skipped.
    pub fn into_quotes(self) -> RateQuotes {
        let mut quotes = RateQuotes::new();
        for quote in self.valute.into_values() {
            match quote.per_unit() {
                Ok(rate) => {
                    quotes.insert(quote.char_code.to_uppercase(), rate);
                }
                Err(err) => warn!(error = %err, "Skipping quote"),
            }
        }
        quotes
    }
}

impl CbrQuote {
    /// RUB value of a single unit.
    pub fn per_unit(&self) -> FeedResult<Decimal> {
        let invalid = |reason: String| FeedError::InvalidQuote {
            currency: self.char_code.to_uppercase(),
            reason,
        };

        if self.nominal <= Decimal::ZERO {
            return Err(invalid(format!(
                "nominal must be positive, got {}",
                self.nominal
            )));
        }
        self.value.checked_div(self.nominal).ok_or_else(|| {
            invalid(format!(
                "value {} over nominal {} is out of range",
                self.value, self.nominal
            ))
        })
    }
}

/// Rate feed backed by the CBR daily JSON document.
pub struct CbrDailyFeed {
    client: reqwest::Client,
    url: String,
}

impl CbrDailyFeed {
    /// Create a feed client with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateFeed for CbrDailyFeed {
    fn name(&self) -> &str {
        "CBR_DAILY"
    }

    async fn fetch(&self) -> FeedResult<RateQuotes> {
        // The feed is served as application/javascript, so decode the body ourselves.
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let document = CbrDailyDocument::parse(&body)?;
        debug!(
            date = %document.date,
            timestamp = %document.timestamp,
            quotes = document.valute.len(),
            "Fetched CBR daily document"
        );

        Ok(document.into_quotes())
    }
}

/// Feed returning a fixed, editable set of quotes.
pub struct StaticRateFeed {
    name: String,
    quotes: Mutex<RateQuotes>,
}

impl StaticRateFeed {
    /// Create a new static feed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quotes: Mutex::new(RateQuotes::new()),
        }
    }

    /// Set the quote for a currency.
    pub fn set_quote(&self, currency: impl Into<String>, rate: Decimal) {
        self.quotes.lock().insert(currency.into(), rate);
    }
}

#[async_trait]
impl RateFeed for StaticRateFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FeedResult<RateQuotes> {
        Ok(self.quotes.lock().clone())
    }
}
