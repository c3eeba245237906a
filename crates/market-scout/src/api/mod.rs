//! External data collaborators
//!
//! Both traits are deliberately thin so the engines can be exercised with
//! in-memory fakes.

mod google_news;
mod yahoo;

pub use google_news::{GoogleNewsFeed, parse_rss_titles};
pub use yahoo::YahooPriceFeed;

use crate::error::Result;
use crate::model::{PriceSeries, Ticker};
use async_trait::async_trait;

/// Trailing window of daily bars used by the Indicator Engine
pub const PRICE_WINDOW_DAYS: i64 = 30;

/// Number of headlines scored per sentiment run
pub const HEADLINE_LIMIT: usize = 5;

/// Source of daily price history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Daily bars covering the last `window_days` days
    ///
    /// Unknown tickers yield an empty series rather than an error.
    async fn fetch_price_series(&self, ticker: &Ticker, window_days: i64) -> Result<PriceSeries>;
}

/// Source of recent headlines
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Up to `limit` headlines, newest first
    async fn fetch_headlines(&self, ticker: &Ticker, limit: usize) -> Result<Vec<String>>;
}
