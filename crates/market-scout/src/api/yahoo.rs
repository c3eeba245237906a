//! Yahoo Finance price collaborator

use super::PriceFeed;
use crate::error::{Result, ScoutError};
use crate::model::{Bar, PriceSeries, Ticker};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use yahoo_finance_api as yahoo;

/// Daily bars from Yahoo Finance
#[derive(Debug, Clone, Default)]
pub struct YahooPriceFeed;

impl YahooPriceFeed {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PriceFeed for YahooPriceFeed {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn fetch_price_series(&self, ticker: &Ticker, window_days: i64) -> Result<PriceSeries> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| ScoutError::MarketData(e.to_string()))?;

        let end = Utc::now();
        let start = end - chrono::Duration::days(window_days);
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| ScoutError::MarketData(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ScoutError::MarketData(format!("Invalid end timestamp: {e}")))?;

        let response = match provider
            .get_quote_history(ticker.as_str(), start_odt, end_odt)
            .await
        {
            Ok(response) => response,
            Err(e) if is_unknown_symbol(&e) => {
                warn!(error = %e, "Yahoo has no chart for symbol, treating as empty series");
                return Ok(PriceSeries::default());
            }
            Err(e) => return Err(ScoutError::MarketData(e.to_string())),
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(error = %e, "No quotes in Yahoo response, treating as empty series");
                return Ok(PriceSeries::default());
            }
        };

        let bars: Vec<Bar> = quotes
            .iter()
            .filter_map(|q| {
                Some(Bar {
                    timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)?,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();

        debug!(bars = bars.len(), "Fetched price history");
        Ok(PriceSeries::new(bars))
    }
}

/// Yahoo's answers for symbols it has no chart for
///
/// An unknown ticker comes back as `{"chart":{"result":null,"error":{..}}}`,
/// which the client surfaces as `ApiError`; an empty chart gives `NoResult`
/// or `NoQuotes`. Transport and throttling failures are real errors.
fn is_unknown_symbol(err: &yahoo::YahooError) -> bool {
    matches!(
        err,
        yahoo::YahooError::ApiError(_) | yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes
    )
}
