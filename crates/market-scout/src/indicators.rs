//! Indicator Engine: deterministic technical metrics from a price series

use crate::api::{PRICE_WINDOW_DAYS, PriceFeed};
use crate::error::{Result, ScoutError};
use crate::model::{IndicatorReport, PriceSeries, Ticker, Trend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::debug;

/// Window for the relative strength index
pub const RSI_PERIOD: usize = 14;

/// Window for the trend moving average
pub const SMA_PERIOD: usize = 20;

/// 14-period RSI over the last 14 close-to-close deltas
///
/// Gains and losses are plain means of the window, not Wilder-smoothed.
/// Needs `RSI_PERIOD + 1` closes; returns `None` otherwise. A window without
/// losses yields 100.
pub fn relative_strength_index(closes: &[f64]) -> Option<f64> {
    if closes.len() < RSI_PERIOD + 1 {
        return None;
    }

    let window = &closes[closes.len() - (RSI_PERIOD + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gain, loss), delta| {
            if delta > 0.0 {
                (gain + delta, loss)
            } else {
                (gain, loss - delta)
            }
        });

    let avg_gain = gains / RSI_PERIOD as f64;
    let avg_loss = losses / RSI_PERIOD as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

/// Simple moving average of the trailing `SMA_PERIOD` closes
///
/// Shorter series average everything available. Returns the average and
/// the number of closes it covers.
pub fn trailing_sma(closes: &[f64]) -> Option<(f64, usize)> {
    let window = closes.len().min(SMA_PERIOD);
    let mut sma = SimpleMovingAverage::new(window).ok()?;
    let value = closes.iter().fold(0.0, |_, &close| sma.next(close));
    Some((value, window))
}

/// Bullish when the price sits strictly above its moving average
pub fn classify_trend(price: f64, sma: f64) -> Trend {
    if price > sma {
        Trend::Bullish
    } else {
        Trend::Bearish
    }
}

/// Compute the indicator report for an already fetched series
pub fn compute_report(ticker: &Ticker, series: &PriceSeries) -> Result<IndicatorReport> {
    let closes = series.closes();
    let Some(&current_price) = closes.last() else {
        return Err(ScoutError::NoData {
            ticker: ticker.to_string(),
            reason: "price series is empty".to_string(),
        });
    };

    let (sma, sma_window) = trailing_sma(&closes).ok_or_else(|| ScoutError::NoData {
        ticker: ticker.to_string(),
        reason: "moving average window is empty".to_string(),
    })?;

    Ok(IndicatorReport {
        ticker: ticker.clone(),
        current_price,
        rsi_14: relative_strength_index(&closes),
        sma,
        sma_window,
        trend: classify_trend(current_price, sma),
    })
}

/// Dashboard metrics for the latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: Ticker,
    pub price: f64,
    /// Change against the previous close, absent for a single bar
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: u64,
}

impl MarketSnapshot {
    /// Snapshot of the last bar in `series`
    pub fn from_series(ticker: &Ticker, series: &PriceSeries) -> Result<Self> {
        let bars = series.bars();
        let last = bars.last().ok_or_else(|| ScoutError::NoData {
            ticker: ticker.to_string(),
            reason: "price series is empty".to_string(),
        })?;

        let previous = bars.len().checked_sub(2).map(|i| bars[i].close);
        let change = previous.map(|p| last.close - p);
        let change_percent = previous
            .filter(|&p| p != 0.0)
            .map(|p| (last.close - p) / p * 100.0);

        Ok(Self {
            ticker: ticker.clone(),
            price: last.close,
            change,
            change_percent,
            volume: last.volume,
        })
    }
}

/// Fetches a one-month series and derives indicators from it
#[derive(Clone)]
pub struct IndicatorEngine {
    feed: Arc<dyn PriceFeed>,
}

impl IndicatorEngine {
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self { feed }
    }

    async fn series(&self, ticker: &Ticker) -> Result<PriceSeries> {
        let series = self.feed.fetch_price_series(ticker, PRICE_WINDOW_DAYS).await?;
        debug!(ticker = %ticker, bars = series.len(), "Price series loaded");
        Ok(series)
    }

    /// Indicator report for `ticker`; `NoData` for an empty series
    pub async fn analyze(&self, ticker: &Ticker) -> Result<IndicatorReport> {
        compute_report(ticker, &self.series(ticker).await?)
    }

    /// Price, daily change and volume for `ticker`
    pub async fn snapshot(&self, ticker: &Ticker) -> Result<MarketSnapshot> {
        MarketSnapshot::from_series(ticker, &self.series(ticker).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPriceFeed;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_rsi_needs_fifteen_closes() {
        assert_eq!(relative_strength_index(&[]), None);
        assert_eq!(relative_strength_index(&rising(5)), None);
        assert_eq!(relative_strength_index(&rising(14)), None);
        assert!(relative_strength_index(&rising(15)).is_some());
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        assert_eq!(relative_strength_index(&rising(25)), Some(100.0));
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        assert_eq!(relative_strength_index(&[50.0; 20]), Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let falling: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        assert_eq!(relative_strength_index(&falling), Some(0.0));
    }

    #[test]
    fn test_rsi_balanced_moves_is_50() {
        let zigzag: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        let rsi = relative_strength_index(&zigzag).unwrap();
        assert!((rsi - 50.0).abs() < 1e-9, "rsi = {rsi}");
    }

    #[test]
    fn test_rsi_uses_only_last_window() {
        // a crash long before the window must not matter
        let mut closes = vec![500.0, 10.0];
        closes.extend(rising(15));
        assert_eq!(relative_strength_index(&closes), Some(100.0));
    }

    #[test]
    fn test_sma_degrades_to_available_periods() {
        assert_eq!(trailing_sma(&[1.0, 2.0, 3.0]), Some((2.0, 3)));
        let (sma, window) = trailing_sma(&rising(25)).unwrap();
        assert_eq!(window, 20);
        assert!((sma - 114.5).abs() < 1e-9);
        assert_eq!(trailing_sma(&[]), None);
    }

    #[test]
    fn test_trend_is_strict() {
        assert_eq!(classify_trend(101.0, 100.0), Trend::Bullish);
        assert_eq!(classify_trend(100.0, 100.0), Trend::Bearish);
        assert_eq!(classify_trend(99.0, 100.0), Trend::Bearish);
    }

    #[test]
    fn test_report_for_rising_series() {
        let ticker = Ticker::parse("TSLA").unwrap();
        let report = compute_report(&ticker, &PriceSeries::from_closes(&rising(25))).unwrap();

        assert_eq!(report.current_price, 124.0);
        assert_eq!(report.rsi_14, Some(100.0));
        assert_eq!(report.trend, Trend::Bullish);
        assert_eq!(report.sma_window, 20);
    }

    #[test]
    fn test_short_series_has_no_rsi() {
        let ticker = Ticker::parse("NEW").unwrap();
        let report = compute_report(&ticker, &PriceSeries::from_closes(&[10.0, 9.0, 11.0])).unwrap();
        assert_eq!(report.rsi_14, None);
        assert_eq!(report.sma_window, 3);
        assert_eq!(report.trend, Trend::Bullish);
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let ticker = Ticker::parse("ZZZ").unwrap();
        let err = compute_report(&ticker, &PriceSeries::default()).unwrap_err();
        assert!(matches!(err, ScoutError::NoData { .. }));
    }

    #[test]
    fn test_snapshot_change() {
        let ticker = Ticker::parse("AAPL").unwrap();
        let snapshot =
            MarketSnapshot::from_series(&ticker, &PriceSeries::from_closes(&[200.0, 210.0])).unwrap();
        assert_eq!(snapshot.price, 210.0);
        assert_eq!(snapshot.change, Some(10.0));
        assert!((snapshot.change_percent.unwrap() - 5.0).abs() < 1e-9);

        let single =
            MarketSnapshot::from_series(&ticker, &PriceSeries::from_closes(&[200.0])).unwrap();
        assert_eq!(single.change, None);
    }

    #[tokio::test]
    async fn test_engine_requests_one_month() {
        let mut feed = MockPriceFeed::new();
        feed.expect_fetch_price_series()
            .withf(|ticker, days| ticker.as_str() == "TSLA" && *days == PRICE_WINDOW_DAYS)
            .times(1)
            .returning(|_, _| Ok(PriceSeries::from_closes(&rising(25))));

        let engine = IndicatorEngine::new(Arc::new(feed));
        let report = engine.analyze(&Ticker::parse("tsla").unwrap()).await.unwrap();
        assert_eq!(report.trend, Trend::Bullish);
    }
}
