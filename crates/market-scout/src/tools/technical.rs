//! `TechnicalAnalyst` capability

use crate::error::ScoutError;
use crate::indicators::IndicatorEngine;
use crate::model::{IndicatorReport, Ticker};
use async_trait::async_trait;
use scout_tools::Capability;
use std::fmt::Write;
use tracing::warn;

/// Price, RSI and trend for a ticker, as text for the model
pub struct TechnicalAnalyst {
    engine: IndicatorEngine,
}

impl TechnicalAnalyst {
    pub fn new(engine: IndicatorEngine) -> Self {
        Self { engine }
    }
}

/// Text block the model reads for an indicator report
pub fn render_indicators(report: &IndicatorReport) -> String {
    let mut out = format!("Technical Analysis for {}:\n", report.ticker);
    let _ = writeln!(out, "- Current Price: ${:.2}", report.current_price);
    match report.rsi_14 {
        Some(rsi) => {
            let _ = writeln!(
                out,
                "- 14-Day RSI: {rsi:.2} (Note: >70 is overbought, <30 is oversold)"
            );
        }
        None => out.push_str("- 14-Day RSI: unavailable (fewer than 15 daily closes)\n"),
    }
    let _ = writeln!(
        out,
        "- Short-Term Trend (vs {}-day SMA): {}",
        crate::indicators::SMA_PERIOD,
        report.trend.describe()
    );
    out
}

fn no_data(symbol: &str) -> String {
    format!("Could not retrieve technical data for {symbol}. Please check the ticker symbol.")
}

#[async_trait]
impl Capability for TechnicalAnalyst {
    async fn invoke(&self, argument: &str) -> String {
        let Ok(ticker) = Ticker::parse(argument) else {
            return no_data(argument.trim());
        };

        match self.engine.analyze(&ticker).await {
            Ok(report) => render_indicators(&report),
            Err(ScoutError::NoData { .. }) => no_data(ticker.as_str()),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Technical analysis failed");
                format!("Error fetching technical data: {e}")
            }
        }
    }

    fn name(&self) -> &str {
        "TechnicalAnalyst"
    }

    fn description(&self) -> &str {
        "Use to get price, RSI, and trend of a stock."
    }
}
