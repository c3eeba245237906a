//! `NewsSentimentAnalyst` capability

use crate::error::ScoutError;
use crate::model::{SentimentReport, Ticker};
use crate::sentiment::SentimentEngine;
use async_trait::async_trait;
use scout_tools::Capability;
use std::fmt::Write;
use tracing::warn;

/// Headline sentiment for a ticker, as text for the model
pub struct NewsSentimentAnalyst {
    engine: SentimentEngine,
}

impl NewsSentimentAnalyst {
    pub fn new(engine: SentimentEngine) -> Self {
        Self { engine }
    }
}

/// Text block the model reads for a sentiment report
pub fn render_sentiment(report: &SentimentReport) -> String {
    let mut out = format!(
        "Recent News Sentiment for {}: {} (Score: {:.2})\nTop Recent Headlines:\n",
        report.ticker, report.label, report.score
    );
    for headline in &report.headlines {
        let _ = writeln!(out, "- {headline}");
    }
    out
}

#[async_trait]
impl Capability for NewsSentimentAnalyst {
    async fn invoke(&self, argument: &str) -> String {
        let Ok(ticker) = Ticker::parse(argument) else {
            return format!("No recent news found for {}.", argument.trim());
        };

        match self.engine.analyze(&ticker).await {
            Ok(report) => render_sentiment(&report),
            Err(ScoutError::NoData { .. }) => format!("No recent news found for {ticker}."),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "News sentiment failed");
                format!("Error fetching news data: {e}")
            }
        }
    }

    fn name(&self) -> &str {
        "NewsSentimentAnalyst"
    }

    fn description(&self) -> &str {
        "Use to get recent news headlines and sentiment."
    }
}
