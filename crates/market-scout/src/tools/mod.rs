//! Capabilities exposed to the analyst loop

mod news;
mod technical;

pub use news::{NewsSentimentAnalyst, render_sentiment};
pub use technical::{TechnicalAnalyst, render_indicators};

use crate::indicators::IndicatorEngine;
use crate::sentiment::SentimentEngine;
use scout_tools::CapabilityRegistry;
use std::sync::Arc;

/// Registry holding both analyst capabilities
pub fn analyst_registry(indicators: IndicatorEngine, sentiment: SentimentEngine) -> CapabilityRegistry {
    CapabilityRegistry::builder()
        .register(Arc::new(TechnicalAnalyst::new(indicators)))
        .register(Arc::new(NewsSentimentAnalyst::new(sentiment)))
        .build()
}
