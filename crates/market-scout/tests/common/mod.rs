//! Shared fakes for the end-to-end tests

#![allow(dead_code)]

use async_trait::async_trait;
use market_scout::api::{NewsFeed, PriceFeed};
use market_scout::{PriceSeries, ReportCache, Result, ScoutConfig, ScoutService, Ticker};
use scout_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMProvider, Message, StopReason,
    TokenUsage,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Price feed serving fixed closes per ticker; unknown tickers are empty
#[derive(Default)]
pub struct StaticPrices {
    closes: HashMap<String, Vec<f64>>,
}

impl StaticPrices {
    pub fn with(mut self, ticker: &str, closes: Vec<f64>) -> Self {
        self.closes.insert(ticker.to_string(), closes);
        self
    }
}

#[async_trait]
impl PriceFeed for StaticPrices {
    async fn fetch_price_series(&self, ticker: &Ticker, _window_days: i64) -> Result<PriceSeries> {
        Ok(self
            .closes
            .get(ticker.as_str())
            .map(|c| PriceSeries::from_closes(c))
            .unwrap_or_default())
    }
}

/// News feed serving fixed headlines per ticker; unknown tickers have none
#[derive(Default)]
pub struct StaticNews {
    headlines: HashMap<String, Vec<String>>,
}

impl StaticNews {
    pub fn with(mut self, ticker: &str, headlines: &[&str]) -> Self {
        self.headlines.insert(
            ticker.to_string(),
            headlines.iter().map(ToString::to_string).collect(),
        );
        self
    }
}

#[async_trait]
impl NewsFeed for StaticNews {
    async fn fetch_headlines(&self, ticker: &Ticker, limit: usize) -> Result<Vec<String>> {
        let mut headlines = self.headlines.get(ticker.as_str()).cloned().unwrap_or_default();
        headlines.truncate(limit);
        Ok(headlines)
    }
}

/// Model stand-in that behaves like a well-mannered analyst
///
/// With tools available it first calls both capabilities for the ticker in
/// the instruction, then writes a report quoting what they returned. Without
/// tools (grounded chat) it echoes the prompt it was given.
#[derive(Default)]
pub struct ScriptedAnalyst {
    pub analysis_calls: AtomicUsize,
    pub chat_prompts: Mutex<Vec<String>>,
    /// Keep proposing tool calls forever
    pub never_finish: bool,
}

impl ScriptedAnalyst {
    pub fn looping() -> Self {
        Self {
            never_finish: true,
            ..Self::default()
        }
    }

    fn ticker_from(instruction: &str) -> String {
        instruction
            .strip_prefix("Analyze ")
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or("UNKNOWN")
            .to_string()
    }

    fn tool_call(ticker: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![
                ContentBlock::ToolUse {
                    id: "call_tech".to_string(),
                    name: "TechnicalAnalyst".to_string(),
                    input: json!({ "ticker": ticker }),
                },
                ContentBlock::ToolUse {
                    id: "call_news".to_string(),
                    name: "NewsSentimentAnalyst".to_string(),
                    input: json!({ "ticker": ticker }),
                },
            ]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn tool_outputs(request: &CompletionRequest) -> Vec<String> {
        request
            .messages
            .iter()
            .flat_map(|m| m.tool_result_texts())
            .map(ToString::to_string)
            .collect()
    }
}

#[async_trait]
impl LLMProvider for ScriptedAnalyst {
    async fn complete(&self, request: CompletionRequest) -> scout_llm::Result<CompletionResponse> {
        if !request.offers_tools() {
            let prompt = request.opening_text().unwrap_or_default();
            self.chat_prompts.lock().unwrap().push(prompt);
            return Ok(CompletionResponse::text("RSI compares recent gains to recent losses."));
        }

        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        let ticker = Self::ticker_from(&request.opening_text().unwrap_or_default());
        let outputs = Self::tool_outputs(&request);

        if outputs.is_empty() || self.never_finish {
            return Ok(Self::tool_call(&ticker));
        }

        let lacks_data = outputs
            .iter()
            .all(|o| o.starts_with("Could not retrieve") || o.starts_with("No recent news"));
        let verdict = if lacks_data {
            format!("I could not find enough market data or news for {ticker} to make a recommendation.")
        } else {
            format!("Recommendation for {ticker}: Buy.")
        };

        // split across fragments the way real models sometimes answer
        Ok(CompletionResponse {
            message: Message::assistant_blocks(vec![
                ContentBlock::Text {
                    text: format!("- {}\n", outputs.join("\n- ")),
                },
                ContentBlock::Text { text: verdict },
            ]),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "scripted-analyst"
    }
}

pub fn rising_closes() -> Vec<f64> {
    (0..25).map(|i| 100.0 + f64::from(i)).collect()
}

pub fn service(analyst: Arc<ScriptedAnalyst>, cache: ReportCache) -> ScoutService {
    ScoutService::builder()
        .provider(analyst)
        .price_feed(Arc::new(StaticPrices::default().with("TSLA", rising_closes())))
        .news_feed(Arc::new(StaticNews::default().with(
            "TSLA",
            &["Company X soars on record profit", "Company X beats estimates"],
        )))
        .config(ScoutConfig::builder().max_turns(4).build().unwrap())
        .cache(cache)
        .build()
        .unwrap()
}
