//! Market Scout
//!
//! On-demand ticker reports from an LLM analyst. The analyst decides when to
//! call two capabilities, `TechnicalAnalyst` (price, RSI, trend) and
//! `NewsSentimentAnalyst` (headline polarity), then writes a recommendation.
//! Reports are cached per ticker for an hour, and follow-up questions are
//! answered from the latest report without re-running the analyst.
//!
//! # Layout
//!
//! - [`api`]: price and news collaborators (Yahoo Finance, Google News RSS)
//! - [`indicators`] and [`sentiment`]: the two deterministic engines
//! - [`tools`]: the engines exposed as capabilities
//! - [`cache`], [`session`], [`chat`]: report memoization and grounded chat
//! - [`service`]: the facade the terminal talks to

pub mod api;
pub mod cache;
pub mod chat;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod indicators;
pub mod model;
pub mod prompts;
pub mod sentiment;
pub mod service;
pub mod session;
pub mod tools;

pub use cache::{REPORT_TTL, ReportCache};
pub use chat::ContextChat;
pub use commands::Command;
pub use config::{ScoutConfig, ScoutConfigBuilder};
pub use display::{PaperTrade, TradeAction, escape_dollars};
pub use error::{Result, ScoutError};
pub use indicators::{IndicatorEngine, MarketSnapshot};
pub use model::{
    AnalysisReport, Bar, ChatRole, ChatTurn, IndicatorReport, PriceSeries, SentimentLabel,
    SentimentReport, Ticker, Trend,
};
pub use sentiment::{LexiconScorer, PolarityScorer, SentimentEngine};
pub use service::{ScoutOutcome, ScoutService, ScoutServiceBuilder};
pub use session::ScoutSession;
