//! Service facade wiring the engines, the analyst loop, the cache and chat

use crate::api::{GoogleNewsFeed, NewsFeed, PriceFeed, YahooPriceFeed};
use crate::cache::ReportCache;
use crate::chat::ContextChat;
use crate::config::ScoutConfig;
use crate::display::{PaperTrade, TradeAction};
use crate::error::{Result, ScoutError};
use crate::indicators::{IndicatorEngine, MarketSnapshot};
use crate::model::{AnalysisReport, Ticker};
use crate::prompts::Prompts;
use crate::sentiment::{LexiconScorer, PolarityScorer, SentimentEngine};
use crate::session::ScoutSession;
use crate::tools::analyst_registry;
use scout_agent::{
    NoOpObserver, Orchestrator, OrchestratorConfig, RunObserver, SingleShot, SingleShotConfig, Trace,
};
use scout_llm::LLMProvider;
use scout_llm::providers::{GeminiConfig, GeminiProvider};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Result of a scout request
#[derive(Debug, Clone)]
pub struct ScoutOutcome {
    pub report: AnalysisReport,
    /// Whether the report came from the cache instead of a fresh run
    pub cached: bool,
}

/// Entry point for the terminal and any other front end
///
/// Holds one conversation: the latest report and its chat log are shared by
/// every call on the same service.
pub struct ScoutService {
    orchestrator: Orchestrator,
    chat: ContextChat,
    cache: ReportCache,
    indicators: IndicatorEngine,
    prompts: Arc<Prompts>,
    session: RwLock<ScoutSession>,
    last_trace: RwLock<Option<Trace>>,
}

impl ScoutService {
    /// Start a builder
    pub fn builder() -> ScoutServiceBuilder {
        ScoutServiceBuilder::default()
    }

    /// Production wiring: Gemini, Yahoo Finance and Google News
    pub fn from_config(config: ScoutConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ScoutError::Config("GOOGLE_API_KEY is not set".to_string()))?;

        let mut gemini = GeminiConfig::new(api_key).with_timeout(config.request_timeout.as_secs());
        if let Some(base) = scout_utils::env_string("GEMINI_API_BASE") {
            gemini = gemini.with_api_base(base);
        }
        let provider =
            GeminiProvider::with_config(gemini).map_err(|e| ScoutError::Config(e.to_string()))?;
        let news = GoogleNewsFeed::new(config.news_rate_limit, config.request_timeout)?;

        Self::builder()
            .provider(Arc::new(provider))
            .price_feed(Arc::new(YahooPriceFeed::new()))
            .news_feed(Arc::new(news))
            .config(config)
            .build()
    }

    /// Report for `ticker`, served from the cache when still live
    pub async fn scout(&self, ticker: &Ticker) -> Result<ScoutOutcome> {
        self.scout_observed(ticker, Arc::new(NoOpObserver)).await
    }

    /// Like [`scout`](Self::scout), reporting loop progress to `observer`
    pub async fn scout_observed(
        &self,
        ticker: &Ticker,
        observer: Arc<dyn RunObserver>,
    ) -> Result<ScoutOutcome> {
        let mut fresh = false;
        let report = self
            .cache
            .get_or_compute(ticker, || {
                fresh = true;
                self.run_analysis(ticker, observer)
            })
            .await?;

        let greeting = self.prompts.greeting(&report.ticker)?;
        self.session.write().await.install(report.clone(), greeting);
        info!(ticker = %ticker, cached = !fresh, "Report installed");

        Ok(ScoutOutcome {
            report,
            cached: !fresh,
        })
    }

    async fn run_analysis(
        &self,
        ticker: &Ticker,
        observer: Arc<dyn RunObserver>,
    ) -> Result<AnalysisReport> {
        let instruction = self.prompts.instruction(ticker)?;
        let outcome = match self.orchestrator.run_observed(instruction, observer).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Analysis run failed");
                return Err(e.into());
            }
        };

        info!(
            ticker = %ticker,
            turns = outcome.turns,
            calls = outcome.trace.len(),
            "Analysis run finished"
        );
        *self.last_trace.write().await = Some(outcome.trace);
        Ok(AnalysisReport::new(ticker.clone(), outcome.text.trim()))
    }

    /// Price, change and volume for the dashboard
    pub async fn snapshot(&self, ticker: &Ticker) -> Result<MarketSnapshot> {
        self.indicators.snapshot(ticker).await
    }

    /// Answer a follow-up question about the latest report
    pub async fn ask(&self, question: &str) -> Result<String> {
        let report = self.session.read().await.report().cloned();
        let answer = self.chat.ask(report.as_ref(), question).await?;

        if let Some(report) = &report {
            let recorded = self
                .session
                .write()
                .await
                .record_exchange(report, question.trim(), answer.clone());
            if !recorded {
                warn!(ticker = %report.ticker, "Report superseded while answering, reply not logged");
            }
        }
        Ok(answer)
    }

    /// Simulate an order for the latest report's ticker
    pub async fn paper_trade(&self, action: TradeAction, shares: u32) -> Result<PaperTrade> {
        let session = self.session.read().await;
        let report = session.report().ok_or(ScoutError::NoContext)?;
        let trade = PaperTrade::new(action, shares, report.ticker.clone())?;
        info!(ticker = %trade.ticker, action = %trade.action, shares, "Simulated order placed");
        Ok(trade)
    }

    /// Copy of the current conversation state
    pub async fn session(&self) -> ScoutSession {
        self.session.read().await.clone()
    }

    pub async fn latest_report(&self) -> Option<AnalysisReport> {
        self.session.read().await.report().cloned()
    }

    /// Capability calls from the most recent fresh run
    pub async fn last_trace(&self) -> Option<Trace> {
        self.last_trace.read().await.clone()
    }
}

/// Builder for [`ScoutService`]
#[derive(Default)]
pub struct ScoutServiceBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    price_feed: Option<Arc<dyn PriceFeed>>,
    news_feed: Option<Arc<dyn NewsFeed>>,
    scorer: Option<Arc<dyn PolarityScorer>>,
    cache: Option<ReportCache>,
    config: Option<ScoutConfig>,
}

impl ScoutServiceBuilder {
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn price_feed(mut self, feed: Arc<dyn PriceFeed>) -> Self {
        self.price_feed = Some(feed);
        self
    }

    pub fn news_feed(mut self, feed: Arc<dyn NewsFeed>) -> Self {
        self.news_feed = Some(feed);
        self
    }

    /// Replace the default lexicon scorer
    pub fn scorer(mut self, scorer: Arc<dyn PolarityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Use a specific cache, e.g. one with a short TTL
    pub fn cache(mut self, cache: ReportCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(mut self, config: ScoutConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<ScoutService> {
        let provider = self
            .provider
            .ok_or_else(|| ScoutError::Config("LLM provider not set".to_string()))?;
        let price_feed = self
            .price_feed
            .ok_or_else(|| ScoutError::Config("price feed not set".to_string()))?;
        let news_feed = self
            .news_feed
            .ok_or_else(|| ScoutError::Config("news feed not set".to_string()))?;
        let scorer = self.scorer.unwrap_or_else(|| Arc::new(LexiconScorer::new()));
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let prompts = Arc::new(Prompts::new()?);
        let indicators = IndicatorEngine::new(price_feed);
        let sentiment = SentimentEngine::new(news_feed, scorer);
        let registry = Arc::new(analyst_registry(indicators.clone(), sentiment));

        let orchestrator = Orchestrator::new(
            Arc::clone(&provider),
            registry,
            OrchestratorConfig {
                max_turns: config.max_turns,
                model: config.model.clone(),
                system_prompt: Some(prompts.system()?),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                ..OrchestratorConfig::default()
            },
        );

        let responder = SingleShot::new(
            provider,
            SingleShotConfig {
                model: config.model.clone(),
                system_prompt: None,
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
            "scout-chat",
        );

        Ok(ScoutService {
            orchestrator,
            chat: ContextChat::new(Arc::new(responder), Arc::clone(&prompts)),
            cache: self.cache.unwrap_or_default(),
            indicators,
            prompts,
            session: RwLock::new(ScoutSession::new()),
            last_trace: RwLock::new(None),
        })
    }
}
