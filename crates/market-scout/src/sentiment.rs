//! Sentiment Engine: headline polarity and a discrete label

use crate::api::{HEADLINE_LIMIT, NewsFeed};
use crate::error::{Result, ScoutError};
use crate::model::{SentimentLabel, SentimentReport, Ticker};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-text polarity in [-1, 1], deterministic for identical input
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Word lexicon tuned for market headlines
const LEXICON: &[(&str, f64)] = &[
    // positive
    ("soar", 0.6), ("soars", 0.6), ("soared", 0.6), ("soaring", 0.6),
    ("surge", 0.5), ("surges", 0.5), ("surged", 0.5), ("surging", 0.5),
    ("jump", 0.4), ("jumps", 0.4), ("jumped", 0.4),
    ("rally", 0.5), ("rallies", 0.5), ("rallied", 0.5),
    ("gain", 0.3), ("gains", 0.3), ("gained", 0.3),
    ("rise", 0.3), ("rises", 0.3), ("rising", 0.3), ("rose", 0.3),
    ("climb", 0.3), ("climbs", 0.3), ("climbed", 0.3),
    ("beat", 0.4), ("beats", 0.4), ("tops", 0.3), ("exceeds", 0.4),
    ("record", 0.3), ("profit", 0.4), ("profits", 0.4), ("profitable", 0.5),
    ("growth", 0.4), ("growing", 0.3), ("strong", 0.4), ("stronger", 0.4),
    ("upgrade", 0.5), ("upgrades", 0.5), ("upgraded", 0.5), ("outperform", 0.5),
    ("bullish", 0.6), ("optimistic", 0.5), ("boost", 0.4), ("boosts", 0.4),
    ("win", 0.5), ("wins", 0.5), ("success", 0.6), ("successful", 0.6),
    ("good", 0.7), ("great", 0.8), ("best", 1.0), ("positive", 0.5),
    ("buy", 0.3), ("high", 0.16), ("higher", 0.25), ("highs", 0.3),
    ("breakthrough", 0.6), ("innovative", 0.5), ("expands", 0.3), ("approval", 0.4),
    ("rebound", 0.4), ("rebounds", 0.4), ("recovery", 0.3), ("dividend", 0.2),
    // negative
    ("plunge", -0.6), ("plunges", -0.6), ("plunged", -0.6), ("plunging", -0.6),
    ("crash", -0.7), ("crashes", -0.7), ("crashed", -0.7),
    ("tumble", -0.5), ("tumbles", -0.5), ("tumbled", -0.5),
    ("fall", -0.3), ("falls", -0.3), ("fell", -0.3), ("falling", -0.3),
    ("drop", -0.3), ("drops", -0.3), ("dropped", -0.3),
    ("slump", -0.5), ("slumps", -0.5), ("sink", -0.4), ("sinks", -0.4),
    ("loss", -0.4), ("losses", -0.4), ("lose", -0.4), ("loses", -0.4),
    ("miss", -0.4), ("misses", -0.4), ("missed", -0.4),
    ("weak", -0.4), ("weaker", -0.4), ("weakness", -0.4),
    ("downgrade", -0.5), ("downgrades", -0.5), ("downgraded", -0.5), ("underperform", -0.5),
    ("bearish", -0.6), ("pessimistic", -0.5), ("fear", -0.5), ("fears", -0.5),
    ("lawsuit", -0.4), ("probe", -0.3), ("investigation", -0.3), ("fraud", -0.8),
    ("recall", -0.4), ("recalls", -0.4), ("layoffs", -0.5), ("cuts", -0.3),
    ("bad", -0.7), ("worst", -1.0), ("terrible", -1.0), ("negative", -0.3),
    ("sell", -0.3), ("selloff", -0.5), ("low", -0.1), ("lower", -0.2), ("lows", -0.3),
    ("risk", -0.2), ("risks", -0.2), ("warning", -0.4), ("warns", -0.4),
    ("decline", -0.4), ("declines", -0.4), ("declined", -0.4), ("bankruptcy", -0.9),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "without", "nor", "cannot"];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("sharply", 1.4),
    ("massive", 1.4),
    ("huge", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.7),
];

/// Modifiers stay armed for this many tokens
const MODIFIER_REACH: usize = 3;

/// Lexicon-based polarity with negation and intensifier handling
///
/// Each matched word contributes its lexicon score, scaled by a preceding
/// intensifier and flipped (at half strength) by a preceding negation. The
/// text polarity is the mean of contributions, clamped to [-1, 1], and 0.0
/// when nothing matches.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            words: LEXICON.iter().map(|&(w, s)| (w.to_string(), s)).collect(),
            intensifiers: INTENSIFIERS.iter().map(|&(w, s)| (w.to_string(), s)).collect(),
        }
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a lexicon entry
    pub fn with_word(mut self, word: &str, score: f64) -> Self {
        self.words.insert(word.to_lowercase(), score.clamp(-1.0, 1.0));
        self
    }

    fn is_negation(token: &str) -> bool {
        NEGATIONS.contains(&token) || token.ends_with("n't")
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let tokens = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty());

        let mut contributions = Vec::new();
        let mut negated = false;
        let mut boost = 1.0;
        let mut armed_for = 0;

        for token in tokens {
            if Self::is_negation(token) {
                negated = true;
                armed_for = MODIFIER_REACH;
                continue;
            }
            if let Some(&factor) = self.intensifiers.get(token) {
                boost *= factor;
                armed_for = MODIFIER_REACH;
                continue;
            }

            if let Some(&score) = self.words.get(token) {
                let mut value = score * boost;
                if negated {
                    value *= -0.5;
                }
                contributions.push(value.clamp(-1.0, 1.0));
                armed_for = 0;
            } else {
                armed_for = armed_for.saturating_sub(1);
            }

            if armed_for == 0 {
                negated = false;
                boost = 1.0;
            }
        }

        mean(&contributions).map_or(0.0, |m| m.clamp(-1.0, 1.0))
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Score headlines and label the mean; `None` when there are no headlines
pub fn score_headlines(
    ticker: &Ticker,
    headlines: Vec<String>,
    scorer: &dyn PolarityScorer,
) -> Option<SentimentReport> {
    let polarities: Vec<f64> = headlines.iter().map(|h| scorer.polarity(h)).collect();
    let score = mean(&polarities)?.clamp(-1.0, 1.0);

    Some(SentimentReport {
        ticker: ticker.clone(),
        label: SentimentLabel::classify(score),
        score,
        headlines,
    })
}

/// Fetches recent headlines and scores them
#[derive(Clone)]
pub struct SentimentEngine {
    feed: Arc<dyn NewsFeed>,
    scorer: Arc<dyn PolarityScorer>,
}

impl SentimentEngine {
    pub fn new(feed: Arc<dyn NewsFeed>, scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { feed, scorer }
    }

    /// Sentiment of the latest headlines; `NoData` when the feed has none
    pub async fn analyze(&self, ticker: &Ticker) -> Result<SentimentReport> {
        let mut headlines = self.feed.fetch_headlines(ticker, HEADLINE_LIMIT).await?;
        headlines.truncate(HEADLINE_LIMIT);
        debug!(ticker = %ticker, headlines = headlines.len(), "Scoring headlines");

        score_headlines(ticker, headlines, self.scorer.as_ref()).ok_or_else(|| ScoutError::NoData {
            ticker: ticker.to_string(),
            reason: "no recent headlines".to_string(),
        })
    }
}
