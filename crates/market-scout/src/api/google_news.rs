//! Google News RSS headline collaborator

use super::NewsFeed;
use crate::error::{Result, ScoutError};
use crate::model::Ticker;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_BASE: &str = "https://news.google.com/rss/search";
const USER_AGENT: &str = "Mozilla/5.0";

/// Headlines from the Google News RSS search feed
pub struct GoogleNewsFeed {
    client: Client,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    parser: RssTitles,
}

impl GoogleNewsFeed {
    /// Create a feed limited to `requests_per_minute`
    pub fn new(requests_per_minute: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            base_url: DEFAULT_BASE.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            parser: RssTitles::new()?,
        })
    }

    /// Point the feed at another RSS search endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search URL for a ticker
    pub fn search_url(&self, ticker: &Ticker) -> String {
        let query = ticker.as_str().replace('^', "%5E").replace('=', "%3D");
        format!("{}?q={query}+stock&hl=en-US&gl=US&ceid=US:en", self.base_url)
    }
}

#[async_trait]
impl NewsFeed for GoogleNewsFeed {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn fetch_headlines(&self, ticker: &Ticker, limit: usize) -> Result<Vec<String>> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(self.search_url(ticker)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Feed(format!("Google News returned HTTP {status}")));
        }

        let body = response.text().await?;
        let mut titles = self.parser.parse(&body);
        titles.truncate(limit);
        debug!(headlines = titles.len(), "Fetched headlines");
        Ok(titles)
    }
}

/// Extract `<item><title>` text from an RSS document, in document order
pub fn parse_rss_titles(xml: &str) -> Result<Vec<String>> {
    Ok(RssTitles::new()?.parse(xml))
}

/// Compiled patterns for pulling item titles out of RSS
struct RssTitles {
    item: Regex,
    title: Regex,
    cdata: Regex,
}

impl RssTitles {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ScoutError::Feed(format!("Invalid RSS pattern: {e}")))
        };
        Ok(Self {
            item: compile(r"(?s)<item\b[^>]*>(.*?)</item>")?,
            title: compile(r"(?s)<title\b[^>]*>(.*?)</title>")?,
            cdata: compile(r"(?s)<!\[CDATA\[(.*?)\]\]>")?,
        })
    }

    fn parse(&self, xml: &str) -> Vec<String> {
        self.item
            .captures_iter(xml)
            .filter_map(|item| {
                let title = self.title.captures(item.get(1)?.as_str())?.get(1)?.as_str();
                let text = match self.cdata.captures(title) {
                    Some(cdata) => cdata.get(1).map_or(String::new(), |m| m.as_str().to_string()),
                    None => decode_entities(title),
                };
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!text.is_empty()).then_some(text)
            })
            .collect()
    }
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';').filter(|&e| e <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };

        let entity = &tail[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
