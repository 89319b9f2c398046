//! HTTP fetching behind a small trait so discovery and the pipeline can be
//! driven without the network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter as GovRateLimiter};
use reqwest::Client;
use tracing::debug;

use crate::config::ScraperConfig;

/// Fetch a URL as text. Any transport error or non-success status is an `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `reqwest`-backed fetcher with a request rate cap
pub struct HttpFetcher {
    client: Client,
    rate_limiter: GovRateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        let rate_limiter = GovRateLimiter::direct(Quota::per_second(config.rate_limit()?));

        Ok(Self { client, rate_limiter })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("GET {} failed: {}", url, response.status()));
        }

        Ok(response.text().await?)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MapFetcher;
    use super::*;

    #[test]
    fn test_http_fetcher_builds_from_defaults() {
        assert!(HttpFetcher::new(&ScraperConfig::default()).is_ok());
    }

    #[test]
    fn test_http_fetcher_rejects_zero_rate() {
        let config = ScraperConfig {
            rate_limit_per_second: 0,
            ..ScraperConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_map_fetcher_records_requests() {
        let fetcher = MapFetcher::new().with("https://a/", "body");
        assert_eq!(fetcher.fetch("https://a/").await.unwrap(), "body");
        assert!(fetcher.fetch("https://b/").await.is_err());
        assert_eq!(fetcher.requests(), ["https://a/", "https://b/"]);
    }
}
