//! HTTP page fetcher with mirror fallback.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::IndexConfig;

use super::{is_blocked_page, origin_of, FetchError, FetchedPage, PageFetcher};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "cs-CZ,cs;q=0.9,sk-SK;q=0.8,sk;q=0.7,en;q=0.4";

/// Fetches pages from the configured index mirrors with a browser-like
/// request profile.
pub struct HttpPageFetcher {
    client: Client,
    config: IndexConfig,
}

impl HttpPageFetcher {
    /// Create a new HttpPageFetcher with the given index configuration.
    pub fn new(config: IndexConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// One GET against one concrete URL. Status 2xx/3xx passes, everything
    /// else is an error.
    async fn fetch_one(&self, url: &str, referer: &str) -> Result<String, FetchError> {
        debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Referer", referer)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else if e.is_connect() {
                    FetchError::ConnectionFailed(e.to_string())
                } else {
                    FetchError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))
    }

    fn primary_referer(&self) -> String {
        match self.config.mirrors.first() {
            Some(mirror) => format!("{}/", mirror),
            None => String::new(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, target: &str) -> Result<FetchedPage, FetchError> {
        // Absolute URLs bypass the mirror loop.
        if target.starts_with("http://") || target.starts_with("https://") {
            let body = self.fetch_one(target, &self.primary_referer()).await?;
            let origin = origin_of(target).to_string();
            if is_blocked_page(&body) {
                return Err(FetchError::Blocked { mirror: origin });
            }
            return Ok(FetchedPage {
                body,
                mirror: origin,
            });
        }

        if !target.starts_with('/') {
            return Err(FetchError::InvalidTarget(target.to_string()));
        }

        let mut mirror_errors: HashMap<String, String> = HashMap::new();

        for mirror in &self.config.mirrors {
            let url = format!("{}{}", mirror, target);
            let referer = format!("{}/", mirror);

            match self.fetch_one(&url, &referer).await {
                Ok(body) => {
                    if is_blocked_page(&body) {
                        warn!(mirror = %mirror, "Mirror served a challenge page");
                        mirror_errors
                            .insert(mirror.clone(), "blocked/challenge page".to_string());
                        continue;
                    }
                    debug!(mirror = %mirror, "Mirror served content");
                    return Ok(FetchedPage {
                        body,
                        mirror: mirror.clone(),
                    });
                }
                Err(e) => {
                    warn!(mirror = %mirror, error = %e, "Mirror fetch failed");
                    mirror_errors.insert(mirror.clone(), e.to_string());
                }
            }
        }

        Err(FetchError::AllMirrorsFailed(mirror_errors))
    }
}
