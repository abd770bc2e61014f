use crate::error::{PinnedReposError, Result};
use crate::types::GITHUB_BASE_URL;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

// Profile pages render differently (or not at all) for non-browser agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Source of raw HTML pages. The production implementation is [`GitHubClient`];
/// tests substitute canned pages.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct GitHubClient {
    client: Client,
}

impl GitHubClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(GitHubClient { client })
    }
}

impl PageFetcher for GitHubClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| PinnedReposError::from_request(url, e))?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| PinnedReposError::from_request(url, e))?;
                debug!(url, bytes = body.len(), "Fetched page");
                Ok(body)
            }
            StatusCode::NOT_FOUND => Err(PinnedReposError::NotFound(url.to_string())),
            status => Err(PinnedReposError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Profile page URL with the username encoded as a single path segment.
pub fn profile_url(username: &str) -> Result<String> {
    let mut url = Url::parse(GITHUB_BASE_URL)
        .map_err(|e| PinnedReposError::InvalidUsername(format!("{}: {}", username, e)))?;

    url.path_segments_mut()
        .map_err(|_| PinnedReposError::InvalidUsername(username.to_string()))?
        .pop_if_empty()
        .push(username);

    Ok(url.to_string())
}
