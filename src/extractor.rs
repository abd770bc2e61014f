use crate::error::Result;
use crate::github::{profile_url, PageFetcher};
use crate::markup;
use crate::types::{repo_image, repo_link, PinnedItem, PinnedRepo};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Anything that can produce the pinned repositories of a user. The
/// coordinator and refresh worker only depend on this.
pub trait RepoSource: Send + Sync + 'static {
    fn pinned_repos(&self, username: &str) -> impl Future<Output = Result<Vec<PinnedRepo>>> + Send;
}

pub struct PinnedRepoExtractor<F> {
    fetcher: Arc<F>,
}

impl<F: PageFetcher> PinnedRepoExtractor<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Scrapes the profile page of `username`.
    ///
    /// Fails only when the profile page itself cannot be fetched. A page with
    /// no pinned items yields an empty list, and every per-item lookup is best
    /// effort.
    pub async fn fetch_pinned_repos(&self, username: &str) -> Result<Vec<PinnedRepo>> {
        let url = profile_url(username)?;
        let html = self.fetcher.fetch_page(&url).await?;

        // The parsed document is not Send, so it must be gone before the next await.
        let items = markup::parse_pinned_items(&html);
        if items.is_empty() {
            debug!(username, "No pinned items on profile page");
            return Ok(Vec::new());
        }

        let repos = join_all(items.into_iter().map(|item| self.build_repo(username, item))).await;

        info!(username, repos = repos.len(), "Extracted pinned repositories");
        Ok(repos)
    }

    /// Looks up the external website of a repository. Never fails: any error
    /// is logged and reported as `None`.
    pub async fn discover_website(&self, repo_url: &str) -> Option<String> {
        match self.fetcher.fetch_page(repo_url).await {
            Ok(html) => markup::find_website(&html),
            Err(e) => {
                warn!(url = repo_url, error = %e, "Website discovery failed");
                None
            }
        }
    }

    async fn build_repo(&self, owner: &str, item: PinnedItem) -> PinnedRepo {
        let repo = item.repo.unwrap_or_default();
        let link = repo_link(owner, &repo);
        // Without a name the link points back at the profile page.
        let website = if repo.is_empty() {
            None
        } else {
            self.discover_website(&link).await
        };

        PinnedRepo {
            owner: owner.to_string(),
            image: repo_image(owner, &repo),
            link,
            description: item.description,
            website,
            language: item.language,
            language_color: item.language_color,
            stars: normalize_count(item.stars.as_deref().unwrap_or_default()),
            forks: normalize_count(item.forks.as_deref().unwrap_or_default()),
            repo,
        }
    }
}

impl<F: PageFetcher> RepoSource for PinnedRepoExtractor<F> {
    async fn pinned_repos(&self, username: &str) -> Result<Vec<PinnedRepo>> {
        self.fetch_pinned_repos(username).await
    }
}

/// Turns a displayed counter ("5", "1.2k") into a number. Anything that does
/// not parse counts as 0; thousands separators are not understood.
pub fn normalize_count(text: &str) -> u64 {
    let value = text.trim().to_lowercase();
    if value.is_empty() {
        return 0;
    }

    match value.strip_suffix('k') {
        Some(thousands) => thousands
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| (n * 1000.0).round() as u64)
            .unwrap_or(0),
        None => value.parse::<u64>().unwrap_or(0),
    }
}
