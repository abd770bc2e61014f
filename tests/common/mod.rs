#![allow(dead_code)]

use pinned_repos_server::error::{PinnedReposError, Result};
use pinned_repos_server::extractor::RepoSource;
use pinned_repos_server::github::PageFetcher;
use pinned_repos_server::types::{repo_image, repo_link, PinnedRepo};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

pub const PROFILE_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<div class="js-pinned-items-reorder-container">
  <ol class="d-flex flex-wrap list-style-none">
    <li class="mb-3 d-flex flex-content-stretch col-12 col-md-6 col-lg-6">
      <div class="Box pinned-item-list-item d-flex p-3 width-full public source">
        <div class="pinned-item-list-item-content">
          <div class="d-flex width-full flex-items-center">
            <a href="/octocat/Spoon-Knife" class="Link mr-1 text-bold wb-break-word">
              <span class="repo" title="Spoon-Knife">Spoon-Knife</span>
            </a>
          </div>
          <p class="pinned-item-desc color-fg-muted text-small mt-2 mb-0">
            This repo is for demonstration purposes only.
          </p>
          <p class="mb-0 f6 color-fg-muted">
            <span class="d-inline-block mr-3">
              <span class="repo-language-color" style="background-color: #e34c26"></span>
              <span itemprop="programmingLanguage">HTML</span>
            </span>
            <a href="/octocat/Spoon-Knife/stargazers" class="pinned-item-meta Link--muted">
              <svg aria-label="stars" role="img"></svg>
              12.9k
            </a>
            <a href="/octocat/Spoon-Knife/forks" class="pinned-item-meta Link--muted">
              <svg aria-label="forks" role="img"></svg>
              153k
            </a>
          </p>
        </div>
      </div>
    </li>
    <li class="mb-3 d-flex flex-content-stretch col-12 col-md-6 col-lg-6">
      <div class="Box pinned-item-list-item d-flex p-3 width-full public source">
        <div class="pinned-item-list-item-content">
          <a href="/octocat/linguist" class="Link mr-1 text-bold wb-break-word">
            <span class="repo" title="linguist">linguist</span>
          </a>
          <p class="pinned-item-desc color-fg-muted text-small mt-2 mb-0">
          </p>
          <p class="mb-0 f6 color-fg-muted">
            <a href="/octocat/linguist/stargazers" class="pinned-item-meta Link--muted">
              211
            </a>
          </p>
        </div>
      </div>
    </li>
  </ol>
</div>
</body></html>
"#;

/// A pinned card whose repository name element is missing.
pub const PROFILE_HTML_WITHOUT_REPO_NAME: &str = r#"<!DOCTYPE html>
<html><body>
<div class="Box pinned-item-list-item d-flex p-3 width-full public source">
  <div class="pinned-item-list-item-content">
    <p class="pinned-item-desc color-fg-muted text-small mt-2 mb-0">Card without a name</p>
    <p class="mb-0 f6 color-fg-muted">
      <a href="/octocat/stargazers" class="pinned-item-meta Link--muted">7</a>
    </p>
  </div>
</div>
</body></html>
"#;

pub const EMPTY_PROFILE_HTML: &str = r#"<!DOCTYPE html>
<html><body><div class="js-profile-editable-area"><h1>octocat</h1></div></body></html>
"#;

pub const REPO_HTML_WITH_WEBSITE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="Layout-sidebar">
  <div class="BorderGrid">
    <div class="BorderGrid-row">
      <div class="BorderGrid-cell">
        <h2>About</h2>
        <a href="/topics/demo" class="topic-tag">demo</a>
        <a href="  https://octocat.github.io/Spoon-Knife  " class="text-bold">octocat.github.io</a>
      </div>
    </div>
  </div>
</div>
</body></html>
"#;

pub const REPO_HTML_WITHOUT_WEBSITE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="BorderGrid-cell"><h2>About</h2><p>No description</p></div>
</body></html>
"#;

/// Canned page per URL. Unknown URLs fail with `NotFound`.
pub struct FakeFetcher {
    pages: HashMap<String, FakePage>,
}

pub enum FakePage {
    Html(&'static str),
    Status(u16),
    Timeout,
    /// Respond after a delay, to shuffle completion order.
    Delayed(Duration, &'static str),
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

impl PageFetcher for FakeFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        match self.pages.get(url) {
            Some(FakePage::Html(html)) => Ok(html.to_string()),
            Some(FakePage::Delayed(delay, html)) => {
                tokio::time::sleep(*delay).await;
                Ok(html.to_string())
            }
            Some(FakePage::Status(status)) => Err(PinnedReposError::UpstreamStatus {
                url: url.to_string(),
                status: *status,
            }),
            Some(FakePage::Timeout) => Err(PinnedReposError::Timeout(url.to_string())),
            None => Err(PinnedReposError::NotFound(url.to_string())),
        }
    }
}

pub fn sample_repo(owner: &str, name: &str, stars: u64) -> PinnedRepo {
    PinnedRepo {
        owner: owner.to_string(),
        repo: name.to_string(),
        link: repo_link(owner, name),
        description: Some(format!("{} by {}", name, owner)),
        image: repo_image(owner, name),
        website: None,
        language: Some("Rust".to_string()),
        language_color: Some("#dea584".to_string()),
        stars,
        forks: 0,
    }
}

/// Repo source with controllable results, call counting and an optional gate
/// that holds fetches until released. The gate applies to every username, or
/// to one username only after `hold_user`.
pub struct ScriptedSource {
    calls: AtomicUsize,
    generation: AtomicUsize,
    failing: AtomicBool,
    gate: watch::Sender<bool>,
    held_user: Mutex<Option<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            generation: AtomicUsize::new(1),
            failing: AtomicBool::new(false),
            gate: watch::Sender::new(true),
            held_user: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Later fetches report `stars == generation`.
    pub fn set_generation(&self, generation: usize) {
        self.generation.store(generation, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Holds fetches for `username` while others go through.
    pub fn hold_user(&self, username: &str) {
        *self.held_user.lock().unwrap() = Some(username.to_string());
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
        *self.held_user.lock().unwrap() = None;
    }

    fn is_held(&self, username: &str) -> bool {
        match self.held_user.lock().unwrap().as_deref() {
            Some(held) => held == username,
            None => true,
        }
    }
}

impl RepoSource for ScriptedSource {
    async fn pinned_repos(&self, username: &str) -> Result<Vec<PinnedRepo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.is_held(username) {
            let mut gate = self.gate.subscribe();
            let _ = gate.wait_for(|open| *open).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(PinnedReposError::UpstreamStatus {
                url: format!("https://github.com/{}", username),
                status: 502,
            });
        }

        let stars = self.generation.load(Ordering::SeqCst) as u64;
        Ok(vec![sample_repo(username, "project", stars)])
    }
}

/// Polls `condition` until it holds, panicking after `timeout`.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let waited = tokio::time::timeout(timeout, async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "Condition not met within {:?}", timeout);
}
