use serde::{Deserialize, Serialize};

pub const GITHUB_BASE_URL: &str = "https://github.com";
pub const OPENGRAPH_BASE_URL: &str = "https://opengraph.githubassets.com/1";

/// A repository featured on a user's profile page, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedRepo {
    pub owner: String,
    pub repo: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_color: Option<String>,
    pub stars: u64,
    pub forks: u64,
}

/// `https://github.com/{owner}/{repo}`
pub fn repo_link(owner: &str, repo: &str) -> String {
    format!("{}/{}/{}", GITHUB_BASE_URL, owner, repo)
}

/// Social preview image rendered by GitHub's OpenGraph service.
pub fn repo_image(owner: &str, repo: &str) -> String {
    format!("{}/{}/{}", OPENGRAPH_BASE_URL, owner, repo)
}

// Raw strings pulled out of one pinned-item container, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedItem {
    pub repo: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub language_color: Option<String>,
    pub stars: Option<String>,
    pub forks: Option<String>,
}
