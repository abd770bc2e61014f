use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinnedReposError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Refresh worker error: {0}")]
    ActorError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PinnedReposError {
    /// Classify a reqwest failure for `url`, separating deadline overruns from
    /// other transport errors.
    pub fn from_request(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PinnedReposError::Timeout(url.to_string())
        } else {
            PinnedReposError::NetworkError(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, PinnedReposError>;
