use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "pinned-repos-server")]
#[command(about = "Pinned Repos Server - Serves the pinned repositories of GitHub users as JSON")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Port to listen on (bound on all interfaces)
    #[arg(long, env = "PORT", default_value_t = 80)]
    pub port: u16,

    /// Maximum number of usernames kept in the cache
    #[arg(long, env = "CACHE_CAPACITY", default_value_t = 500)]
    pub cache_capacity: usize,

    /// Deadline in seconds for every outbound page fetch
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 5)]
    pub fetch_timeout_secs: u64,
}
