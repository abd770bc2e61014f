use clap::Parser;
use colored::*;
use pinned_repos_server::cli::Cli;
use pinned_repos_server::coordinator::Coordinator;
use pinned_repos_server::extractor::PinnedRepoExtractor;
use pinned_repos_server::github::GitHubClient;
use pinned_repos_server::server::{create_router, serve, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    println!("{}", "Pinned Repos Server".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    let client = GitHubClient::new(Duration::from_secs(cli.fetch_timeout_secs))?;
    let extractor = Arc::new(PinnedRepoExtractor::new(client));

    let coordinator = Arc::new(Coordinator::spawn(extractor, cli.cache_capacity).await?);

    println!("✅ Cache ready for {} usernames", cli.cache_capacity);
    println!("⏱️  Upstream fetch timeout: {}s", cli.fetch_timeout_secs);
    println!("\nPress Ctrl+C to stop the server\n");

    let router = create_router(AppState::new(coordinator.clone()));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        println!("\n🛑 Shutting down server...");
    };

    let result = serve(router, cli.port, shutdown).await;

    let stats = coordinator.refresh_stats();
    println!("\n📊 Final Statistics:");
    println!("Background refreshes: {} requested, {} skipped, {} succeeded, {} failed",
        stats.requested, stats.skipped, stats.succeeded, stats.failed);
    let cache = coordinator.cache_stats().await;
    println!("Cache: {} / {} entries, {} hits, {} misses",
        cache.entries, cache.capacity, cache.hits, cache.misses);

    coordinator.shutdown();
    info!("Server stopped");
    println!("✅ Server stopped");

    result.map_err(Into::into)
}
