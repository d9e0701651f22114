use std::error::Error;

use github_search::{GitHubSearchClient, SearchConfig};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod shell;
mod telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // `.env` is optional; GITHUB_TOKEN may come from the real environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", Level::INFO))
        .with(telemetry::layer())
        .try_init()?;

    let config = SearchConfig::from_env()?;
    let client = GitHubSearchClient::new(config)?;

    shell::run(client).await?;

    Ok(())
}
