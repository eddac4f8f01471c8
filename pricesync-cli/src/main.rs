use anyhow::Context;
use pricesync_cli::run_fixture;
use pricesync_store::{Config, PageFixture};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        // stdout carries the report
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: pricesync <page.json>")?;
    let fixture = PageFixture::load(&path)?;
    tracing::info!("Running page {} with {} blocks", fixture.url, fixture.configs.len());

    let report = run_fixture(fixture, config.engine).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
