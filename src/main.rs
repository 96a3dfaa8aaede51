use anyhow::{Context, Result};
use catalog_fill::catalog::CatalogSet;
use catalog_fill::config::{CliArgs, Config};
use catalog_fill::provider::Provider;
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_fill=info".parse()?),
        )
        .init();

    let args = CliArgs::parse();
    run(&args).await
}

async fn run(args: &CliArgs) -> Result<()> {
    let config = Config::resolve(args).context("Invalid configuration")?;

    info!("Locales directory: {}", config.locales_dir.display());
    info!("Using provider: {} with model: {}", config.provider, config.model);

    let provider = Provider::from_config(&config)
        .await
        .context("Failed to set up translation provider")?;

    let catalogs = CatalogSet::new(&config.locales_dir);
    let summary = catalogs.run(&provider, &config.target_languages).await?;

    info!(
        "Done: {} locale(s), {} translated, {} preserved, {} fell back to source text",
        summary.locales.len(),
        summary.translated(),
        summary.preserved(),
        summary.fallbacks()
    );

    if summary.is_fully_degraded() {
        warn!("Every translation request failed; check the provider credentials and endpoint");
    }

    summary.check(&config)
}
