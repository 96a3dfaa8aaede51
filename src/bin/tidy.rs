//! Re-render every JSON catalog in a directory with the standard layout
//! (2-space indentation, trailing newline) without changing its contents.
//!
//! Usage:
//!   cargo run --bin tidy
//!   cargo run --bin tidy -- --locales-dir ./i18n
//!
//! Optional:
//! - LOCALES_DIR (defaults to ./i18n)

use anyhow::Result;
use catalog_fill::config::DEFAULT_LOCALES_DIR;
use catalog_fill::normalize::tidy_directory;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tidy", about = "Normalize the formatting of JSON locale catalogs")]
struct TidyArgs {
    /// Directory containing locale files
    #[arg(short = 'd', long, env = "LOCALES_DIR", default_value = DEFAULT_LOCALES_DIR)]
    locales_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_fill=info".parse()?),
        )
        .init();

    let args = TidyArgs::parse();
    tidy_directory(&args.locales_dir).await?;
    Ok(())
}
