use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pubmed_affiliations::{ClientConfig, PubMedClient, run};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "get-papers-list",
    about = "Fetch research papers from PubMed and list authors with company affiliations",
    long_about = "Searches PubMed, keeps authors whose affiliation matches a company keyword \
                  (Inc., Ltd., Pharma, Biotech, ...) and prints the result or saves it as CSV.\n\n\
                  Environment: NCBI_API_KEY, NCBI_EMAIL, NCBI_TOOL, PUBMED_BASE_URL, \
                  PUBMED_TIMEOUT_SECS, PUBMED_MAX_RESULTS, RUST_LOG"
)]
struct Cli {
    /// Search query for PubMed
    query: String,

    /// Filename to save results (if not provided, prints to console)
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();

    let config = ClientConfig::from_env().context("Invalid configuration in environment")?;
    let client = PubMedClient::with_config(config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&client, &cli.query, cli.file.as_deref(), &mut out)
        .await
        .with_context(|| format!("Failed to build report for query {:?}", cli.query))?;

    Ok(())
}
