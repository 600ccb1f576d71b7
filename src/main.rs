//! CLI entry point for sfdc-export

use clap::Parser;
use sfdc_export::{Config, Exporter, RestClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Export Notes & Attachments from Salesforce
#[derive(Parser)]
#[command(name = "sfdc-export", version, about = "Export Notes & Attachments from Salesforce")]
struct Cli {
    /// SOQL selecting the parent records whose attachments and notes should
    /// be downloaded. Must return the Id(s) of the parent objects.
    #[arg(short, long)]
    query: String,

    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "export.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "export failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> sfdc_export::Result<()> {
    let config = Config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.loglevel)),
        )
        .init();

    tracing::info!("Export Attachments & Notes from Salesforce");
    tracing::info!(username = %config.username, "Username");
    tracing::info!(output_dir = %config.output_dir.display(), "Output directory");

    let client = RestClient::login(&config).await?;
    tracing::info!(instance = %client.instance_url(), "Connected");

    let config = Arc::new(config);
    let exporter = Exporter::new(Arc::new(client), config);
    exporter.run(&cli.query).await
}
