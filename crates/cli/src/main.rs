use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use pricefeed_core::{validate_record, AppConfig, ConfigLoader};
use pricefeed_ingest::BatchIngestor;
use pricefeed_pubsub::{PubSubClientConfig, PubSubPublisher};
use pricefeed_web_api::ApiServer;
use serde_json::Value;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pricefeed")]
#[command(about = "Batch price ingestion gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP ingestion API
    Server {
        /// Server address override (host:port); defaults to the configured values
        #[arg(short, long)]
        addr: Option<String>,
        /// Config profile (also loads config/Config.<profile>.toml)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Validate a JSON file of raw records without publishing
    Validate {
        /// Path to a file containing a JSON array of raw price records
        #[arg(short, long)]
        file: String,
    },
    /// Ingest a JSON file of raw records directly, bypassing the HTTP layer
    Publish {
        /// Path to a file containing a JSON array of raw price records
        #[arg(short, long)]
        file: String,
        /// Config profile (also loads config/Config.<profile>.toml)
        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { addr, profile } => {
            let config = load_config(profile.as_deref())?;
            let addr =
                addr.unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));
            let ingestor = build_ingestor(&config)?;
            ApiServer::new(ingestor).serve(&addr).await?;
        }
        Commands::Validate { file } => {
            let batch = read_batch(&file)?;
            let mut invalid = 0usize;
            for (index, raw) in batch.iter().enumerate() {
                match validate_record(raw, Utc::now()) {
                    Ok(record) => println!("record {index}: ok (id {})", record.id),
                    Err(err) => {
                        invalid += 1;
                        println!("record {index}: invalid - {err}");
                    }
                }
            }
            println!("{} of {} records valid", batch.len() - invalid, batch.len());
            if invalid > 0 {
                std::process::exit(1);
            }
        }
        Commands::Publish { file, profile } => {
            let config = load_config(profile.as_deref())?;
            let batch = read_batch(&file)?;
            let ingestor = build_ingestor(&config)?;
            let report = ingestor.ingest(batch).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_config(profile: Option<&str>) -> anyhow::Result<AppConfig> {
    match profile {
        Some(profile) => ConfigLoader::load_with_profile(profile),
        None => ConfigLoader::load(),
    }
}

fn build_ingestor(config: &AppConfig) -> anyhow::Result<Arc<BatchIngestor>> {
    let publisher = PubSubPublisher::new(PubSubClientConfig::from(config.pubsub.clone()))
        .context("failed to build pub/sub publisher")?;
    Ok(Arc::new(BatchIngestor::new(Arc::new(publisher))))
}

fn read_batch(path: &str) -> anyhow::Result<Vec<Value>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let parsed: Value =
        serde_json::from_str(&contents).with_context(|| format!("{path} is not valid JSON"))?;
    match parsed {
        Value::Array(batch) => Ok(batch),
        _ => anyhow::bail!("{path} must contain a JSON array of price records"),
    }
}
