//! reputation-node: run one contract operation against a local world state.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use reputation_contract::cli::{self, Args};
use reputation_contract::ContractConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Logs go to stderr so stdout carries only the JSON result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("reputation_contract={},info", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => ContractConfig::load(path)?,
        None => ContractConfig::default(),
    };
    args.apply(&mut config);

    let runner = cli::build_runner(&config)?;
    let tx_id = args
        .tx_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(tx_id = %tx_id, state = %config.state.path.display(), "Running operation");

    match cli::execute(&runner, &config, tx_id, args.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("Operation failed: {}", e);
            Err(e)
        }
    }
}
