//! Lending Pool Liquidation Sweep
//!
//! Runs one complete liquidation cycle and exits:
//! - Fetches borrower addresses from the indexer
//! - Batch-evaluates health factors across every configured pool
//! - Inspects, sizes and submits liquidations for unhealthy positions

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lendsweep_api::SubgraphClient;
use lendsweep_chain::{MulticallAggregator, ProviderManager, TransactionSender};
use lendsweep_core::{load_deployment_from_env, CycleReport, LiquidationCycle};

#[tokio::main]
async fn main() {
    // Print startup banner
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lendsweep_core=debug,lendsweep_chain=debug")),
        )
        .init();

    let code = match run().await {
        Ok(report) => {
            info!(
                liquidations = report.liquidations.len(),
                submitted = report.submitted(),
                "Run succeeded"
            );
            0
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Run failed");
            1
        }
    };

    info!("Run finished");
    std::process::exit(code);
}

async fn run() -> Result<CycleReport> {
    // Load deployment (LENDSWEEP_CONFIG or ./config/deployment.toml)
    let deployment = Arc::new(load_deployment_from_env()?);
    deployment.log_config();

    info!("Initializing components...");

    // Provider (also serves the un-batched liquidity reads)
    let provider = Arc::new(ProviderManager::connect(&deployment.rpc_url).await?);
    let chain_id = provider.chain_id().await?;
    info!(chain_id, rpc = %provider.rpc_url(), "Provider initialized");

    // Batched reads
    let executor = Arc::new(MulticallAggregator::new(
        deployment.rpc_url.clone(),
        deployment.contracts.multicall,
    ));

    // Indexer
    let users = Arc::new(
        SubgraphClient::new(deployment.subgraph_url.clone())
            .with_page_size(deployment.subgraph.page_size)
            .with_max_users(deployment.subgraph.max_users),
    );

    // Transaction sender (for signing and sending liquidation transactions)
    let tx_sender = Arc::new(TransactionSender::new(
        deployment.signer_key.expose(),
        &deployment.rpc_url,
    )?);

    let cycle = LiquidationCycle::new(deployment, users, executor, provider, tx_sender);

    info!("All components initialized");

    Ok(cycle.run().await?)
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    ┬  ┌─┐┌┐┌┌┬┐┌─┐┬ ┬┌─┐┌─┐┌─┐
    │  ├┤ │││ ││└─┐│││├┤ ├┤ ├─┘
    ┴─┘└─┘┘└┘─┴┘└─┘└┴┘└─┘└─┘┴
    Liquidation Sweep v0.1.0
    "#
    );
}
