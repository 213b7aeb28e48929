//! koru publishes the TimeRestrictionForPosting contract of the Koru DAO.

mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;

use cli::Cli;
use koru_deploy::{
    AbortSignal, DeployConfig, DeployEnv, DeployStep, DeploymentRecord, FsRegistry,
    ProxyDeployer, RpcClient, TimeRestrictionForPosting,
};

fn print_summary(record: &DeploymentRecord) {
    let mut table = Table::new();
    table.set_header(vec!["Contract", "Address", "Implementation", "Transaction"]);
    table.add_row(vec![
        TimeRestrictionForPosting::NAME.to_string(),
        record.address.to_string(),
        record
            .implementation
            .map(|address| address.to_string())
            .unwrap_or_else(|| "-".to_string()),
        record
            .transaction_hash
            .clone()
            .unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{table}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let mut config = DeployConfig::load(&cli.config)?;
    cli.apply_overrides(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if !TimeRestrictionForPosting::selected_by(&cli.tags) {
        tracing::info!(
            tags = ?cli.tags,
            step = TimeRestrictionForPosting::NAME,
            "Step not selected by tags, skipping"
        );
        return Ok(());
    }

    let network = cli.network();
    let rpc = RpcClient::new(config.rpc_url(&network)?)?;

    let chain_id = rpc
        .chain_id()
        .await
        .with_context(|| format!("Failed to reach {} at {}", network, rpc.url()))?;
    if let Some(expected) = config.network(&network).and_then(|n| n.chain_id) {
        if expected != chain_id {
            anyhow::bail!(
                "Network '{}' expects chain id {} but the node reports {}",
                network,
                expected,
                chain_id
            );
        }
    }

    tracing::info!(
        %network,
        chain_id,
        rpc_url = %rpc.url(),
        deployments = %config.deployments.display(),
        "Starting deployment..."
    );

    let accounts = config.named_accounts.clone().bind(
        rpc.accounts()
            .await
            .context("Failed to fetch node accounts")?,
    );
    let registry = FsRegistry::new(&config.deployments, network.clone()).with_chain_id(chain_id);
    let mechanism = ProxyDeployer::new(rpc, registry.clone(), &config.artifacts)
        .proxy_contract(&config.proxy_contract)
        .receipt_timeout(Duration::from_secs(config.receipt_timeout_secs));

    // Ctrl+C trips the abort signal: the gate turns it into a clean abort, and a
    // deployment already in flight is abandoned.
    let (abort_handle, abort) = AbortSignal::channel();
    let mut interrupted = abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort_handle.abort();
        }
    });

    let run = TimeRestrictionForPosting.run(DeployEnv {
        accounts: &accounts,
        registry: &registry,
        mechanism: &mechanism,
        policy: &config.policy,
        abort,
    });

    let record = tokio::select! {
        biased;
        result = run => result?,
        _ = interrupted.aborted() => {
            anyhow::bail!(
                "Interrupted while deploying {} to {}",
                TimeRestrictionForPosting::NAME,
                network
            );
        }
    };

    tracing::info!(address = %record.address, "✓ Deployment complete!");
    print_summary(&record);

    Ok(())
}
