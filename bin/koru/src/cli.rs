use std::path::PathBuf;

use clap::Parser;
use koru_deploy::{
    CONFIG_FILENAME, DeployConfig, Network, NetworkConfig, network::EPHEMERAL_NETWORK,
};
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "koru")]
#[command(
    author,
    version,
    about = "Deploy TimeRestrictionForPosting behind an upgrade proxy"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "KORU_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The network to deploy to.
    ///
    /// Every network other than the ephemeral one (hardhat) gets a 10 second grace
    /// period before anything is sent.
    #[arg(short, long, env = "KORU_NETWORK", default_value = EPHEMERAL_NETWORK)]
    pub network: String,

    /// Path to the Koru.toml configuration file.
    ///
    /// A missing file is not an error: defaults and KORU_* variables still apply.
    #[arg(long, alias = "conf", env = "KORU_CONFIG", default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Only run the steps carrying one of these tags (comma separated).
    /// If not provided, every step runs.
    #[arg(long, env = "KORU_TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// The deployment registry directory.
    #[arg(long, env = "KORU_DEPLOYMENTS")]
    pub deployments: Option<PathBuf>,

    /// The compiled artifacts directory.
    #[arg(long, env = "KORU_ARTIFACTS")]
    pub artifacts: Option<PathBuf>,

    /// The RPC endpoint of the target network. Overrides the configured URL.
    #[arg(long, alias = "rpc", env = "KORU_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Print the merged configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    pub fn network(&self) -> Network {
        Network::new(&self.network)
    }

    /// Apply command line overrides on top of the file and environment configuration.
    pub fn apply_overrides(&self, config: &mut DeployConfig) {
        if let Some(deployments) = &self.deployments {
            config.deployments = deployments.clone();
        }

        if let Some(artifacts) = &self.artifacts {
            config.artifacts = artifacts.clone();
        }

        if let Some(url) = &self.rpc_url {
            config
                .networks
                .entry(self.network.clone())
                .and_modify(|network| network.url = url.clone())
                .or_insert_with(|| NetworkConfig {
                    url: url.clone(),
                    chain_id: None,
                });
        }
    }
}
