//! Layered configuration: defaults, then `Koru.toml`, then `KORU_*` environment variables.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    accounts::NamedAccounts,
    mechanism::{DEFAULT_PROXY_CONTRACT, DEFAULT_RECEIPT_TIMEOUT_SECS},
    network::{Network, NetworkPolicy},
};

/// The default name for the configuration file.
pub const CONFIG_FILENAME: &str = "Koru.toml";

/// Prefix of the environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "KORU_";

/// RPC endpoint used for the ephemeral network when none is configured.
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";

/// Connection settings of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub url: Url,
    /// Expected chain id. Checked against the node before deploying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

/// Complete configuration of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Root of the deployment registry.
    pub deployments: PathBuf,
    /// Root of the compiled contract artifacts.
    pub artifacts: PathBuf,
    /// Artifact deployed as the upgrade proxy.
    pub proxy_contract: String,
    /// Seconds to wait for each deployment transaction to be mined.
    pub receipt_timeout_secs: u64,
    pub named_accounts: NamedAccounts,
    pub policy: NetworkPolicy,
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            deployments: PathBuf::from("deployments"),
            artifacts: PathBuf::from("artifacts"),
            proxy_contract: DEFAULT_PROXY_CONTRACT.to_string(),
            receipt_timeout_secs: DEFAULT_RECEIPT_TIMEOUT_SECS,
            named_accounts: NamedAccounts::default(),
            policy: NetworkPolicy::default(),
            networks: BTreeMap::new(),
        }
    }
}

impl DeployConfig {
    /// Build the provider stack without extracting it.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the configuration. A missing file leaves the defaults in place.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    pub fn network(&self, network: &Network) -> Option<&NetworkConfig> {
        self.networks.get(network.name())
    }

    /// RPC endpoint of `network`. The ephemeral network falls back to the local node.
    pub fn rpc_url(&self, network: &Network) -> Result<Url> {
        if let Some(config) = self.network(network) {
            return Ok(config.url.clone());
        }

        if self.policy.is_ephemeral(network) {
            return Url::parse(DEFAULT_LOCAL_RPC_URL).context("Invalid default RPC URL");
        }

        anyhow::bail!(
            "No RPC URL configured for network '{}' (set networks.{}.url in {})",
            network,
            network,
            CONFIG_FILENAME
        )
    }
}
