//! Deployment records and the registry that stores them.
//!
//! [`FsRegistry`] uses the hardhat-deploy layout: one JSON document per contract
//! under `<deployments>/<network>/<Name>.json`, plus a `.chainId` marker file.

use std::path::{Path, PathBuf};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::DeployError, network::Network};

/// Name of the file holding the chain id of a network's deployment directory.
pub const CHAIN_ID_FILENAME: &str = ".chainId";

/// What the registry knows about one deployed contract.
///
/// Fields this crate does not use are ignored on read, so records written by other
/// deployment tools resolve as dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Address users interact with (the proxy for proxied deployments).
    pub address: Address,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub abi: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Constructor arguments, rendered as JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    /// Implementation behind the proxy, for proxied deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Address>,
    /// Deployment identity used to detect unchanged redeployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Unix timestamp of the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<i64>,
}

impl DeploymentRecord {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            abi: Value::Null,
            transaction_hash: None,
            args: Vec::new(),
            implementation: None,
            fingerprint: None,
            deployed_at: None,
        }
    }
}

/// Lookup and persistence of deployment records for one network.
pub trait ContractRegistry: Send + Sync {
    /// Network whose records this registry holds.
    fn network(&self) -> &Network;

    /// Fetch the record stored under `name`, if any.
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>>;

    /// Store `record` under `name`, replacing any previous record.
    fn save(&self, name: &str, record: &DeploymentRecord) -> Result<()>;
}

/// Resolve the address of a contract that must already be deployed on the
/// registry's network.
pub fn resolve_dependency<R>(registry: &R, name: &str) -> Result<Address, DeployError>
where
    R: ContractRegistry + ?Sized,
{
    match registry.get(name) {
        Ok(Some(record)) => {
            tracing::debug!(name, address = %record.address, "Resolved dependency");
            Ok(record.address)
        }
        Ok(None) => Err(DeployError::DependencyNotFound {
            name: name.to_string(),
            network: registry.network().to_string(),
        }),
        Err(err) => Err(DeployError::Registry(err)),
    }
}

/// Filesystem registry in the hardhat-deploy directory layout.
#[derive(Debug, Clone)]
pub struct FsRegistry {
    root: PathBuf,
    network: Network,
    chain_id: Option<u64>,
}

impl FsRegistry {
    pub fn new(root: impl Into<PathBuf>, network: Network) -> Self {
        Self {
            root: root.into(),
            network,
            chain_id: None,
        }
    }

    /// Record the chain id alongside every saved deployment.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Directory holding this network's records.
    pub fn network_dir(&self) -> PathBuf {
        self.root.join(self.network.name())
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.network_dir().join(format!("{name}.json"))
    }

    /// Chain id recorded for this network, if a deployment was ever saved with one.
    pub fn recorded_chain_id(&self) -> Result<Option<u64>> {
        let path = self.network_dir().join(CHAIN_ID_FILENAME);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let chain_id = content
            .trim()
            .parse()
            .with_context(|| format!("Invalid chain id in {}", path.display()))?;
        Ok(Some(chain_id))
    }

    fn write_chain_id(&self, dir: &Path, chain_id: u64) -> Result<()> {
        let path = dir.join(CHAIN_ID_FILENAME);
        std::fs::write(&path, chain_id.to_string())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl ContractRegistry for FsRegistry {
    fn network(&self) -> &Network {
        &self.network
    }

    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read deployment record {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deployment record {}", path.display()))?;
        Ok(Some(record))
    }

    fn save(&self, name: &str, record: &DeploymentRecord) -> Result<()> {
        let dir = self.network_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        if let Some(chain_id) = self.chain_id {
            self.write_chain_id(&dir, chain_id)?;
        }

        let path = self.record_path(name);
        let json = serde_json::to_string_pretty(record)
            .context("Failed to serialize deployment record")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write deployment record {}", path.display()))?;

        tracing::debug!(name, path = %path.display(), "Deployment record saved");
        Ok(())
    }
}
