//! Deployment mechanism: submits contract creations, wires proxies and records
//! the outcome in the registry.

use std::{future::Future, path::PathBuf, time::Duration};

use alloy_core::primitives::{Address, Bytes};
use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{
    abi::{self, AbiValue, UPGRADE_TO_SELECTOR},
    artifact::ContractArtifact,
    registry::{ContractRegistry, DeploymentRecord},
    rpc::{RpcClient, TransactionRequest},
};

/// Proxy contract deployed in front of upgradeable contracts.
pub const DEFAULT_PROXY_CONTRACT: &str = "EIP173Proxy";

/// How long to wait for a deployment transaction to be mined.
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 300;

/// A request to publish one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    /// Artifact / registry name of the contract.
    pub contract: String,
    /// Account sending the deployment transactions.
    pub from: Address,
    /// Owner of the upgrade proxy. `None` deploys the contract without a proxy.
    pub proxy_owner: Option<Address>,
    /// Constructor arguments, in declaration order.
    pub args: Vec<AbiValue>,
}

/// Something that can publish a [`DeploymentRequest`].
///
/// Implementations own idempotence: re-submitting an unchanged request must not
/// publish a duplicate contract.
pub trait DeploymentMechanism: Send + Sync {
    fn deploy(
        &self,
        request: DeploymentRequest,
    ) -> impl Future<Output = Result<DeploymentRecord>> + Send;
}

/// Identity of a deployment: creation bytecode, encoded arguments and proxy owner.
///
/// The same inputs always produce the same hex-encoded SHA-256 digest.
pub fn deployment_fingerprint(
    bytecode: &[u8],
    args: &[AbiValue],
    proxy_owner: Option<Address>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytecode);
    hasher.update(abi::encode_params(args));
    match proxy_owner {
        Some(owner) => {
            hasher.update([1u8]);
            hasher.update(owner.as_slice());
        }
        None => hasher.update([0u8]),
    }
    hex::encode(hasher.finalize())
}

fn implementation_name(contract: &str) -> String {
    format!("{contract}_Implementation")
}

fn proxy_name(contract: &str) -> String {
    format!("{contract}_Proxy")
}

/// Deploys through a node that signs for the sender (`eth_sendTransaction`) and
/// places upgradeable contracts behind an EIP-173 proxy.
#[derive(Debug, Clone)]
pub struct ProxyDeployer<R> {
    rpc: RpcClient,
    registry: R,
    artifacts: PathBuf,
    proxy_contract: String,
    receipt_timeout: Duration,
}

impl<R: ContractRegistry> ProxyDeployer<R> {
    pub fn new(rpc: RpcClient, registry: R, artifacts: impl Into<PathBuf>) -> Self {
        Self {
            rpc,
            registry,
            artifacts: artifacts.into(),
            proxy_contract: DEFAULT_PROXY_CONTRACT.to_string(),
            receipt_timeout: Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS),
        }
    }

    pub fn proxy_contract(mut self, name: impl Into<String>) -> Self {
        self.proxy_contract = name.into();
        self
    }

    pub fn receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Send a contract creation and wait for the resulting address.
    async fn create(&self, label: &str, from: Address, data: Vec<u8>) -> Result<(Address, String)> {
        let tx = TransactionRequest {
            from,
            to: None,
            data: abi::to_hex_data(&data),
        };

        let tx_hash = self
            .rpc
            .send_transaction(&tx)
            .await
            .with_context(|| format!("Failed to submit {label} deployment"))?;
        tracing::info!(contract = label, %tx_hash, "Deployment transaction sent");

        let receipt = self.rpc.wait_for_receipt(&tx_hash, self.receipt_timeout).await?;
        if !receipt.succeeded() {
            anyhow::bail!("{label} deployment reverted (tx {tx_hash})");
        }

        let address = receipt
            .contract_address
            .with_context(|| format!("Receipt of {tx_hash} carries no contract address"))?;
        tracing::info!(contract = label, %address, "Contract deployed");

        Ok((address, tx_hash))
    }

    /// Point an existing proxy at a new implementation.
    async fn upgrade(
        &self,
        proxy: Address,
        owner: Address,
        implementation: Address,
    ) -> Result<String> {
        let tx = TransactionRequest {
            from: owner,
            to: Some(proxy),
            data: abi::to_hex_data(&abi::encode_call(
                UPGRADE_TO_SELECTOR,
                &[implementation.into()],
            )),
        };

        let tx_hash = self
            .rpc
            .send_transaction(&tx)
            .await
            .with_context(|| format!("Failed to submit upgrade of proxy {proxy}"))?;

        let receipt = self.rpc.wait_for_receipt(&tx_hash, self.receipt_timeout).await?;
        if !receipt.succeeded() {
            anyhow::bail!("Upgrade of proxy {proxy} reverted (tx {tx_hash})");
        }

        tracing::info!(%proxy, %implementation, %tx_hash, "Proxy upgraded");
        Ok(tx_hash)
    }

    /// Deploy a fresh proxy in front of `implementation`, or upgrade the recorded one.
    async fn wire_proxy(
        &self,
        contract: &str,
        from: Address,
        owner: Address,
        implementation: Address,
    ) -> Result<(Address, String)> {
        let proxy_name = proxy_name(contract);

        if let Some(proxy) = self.registry.get(&proxy_name)? {
            let tx_hash = self.upgrade(proxy.address, owner, implementation).await?;
            return Ok((proxy.address, tx_hash));
        }

        let proxy_artifact = ContractArtifact::load(&self.artifacts, &self.proxy_contract)?;
        let proxy_args: Vec<AbiValue> =
            vec![implementation.into(), owner.into(), Bytes::new().into()];
        let data = abi::encode_deploy_data(&proxy_artifact.bytecode()?, &proxy_args);

        let (address, tx_hash) = self.create(&proxy_name, from, data).await?;

        let record = DeploymentRecord {
            transaction_hash: Some(tx_hash.clone()),
            abi: proxy_artifact.abi,
            args: proxy_args.iter().map(AbiValue::to_json).collect(),
            deployed_at: Some(chrono::Utc::now().timestamp()),
            ..DeploymentRecord::new(address)
        };
        self.registry.save(&proxy_name, &record)?;

        Ok((address, tx_hash))
    }
}

impl<R: ContractRegistry> DeploymentMechanism for ProxyDeployer<R> {
    async fn deploy(&self, request: DeploymentRequest) -> Result<DeploymentRecord> {
        let artifact = ContractArtifact::load(&self.artifacts, &request.contract)?;
        let bytecode = artifact.bytecode()?;
        let fingerprint = deployment_fingerprint(&bytecode, &request.args, request.proxy_owner);

        if let Some(existing) = self.registry.get(&request.contract)? {
            if existing.fingerprint.as_deref() == Some(fingerprint.as_str()) {
                tracing::info!(
                    contract = %request.contract,
                    address = %existing.address,
                    "Reusing unchanged deployment"
                );
                return Ok(existing);
            }
        }

        let args: Vec<Value> = request.args.iter().map(AbiValue::to_json).collect();
        let data = abi::encode_deploy_data(&bytecode, &request.args);

        let Some(owner) = request.proxy_owner else {
            let (address, tx_hash) = self.create(&request.contract, request.from, data).await?;
            let record = DeploymentRecord {
                abi: artifact.abi,
                transaction_hash: Some(tx_hash),
                args,
                fingerprint: Some(fingerprint),
                deployed_at: Some(chrono::Utc::now().timestamp()),
                ..DeploymentRecord::new(address)
            };
            self.registry.save(&request.contract, &record)?;
            return Ok(record);
        };

        // An implementation left behind by a run that failed while wiring the proxy
        // is picked up instead of being published twice.
        let implementation_name = implementation_name(&request.contract);
        let implementation = match self
            .registry
            .get(&implementation_name)?
            .filter(|record| record.fingerprint.as_deref() == Some(fingerprint.as_str()))
        {
            Some(record) => {
                tracing::info!(
                    contract = %request.contract,
                    address = %record.address,
                    "Reusing implementation of an unfinished deployment"
                );
                record.address
            }
            None => {
                let (address, tx_hash) =
                    self.create(&request.contract, request.from, data).await?;
                let record = DeploymentRecord {
                    abi: artifact.abi.clone(),
                    transaction_hash: Some(tx_hash),
                    args: args.clone(),
                    fingerprint: Some(fingerprint.clone()),
                    deployed_at: Some(chrono::Utc::now().timestamp()),
                    ..DeploymentRecord::new(address)
                };
                self.registry.save(&implementation_name, &record)?;
                address
            }
        };

        let (proxy, proxy_tx_hash) = self
            .wire_proxy(&request.contract, request.from, owner, implementation)
            .await?;

        let record = DeploymentRecord {
            abi: artifact.abi,
            transaction_hash: Some(proxy_tx_hash),
            args,
            implementation: Some(implementation),
            fingerprint: Some(fingerprint),
            deployed_at: Some(chrono::Utc::now().timestamp()),
            ..DeploymentRecord::new(proxy)
        };
        self.registry.save(&request.contract, &record)?;

        Ok(record)
    }
}
