//! JSON-RPC client for the target network.

use std::time::Duration;

use alloy_core::primitives::Address;
use anyhow::Context;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

/// Default timeout for a single RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default interval between two receipt polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Transaction submitted through `eth_sendTransaction`. The node signs for `from`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Calldata or creation payload, `0x`-prefixed hex.
    pub data: String,
}

/// The subset of `eth_getTransactionReceipt` this crate reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub block_number: Option<String>,
}

impl TransactionReceipt {
    /// Pre-byzantium receipts carry no status and count as successful.
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .map(|status| parse_quantity(status).map(|s| s == 1).unwrap_or(false))
            .unwrap_or(true)
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(value: &str) -> anyhow::Result<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid hex quantity: {value}"))
}

/// HTTP JSON-RPC client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: Url,
    poll_interval: Duration,
}

impl RpcClient {
    pub fn new(url: Url) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Make a JSON-RPC call and deserialize the result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, anyhow::Error> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", method))?;

        let result: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = result.get("error") {
            anyhow::bail!(
                "RPC error: {}",
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
            );
        }

        let result_value = result
            .get("result")
            .context("No result in response")?
            .clone();

        serde_json::from_value(result_value)
            .with_context(|| format!("Failed to deserialize {} result", method))
    }

    pub async fn chain_id(&self) -> Result<u64, anyhow::Error> {
        let chain_id: String = self.call("eth_chainId", vec![]).await?;
        parse_quantity(&chain_id)
    }

    /// Accounts the node can sign for.
    pub async fn accounts(&self) -> Result<Vec<Address>, anyhow::Error> {
        self.call("eth_accounts", vec![]).await
    }

    /// Submit a transaction, returning its hash.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, anyhow::Error> {
        let params = serde_json::to_value(tx).context("Failed to serialize transaction")?;
        self.call("eth_sendTransaction", vec![params]).await
    }

    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, anyhow::Error> {
        self.call("eth_getTransactionReceipt", vec![serde_json::json!(tx_hash)])
            .await
    }

    /// Poll until `tx_hash` is mined. RPC failures are not retried.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: &str,
        timeout: Duration,
    ) -> Result<TransactionReceipt, anyhow::Error> {
        let start = tokio::time::Instant::now();

        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }

            if start.elapsed() > timeout {
                anyhow::bail!(
                    "Timeout waiting for transaction {} to be mined after {}s",
                    tx_hash,
                    timeout.as_secs()
                );
            }

            tracing::trace!(tx_hash, "Transaction pending, polling again...");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;

    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x7a69").unwrap(), 31337);
        assert_eq!(parse_quantity("0x89").unwrap(), 137);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_receipt_status() {
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0xabc",
            "status": "0x1",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "blockNumber": "0x1"
        }))
        .unwrap();
        assert!(receipt.succeeded());
        assert_eq!(
            receipt.contract_address,
            Some(address!("5FbDB2315678afecb367f032d93F642f64180aa3"))
        );

        let reverted: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": "0xabc",
            "status": "0x0",
            "contractAddress": null
        }))
        .unwrap();
        assert!(!reverted.succeeded());
        assert!(reverted.contract_address.is_none());
    }

    #[test]
    fn test_transaction_request_omits_missing_to() {
        let tx = TransactionRequest {
            from: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            to: None,
            data: "0x6080".to_string(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("to").is_none());
        assert_eq!(json["data"], "0x6080");
    }

    #[tokio::test]
    async fn test_wait_for_receipt_times_out_while_pending() {
        let mut server = mockito::Server::new_async().await;
        let pending = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::Regex(
                r#""method":"eth_getTransactionReceipt""#.to_string(),
            ))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let client = RpcClient::new(server.url().parse().unwrap())
            .unwrap()
            .with_poll_interval(Duration::from_millis(10));
        let err = client
            .wait_for_receipt("0xaa", Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(
            err.to_string()
                .contains("Timeout waiting for transaction 0xaa to be mined"),
            "unexpected error: {err}"
        );
        pending.assert_async().await;
    }

    #[tokio::test]
    async fn test_rpc_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32000, "message": "nonce too low" },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = RpcClient::new(server.url().parse().unwrap()).unwrap();
        let err = client.chain_id().await.unwrap_err();
        assert_eq!(err.to_string(), "RPC error: nonce too low");
    }
}
