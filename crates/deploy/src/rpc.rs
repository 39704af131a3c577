//! JSON-RPC plumbing for the chain boundary.
//!
//! The node is an opaque capability: submit a transaction, poll for its receipt,
//! count confirmations, read contract state, fetch emitted logs. Keys are held by
//! the node (anvil's unlocked accounts locally, a configured signer elsewhere),
//! so submission goes through `eth_sendTransaction`.

use std::time::Duration;

use alloy_core::primitives::{Address, B256, Bytes, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::HarnessError;

/// Per-request timeout for RPC round-trips.
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between polling attempts (receipts, confirmations, logs).
pub(crate) const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long to wait for a submitted transaction's receipt to appear.
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// A transaction request submitted via `eth_sendTransaction`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRequest {
    pub from: Address,
    /// `None` deploys a contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

/// A log emitted by a mined transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default, deserialize_with = "deserialize_opt_u64_from_hex")]
    pub block_number: Option<u64>,
}

impl LogEntry {
    /// Whether this log is the given event emitted by the given contract.
    pub fn matches(&self, emitter: Address, topic0: B256) -> bool {
        self.address == emitter && self.topics.first() == Some(&topic0)
    }
}

/// Receipt for a mined transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    pub block_number: u64,
    pub contract_address: Option<Address>,
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    pub status: u64,
    pub logs: Vec<LogEntry>,
}

/// HTTP JSON-RPC client for a single chain endpoint.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    url: Url,
}

impl ChainClient {
    pub fn new(url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Make a JSON-RPC call and deserialize the result.
    pub async fn call_rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T> {
        let response = self
            .http
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
                "RPC error from {}: {}",
                method,
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

    pub async fn chain_id(&self) -> Result<u64> {
        let result: String = self.call_rpc("eth_chainId", vec![]).await?;
        parse_hex_u64(&result)
    }

    pub async fn block_number(&self) -> Result<u64> {
        let result: String = self.call_rpc("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Accounts managed by the node. On a local development chain these are the
    /// pre-funded unlocked accounts.
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.call_rpc("eth_accounts", vec![]).await
    }

    pub async fn send_transaction(&self, tx: &TxRequest) -> Result<B256> {
        self.call_rpc(
            "eth_sendTransaction",
            vec![serde_json::to_value(tx).context("Failed to serialize transaction")?],
        )
        .await
        .context("Failed to submit transaction")
    }

    /// Poll until the receipt for a submitted transaction appears.
    ///
    /// Fails with [`HarnessError::Timeout`] if the node never mines it, or with
    /// a plain error if the transaction reverted.
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        let receipt = tokio::time::timeout(RECEIPT_TIMEOUT, async {
            loop {
                let receipt: Option<TxReceipt> = self
                    .call_rpc(
                        "eth_getTransactionReceipt",
                        vec![serde_json::json!(tx_hash)],
                    )
                    .await?;
                if let Some(receipt) = receipt {
                    return anyhow::Ok(receipt);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| HarnessError::Timeout("transaction receipt"))??;

        if receipt.status != 1 {
            anyhow::bail!(
                "Transaction {} reverted in block {}",
                receipt.transaction_hash,
                receipt.block_number
            );
        }
        Ok(receipt)
    }

    /// Block until the head is at least `confirmations` blocks past the
    /// receipt's inclusion block (a confirmation count of 1 means "mined").
    pub async fn wait_for_confirmations(
        &self,
        receipt: &TxReceipt,
        confirmations: u64,
    ) -> Result<()> {
        loop {
            let head = self.block_number().await?;
            if head + 1 >= receipt.block_number + confirmations {
                return Ok(());
            }
            tracing::debug!(
                head,
                included = receipt.block_number,
                confirmations,
                "Waiting for confirmations..."
            );
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Submit a transaction, wait for its receipt, then for the required
    /// confirmation count.
    pub async fn send_and_confirm(&self, tx: &TxRequest, confirmations: u64) -> Result<TxReceipt> {
        let tx_hash = self.send_transaction(tx).await?;
        let receipt = self.wait_for_receipt(tx_hash).await?;
        self.wait_for_confirmations(&receipt, confirmations).await?;
        Ok(receipt)
    }

    /// Read contract state via `eth_call` against the latest block.
    pub async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Bytes> {
        self.call_rpc(
            "eth_call",
            vec![
                serde_json::json!({ "to": to, "data": Bytes::from(data) }),
                serde_json::json!("latest"),
            ],
        )
        .await
    }

    /// Fetch logs emitted by a contract for a single event type, from the given
    /// block to the latest.
    pub async fn get_logs(
        &self,
        address: Address,
        topic0: B256,
        from_block: u64,
    ) -> Result<Vec<LogEntry>> {
        self.call_rpc(
            "eth_getLogs",
            vec![serde_json::json!({
                "address": address,
                "fromBlock": hex_quantity(from_block),
                "toBlock": "latest",
                "topics": [topic0],
            })],
        )
        .await
    }
}

/// Format a u64 as a 0x-prefixed hex quantity.
pub fn hex_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

fn parse_hex_u64(value: &str) -> Result<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .with_context(|| format!("Failed to parse hex quantity '{value}'"))
}

/// Deserialize a u64 from a 0x-prefixed hex string.
fn deserialize_u64_from_hex<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}

fn deserialize_opt_u64_from_hex<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;
    s.map(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_quantity() {
        assert_eq!(hex_quantity(0), "0x0");
        assert_eq!(hex_quantity(255), "0xff");
        assert_eq!(hex_quantity(31337), "0x7a69");
    }

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x0").unwrap(), 0);
        assert_eq!(parse_hex_u64("0x7a69").unwrap(), 31337);
        assert!(parse_hex_u64("not-hex").is_err());
    }

    #[test]
    fn test_tx_request_serializes_as_rpc_object() {
        let tx = TxRequest {
            from: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap(),
            to: None,
            value: Some(U256::from(5u64)),
            data: Some(Bytes::from(vec![0xde, 0xad])),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            value["from"],
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
        assert!(value.get("to").is_none());
        assert_eq!(value["value"], "0x5");
        assert_eq!(value["data"], "0xdead");
    }

    #[test]
    fn test_receipt_deserializes_hex_quantities() {
        let raw = serde_json::json!({
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber": "0xa",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "status": "0x1",
            "logs": [{
                "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "topics": ["0x2222222222222222222222222222222222222222222222222222222222222222"],
                "data": "0x",
                "blockNumber": "0xa"
            }]
        });
        let receipt: TxReceipt = serde_json::from_value(raw).unwrap();
        assert_eq!(receipt.block_number, 10);
        assert_eq!(receipt.status, 1);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].block_number, Some(10));
    }

    #[test]
    fn test_log_matches_by_emitter_and_topic() {
        let emitter: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
        let topic = B256::repeat_byte(0x22);
        let log = LogEntry {
            address: emitter,
            topics: vec![topic],
            data: Bytes::new(),
            block_number: None,
        };
        assert!(log.matches(emitter, topic));
        assert!(!log.matches(emitter, B256::repeat_byte(0x33)));
        assert!(!log.matches(Address::ZERO, topic));
    }
}
