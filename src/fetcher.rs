//! Historical log retrieval
//!
//! Finds every transaction in which the bridge contract emitted a log with
//! the wallet at topic position 1, then pulls the full receipt of each one.
//! The validating events usually sit in *other* logs of the same
//! transaction, which is why the filtered log alone is not enough.
//!
//! # Concurrency
//!
//! Receipt lookups are spawned on a [`JoinSet`] and joined before anything is
//! decoded. The first failed lookup fails the whole fetch; the remaining
//! tasks are aborted when the set is dropped. There is no timeout beyond the
//! HTTP client's and no retry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::Filter;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::hash::{address_to_topic, bytes32_to_hex};
use crate::redact::rpc_origin;
use crate::types::TransactionReceipt;

/// Parameters of the historical log query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    /// Contract whose logs are searched
    pub address: Address,
    /// Required value of `topics[1]`
    pub topic1: B256,
    /// First block searched; the query always runs to `latest`
    pub from_block: u64,
}

/// Read access to a chain's logs and receipts
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// Transaction hashes of all logs matching the query, in the order the
    /// provider returned them. Hashes may repeat.
    async fn transaction_hashes(&self, query: &LogQuery) -> Result<Vec<B256>>;

    /// Full receipt of a mined transaction
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt>;
}

/// JSON-RPC backed [`LogSource`]
pub struct RpcLogSource {
    provider: RootProvider<Http<Client>>,
}

impl RpcLogSource {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL {}: {}", rpc_origin(rpc_url), e))?,
        );

        debug!(rpc = %rpc_origin(rpc_url), "Created read-only RPC log source");

        Ok(Self { provider })
    }
}

#[async_trait]
impl LogSource for RpcLogSource {
    async fn transaction_hashes(&self, query: &LogQuery) -> Result<Vec<B256>> {
        let filter = Filter::new()
            .address(query.address)
            .topic1(query.topic1)
            .from_block(query.from_block)
            .to_block(BlockNumberOrTag::Latest);

        let logs = self.provider.get_logs(&filter).await.wrap_err_with(|| {
            format!(
                "Failed to get logs for {} from block {}",
                query.address, query.from_block
            )
        })?;

        Ok(logs.iter().filter_map(|log| log.transaction_hash).collect())
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .wrap_err_with(|| format!("Failed to get receipt {}", bytes32_to_hex(&tx_hash)))?
            .ok_or_else(|| eyre!("Receipt not found for {}", bytes32_to_hex(&tx_hash)))?;

        Ok(TransactionReceipt::from(&receipt))
    }
}

/// Fetches the receipts relevant to one wallet on one chain
#[derive(Clone)]
pub struct LogFetcher {
    source: Arc<dyn LogSource>,
    bridge_address: Address,
    from_block: u64,
}

impl LogFetcher {
    pub fn new(source: Arc<dyn LogSource>, bridge_address: Address) -> Self {
        Self {
            source,
            bridge_address,
            from_block: 0,
        }
    }

    /// Start the log query at `from_block` instead of genesis
    pub fn with_from_block(mut self, from_block: u64) -> Self {
        self.from_block = from_block;
        self
    }

    pub fn bridge_address(&self) -> Address {
        self.bridge_address
    }

    /// Receipts of every transaction where the bridge logged the wallet,
    /// ordered by first appearance in the log query.
    pub async fn fetch(&self, wallet: Address) -> Result<Vec<TransactionReceipt>> {
        let query = LogQuery {
            address: self.bridge_address,
            topic1: address_to_topic(wallet),
            from_block: self.from_block,
        };

        let hashes = dedup_hashes(self.source.transaction_hashes(&query).await?);

        debug!(
            wallet = %wallet,
            bridge = %self.bridge_address,
            transactions = hashes.len(),
            "Matched bridge transactions"
        );

        if hashes.is_empty() {
            return Ok(Vec::new());
        }

        let mut join_set = JoinSet::new();
        for tx_hash in hashes.iter().copied() {
            let source = Arc::clone(&self.source);
            join_set.spawn(async move {
                let receipt = source.transaction_receipt(tx_hash).await;
                (tx_hash, receipt)
            });
        }

        let mut receipts: HashMap<B256, TransactionReceipt> =
            HashMap::with_capacity(hashes.len());
        while let Some(joined) = join_set.join_next().await {
            let (tx_hash, receipt) =
                joined.map_err(|e| eyre!("Receipt fetch task failed: {}", e))?;
            receipts.insert(tx_hash, receipt?);
        }

        info!(
            wallet = %wallet,
            receipts = receipts.len(),
            "Fetched transaction receipts"
        );

        Ok(hashes
            .iter()
            .filter_map(|hash| receipts.remove(hash))
            .collect())
    }
}

/// Drop repeated hashes, keeping the first occurrence of each
fn dedup_hashes(hashes: Vec<B256>) -> Vec<B256> {
    let mut seen = HashSet::with_capacity(hashes.len());
    hashes.into_iter().filter(|hash| seen.insert(*hash)).collect()
}
