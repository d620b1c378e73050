//! Chain data as handed over by the provider
//!
//! Only the parts of a log and receipt the swap check reads are kept.
//! Both types are plain values that live for one check and are dropped after.

use alloy::primitives::{Bytes, LogData, B256};
use serde::{Deserialize, Serialize};

/// One emitted event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    /// Indexed topics, `topics[0]` being the event signature hash
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed arguments
    pub data: Bytes,
}

impl RawLog {
    pub fn new(topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            topics,
            data: data.into(),
        }
    }

    /// Event signature hash, if the log has any topic at all
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }
}

impl From<LogData> for RawLog {
    fn from(log: LogData) -> Self {
        let (topics, data) = log.split();
        Self { topics, data }
    }
}

impl From<&alloy::rpc::types::Log> for RawLog {
    fn from(log: &alloy::rpc::types::Log) -> Self {
        Self {
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
        }
    }
}

/// All logs emitted by one transaction, in emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub logs: Vec<RawLog>,
}

impl From<&alloy::rpc::types::TransactionReceipt> for TransactionReceipt {
    fn from(receipt: &alloy::rpc::types::TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            logs: receipt.inner.logs().iter().map(RawLog::from).collect(),
        }
    }
}
