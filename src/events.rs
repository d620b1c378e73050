//! Bridge event decoding
//!
//! A swap leaves two logs in the same transaction: an ERC20 `Transfer` sent
//! by the wallet and a `ComplexOpProcessed` emitted by the bridge. Each log of
//! a receipt is classified by its signature hash (`topics[0]`) and decoded on
//! its own; logs that match neither shape, or fail to decode, are skipped.

use alloy::primitives::{Address, LogData, B256, U256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hash::{address_to_topic, bytes32_to_hex};
use crate::types::{RawLog, TransactionReceipt};

sol! {
    /// Bridge events used to validate a swap
    #[derive(Debug, PartialEq)]
    interface IBridge {
        /// Emitted once per processed bridge operation
        event ComplexOpProcessed(
            uint64 indexed currentChainId,
            bytes32 indexed currentRequestId,
            uint64 nextChainId,
            bytes32 nextRequestId,
            uint8 result,
            uint8 lastOp
        );
    }

    #[derive(Debug, PartialEq)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 amount);
    }
}

/// Token movement out of the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedTransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// Bridge hop emitted by `ComplexOpProcessed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRequestEvent {
    pub current_chain_id: u64,
    pub current_request_id: B256,
    pub next_chain_id: u64,
    pub next_request_id: B256,
    pub result: u8,
    pub last_op: u8,
}

impl From<IBridge::ComplexOpProcessed> for DecodedRequestEvent {
    fn from(event: IBridge::ComplexOpProcessed) -> Self {
        Self {
            current_chain_id: event.currentChainId,
            current_request_id: event.currentRequestId,
            next_chain_id: event.nextChainId,
            next_request_id: event.nextRequestId,
            result: event.result,
            last_op: event.lastOp,
        }
    }
}

impl From<IERC20::Transfer> for DecodedTransferEvent {
    fn from(event: IERC20::Transfer) -> Self {
        Self {
            from: event.from,
            to: event.to,
            amount: event.amount,
        }
    }
}

/// Event shape selected by a log's signature hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ComplexOpProcessed,
    Transfer,
    /// Any other signature, or a log without topics
    Unknown,
}

impl EventKind {
    pub fn classify(log: &RawLog) -> Self {
        match log.topic0() {
            Some(topic) if *topic == IBridge::ComplexOpProcessed::SIGNATURE_HASH => {
                EventKind::ComplexOpProcessed
            }
            Some(topic) if *topic == IERC20::Transfer::SIGNATURE_HASH => EventKind::Transfer,
            _ => EventKind::Unknown,
        }
    }
}

/// A log that decoded into one of the known event shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedEvent {
    Transfer(DecodedTransferEvent),
    Request(DecodedRequestEvent),
}

/// Decodes logs on behalf of one wallet.
///
/// Transfers only count when the wallet is the indexed sender (`topics[1]`).
/// Transfers *to* the wallet are ignored.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    wallet: Address,
    wallet_topic: B256,
}

impl EventDecoder {
    pub fn new(wallet: Address) -> Self {
        Self {
            wallet,
            wallet_topic: address_to_topic(wallet),
        }
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    /// Decode a single log. Unknown signatures and ABI errors yield `None`.
    pub fn decode(&self, log: &RawLog) -> Option<DecodedEvent> {
        match EventKind::classify(log) {
            EventKind::ComplexOpProcessed => {
                decode_as::<IBridge::ComplexOpProcessed>(log)
                    .map(|event| DecodedEvent::Request(event.into()))
            }
            EventKind::Transfer => {
                if log.topics.get(1) != Some(&self.wallet_topic) {
                    return None;
                }
                decode_as::<IERC20::Transfer>(log)
                    .map(|event| DecodedEvent::Transfer(event.into()))
            }
            EventKind::Unknown => None,
        }
    }

    /// Decode every log of a receipt into a per-kind record
    pub fn decode_receipt(&self, receipt: &TransactionReceipt) -> TransactionEvents {
        let mut events = TransactionEvents::default();
        for log in &receipt.logs {
            if let Some(event) = self.decode(log) {
                if !events.insert(event) {
                    debug!(
                        tx_hash = %bytes32_to_hex(&receipt.transaction_hash),
                        "Ignoring repeated event of the same kind in transaction"
                    );
                }
            }
        }
        events
    }
}

fn decode_as<E: SolEvent>(log: &RawLog) -> Option<E> {
    let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
    match E::decode_log_data(&data, true) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(
                event = E::SIGNATURE,
                error = %e,
                topics = log.topics.len(),
                data_len = log.data.len(),
                "Failed to decode log, treating as absent"
            );
            None
        }
    }
}

/// Decoded events of one transaction, looked up by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEvents {
    pub transfer: Option<DecodedTransferEvent>,
    pub request: Option<DecodedRequestEvent>,
}

impl TransactionEvents {
    /// Store an event unless one of its kind is already present.
    /// Returns whether the event was stored.
    pub fn insert(&mut self, event: DecodedEvent) -> bool {
        match event {
            DecodedEvent::Transfer(transfer) if self.transfer.is_none() => {
                self.transfer = Some(transfer);
                true
            }
            DecodedEvent::Request(request) if self.request.is_none() => {
                self.request = Some(request);
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transfer.is_none() && self.request.is_none()
    }
}
