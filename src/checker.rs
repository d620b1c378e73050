//! Swap check pipeline
//!
//! Ties the pieces together for one wallet and network:
//! fetch receipts, decode each receipt's logs, validate the decoded events.
//!
//! # Scan policy
//!
//! The bridge check has historically answered from the *first* matched
//! transaction only, whatever later transactions contain.
//! [`ScanPolicy::FirstTransaction`] keeps that behaviour and is the default.
//! [`ScanPolicy::AnyTransaction`] accepts the wallet as soon as any of its
//! transactions validates.

use std::collections::HashMap;
use std::str::FromStr;

use alloy::primitives::{Address, B256};
use eyre::{eyre, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::chains::Network;
use crate::events::EventDecoder;
use crate::fetcher::LogFetcher;
use crate::hash::bytes32_to_hex;
use crate::types::TransactionReceipt;
use crate::verifier::{SwapValidator, ValidationFailure};

/// Which matched transactions are examined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Decide on the first transaction and stop
    #[default]
    FirstTransaction,
    /// Examine transactions until one validates
    AnyTransaction,
}

impl FromStr for ScanPolicy {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_transaction" => Ok(ScanPolicy::FirstTransaction),
            "any" | "any_transaction" => Ok(ScanPolicy::AnyTransaction),
            other => Err(eyre!("Unknown scan policy '{}' (expected first or any)", other)),
        }
    }
}

/// Outcome of a swap check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SwapVerdict {
    /// The transaction holds a valid swap
    Valid { tx_hash: B256 },
    /// The examined transaction failed a rule
    Invalid {
        tx_hash: B256,
        reason: ValidationFailure,
    },
    /// The bridge never logged the wallet
    NoTransactions,
    /// Logs or receipts could not be fetched
    ProviderFailure { error: String },
}

impl SwapVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, SwapVerdict::Valid { .. })
    }

    /// Collapse into the legacy tri-state answer.
    ///
    /// `Some(true)` for a valid swap, `Some(false)` for a rejected transaction
    /// or provider failure, `None` when there was nothing to examine.
    pub fn legacy(&self) -> Option<bool> {
        match self {
            SwapVerdict::Valid { .. } => Some(true),
            SwapVerdict::Invalid { .. } | SwapVerdict::ProviderFailure { .. } => Some(false),
            SwapVerdict::NoTransactions => None,
        }
    }
}

/// Checks wallets against the bridge on each configured network
pub struct SwapChecker {
    fetchers: HashMap<Network, LogFetcher>,
    validator: SwapValidator,
    policy: ScanPolicy,
}

impl SwapChecker {
    pub fn new(validator: SwapValidator) -> Self {
        Self {
            fetchers: HashMap::new(),
            validator,
            policy: ScanPolicy::default(),
        }
    }

    /// Register the fetcher used for swaps starting on `network`
    pub fn with_fetcher(mut self, network: Network, fetcher: LogFetcher) -> Self {
        self.fetchers.insert(network, fetcher);
        self
    }

    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.fetchers.keys()
    }

    /// Run the full pipeline for `wallet` on `network`
    pub async fn check(&self, wallet: Address, network: Network) -> SwapVerdict {
        let Some(fetcher) = self.fetchers.get(&network) else {
            warn!(network = %network, "No provider configured for network");
            return SwapVerdict::ProviderFailure {
                error: format!("no provider configured for {}", network),
            };
        };

        let receipts = match fetcher.fetch(wallet).await {
            Ok(receipts) => receipts,
            Err(e) => {
                error!(
                    wallet = %wallet,
                    network = %network,
                    error = ?e,
                    "Failed to fetch bridge history"
                );
                return SwapVerdict::ProviderFailure {
                    error: format!("{:#}", e),
                };
            }
        };

        let verdict = self.evaluate(wallet, network, &receipts);
        info!(
            wallet = %wallet,
            network = %network,
            transactions = receipts.len(),
            valid = verdict.is_valid(),
            "Swap check complete"
        );
        verdict
    }

    /// Legacy entry point: `Some(true)`, `Some(false)` or `None`
    pub async fn check_for_swap(&self, wallet: Address, network: Network) -> Option<bool> {
        self.check(wallet, network).await.legacy()
    }

    /// Apply decoding and validation to already fetched receipts
    pub fn evaluate(
        &self,
        wallet: Address,
        network: Network,
        receipts: &[TransactionReceipt],
    ) -> SwapVerdict {
        let decoder = EventDecoder::new(wallet);
        let mut first_rejection = None;

        for receipt in receipts {
            let tx_hash = receipt.transaction_hash;
            let events = decoder.decode_receipt(receipt);

            match self.validator.validate(&events, network) {
                Ok(()) => {
                    debug!(tx_hash = %bytes32_to_hex(&tx_hash), "Transaction holds a valid swap");
                    return SwapVerdict::Valid { tx_hash };
                }
                Err(reason) => {
                    debug!(
                        tx_hash = %bytes32_to_hex(&tx_hash),
                        reason = %reason,
                        "Transaction rejected"
                    );
                    let rejection = SwapVerdict::Invalid { tx_hash, reason };
                    if self.policy == ScanPolicy::FirstTransaction {
                        return rejection;
                    }
                    first_rejection.get_or_insert(rejection);
                }
            }
        }

        first_rejection.unwrap_or(SwapVerdict::NoTransactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainRegistry;
    use crate::verifier::SwapRules;

    fn checker(policy: ScanPolicy) -> SwapChecker {
        SwapChecker::new(SwapValidator::new(
            ChainRegistry::default(),
            SwapRules::default(),
        ))
        .with_policy(policy)
    }

    fn empty_receipt(byte: u8) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::repeat_byte(byte),
            logs: vec![],
        }
    }

    #[test]
    fn test_scan_policy_parsing() {
        assert_eq!("first".parse::<ScanPolicy>().unwrap(), ScanPolicy::FirstTransaction);
        assert_eq!("ANY".parse::<ScanPolicy>().unwrap(), ScanPolicy::AnyTransaction);
        assert!("all".parse::<ScanPolicy>().is_err());
        assert_eq!(ScanPolicy::default(), ScanPolicy::FirstTransaction);
    }

    #[test]
    fn test_legacy_mapping() {
        let tx_hash = B256::ZERO;
        assert_eq!(SwapVerdict::Valid { tx_hash }.legacy(), Some(true));
        assert_eq!(
            SwapVerdict::Invalid {
                tx_hash,
                reason: ValidationFailure::NoEvents
            }
            .legacy(),
            Some(false)
        );
        assert_eq!(
            SwapVerdict::ProviderFailure {
                error: "boom".to_string()
            }
            .legacy(),
            Some(false)
        );
        assert_eq!(SwapVerdict::NoTransactions.legacy(), None);
    }

    #[test]
    fn test_evaluate_without_receipts() {
        let verdict = checker(ScanPolicy::FirstTransaction).evaluate(
            Address::ZERO,
            Network::Arbitrum,
            &[],
        );
        assert_eq!(verdict, SwapVerdict::NoTransactions);
    }

    #[test]
    fn test_first_rejection_is_reported_under_both_policies() {
        let receipts = [empty_receipt(1), empty_receipt(2)];
        for policy in [ScanPolicy::FirstTransaction, ScanPolicy::AnyTransaction] {
            let verdict = checker(policy).evaluate(Address::ZERO, Network::Bsc, &receipts);
            assert_eq!(
                verdict,
                SwapVerdict::Invalid {
                    tx_hash: B256::repeat_byte(1),
                    reason: ValidationFailure::NoEvents
                }
            );
        }
    }

    #[tokio::test]
    async fn test_unconfigured_network_is_provider_failure() {
        let checker = checker(ScanPolicy::FirstTransaction);
        assert_eq!(checker.networks().count(), 0);

        let verdict = checker.check(Address::ZERO, Network::Arbitrum).await;
        assert!(matches!(verdict, SwapVerdict::ProviderFailure { .. }));
        assert_eq!(
            checker.check_for_swap(Address::ZERO, Network::Arbitrum).await,
            Some(false)
        );
    }

    #[test]
    fn test_verdict_json_shape() {
        let verdict = SwapVerdict::Invalid {
            tx_hash: B256::ZERO,
            reason: ValidationFailure::SourceChainMismatch {
                expected: 42161,
                got: 56,
            },
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["verdict"], "invalid");
        assert_eq!(json["reason"]["kind"], "source_chain_mismatch");
        assert_eq!(json["reason"]["got"], 56);
    }
}
