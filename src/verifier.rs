//! Swap validation rules
//!
//! Checks the events decoded from a single transaction, in order:
//!
//! 1. At least one known event was decoded
//! 2. The transferred amount, in whole tokens, is strictly above the minimum
//! 3. The bridge hop starts on the network being checked
//! 4. The bridge hop targets the destination network
//!
//! The first failing rule decides the outcome.

use alloy::primitives::U256;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::chains::{ChainRegistry, Network};
use crate::events::TransactionEvents;

/// Reason a transaction was not accepted as a swap
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("no transfer or bridge event in transaction")]
    NoEvents,
    #[error("no transfer from the wallet in transaction")]
    MissingTransfer,
    #[error("transferred {units} tokens, need more than {minimum}")]
    AmountBelowMinimum { units: U256, minimum: u64 },
    #[error("no ComplexOpProcessed event in transaction")]
    MissingRequest,
    #[error("bridge hop started on chain {got}, expected {expected}")]
    SourceChainMismatch { expected: u64, got: u64 },
    #[error("bridge hop targets chain {got}, expected {expected}")]
    DestinationChainMismatch { expected: u64, got: u64 },
    #[error("no chain id registered for {network}")]
    UnknownChain { network: Network },
}

/// Thresholds and destination applied to every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRules {
    /// Whole-token amount the transfer must exceed
    pub min_amount: u64,
    /// Implied decimals of the raw transfer amount
    pub amount_decimals: u8,
    /// Network the bridge hop must point at
    pub destination: Network,
}

impl Default for SwapRules {
    fn default() -> Self {
        Self {
            min_amount: 5,
            amount_decimals: 6,
            destination: Network::Optimistic,
        }
    }
}

impl SwapRules {
    /// Raw amount converted to whole tokens (integer division)
    pub fn whole_units(&self, amount: U256) -> U256 {
        amount / U256::from(10u64).pow(U256::from(self.amount_decimals))
    }
}

/// Applies [`SwapRules`] against a [`ChainRegistry`]
#[derive(Debug, Clone)]
pub struct SwapValidator {
    registry: ChainRegistry,
    rules: SwapRules,
}

impl SwapValidator {
    pub fn new(registry: ChainRegistry, rules: SwapRules) -> Self {
        Self { registry, rules }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &SwapRules {
        &self.rules
    }

    /// Validate the events of one transaction for a swap starting on `network`
    pub fn validate(
        &self,
        events: &TransactionEvents,
        network: Network,
    ) -> Result<(), ValidationFailure> {
        if events.is_empty() {
            debug!("No decodable events in transaction");
            return Err(ValidationFailure::NoEvents);
        }

        let transfer = events
            .transfer
            .as_ref()
            .ok_or(ValidationFailure::MissingTransfer)?;

        let units = self.rules.whole_units(transfer.amount);
        if units <= U256::from(self.rules.min_amount) {
            info!(
                amount = %transfer.amount,
                units = %units,
                minimum = self.rules.min_amount,
                "Transfer amount below minimum"
            );
            return Err(ValidationFailure::AmountBelowMinimum {
                units,
                minimum: self.rules.min_amount,
            });
        }

        let request = events
            .request
            .as_ref()
            .ok_or(ValidationFailure::MissingRequest)?;

        let expected_source = self.chain_id(network)?;
        if request.current_chain_id != expected_source {
            info!(
                network = %network,
                expected = expected_source,
                got = request.current_chain_id,
                "Source chain mismatch"
            );
            return Err(ValidationFailure::SourceChainMismatch {
                expected: expected_source,
                got: request.current_chain_id,
            });
        }

        let expected_destination = self.chain_id(self.rules.destination)?;
        if request.next_chain_id != expected_destination {
            info!(
                destination = %self.rules.destination,
                expected = expected_destination,
                got = request.next_chain_id,
                "Destination chain mismatch"
            );
            return Err(ValidationFailure::DestinationChainMismatch {
                expected: expected_destination,
                got: request.next_chain_id,
            });
        }

        Ok(())
    }

    fn chain_id(&self, network: Network) -> Result<u64, ValidationFailure> {
        self.registry
            .chain_id(network)
            .ok_or(ValidationFailure::UnknownChain { network })
    }
}
