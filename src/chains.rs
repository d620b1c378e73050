//! Networks and their numeric chain identifiers

use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Networks known to the swap check.
///
/// `Arbitrum` and `Bsc` are source networks a swap can start from.
/// `Optimistic` is the destination every valid swap must point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Bsc,
    Optimistic,
    Arbitrum,
}

impl Network {
    /// Networks accepted by the swap check entry point
    pub const SOURCES: [Network; 2] = [Network::Arbitrum, Network::Bsc];

    /// Lowercase name, also the Infura subdomain prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bsc => "bsc",
            Network::Optimistic => "optimistic",
            Network::Arbitrum => "arbitrum",
        }
    }

    pub fn is_source(&self) -> bool {
        Self::SOURCES.contains(self)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bsc" => Ok(Network::Bsc),
            "optimistic" => Ok(Network::Optimistic),
            "arbitrum" => Ok(Network::Arbitrum),
            other => Err(eyre!(
                "Unknown network '{}' (expected bsc, optimistic or arbitrum)",
                other
            )),
        }
    }
}

/// Chain id table consumed by the validator.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    chain_ids: HashMap<Network, u64>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        let mut chain_ids = HashMap::new();
        chain_ids.insert(Network::Bsc, 56);
        // NOTE: Optimism mainnet is chain 10. 250 is what the bridge checks
        // have always used and stays until someone confirms the intended id.
        chain_ids.insert(Network::Optimistic, 250);
        chain_ids.insert(Network::Arbitrum, 42161);
        Self { chain_ids }
    }
}

impl ChainRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self {
            chain_ids: HashMap::new(),
        }
    }

    /// Return a copy with `network` mapped to `chain_id`
    pub fn with_chain(mut self, network: Network, chain_id: u64) -> Self {
        self.chain_ids.insert(network, chain_id);
        self
    }

    pub fn chain_id(&self, network: Network) -> Option<u64> {
        self.chain_ids.get(&network).copied()
    }

    pub fn len(&self) -> usize {
        self.chain_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_table() {
        let registry = ChainRegistry::default();
        assert_eq!(registry.chain_id(Network::Bsc), Some(56));
        assert_eq!(registry.chain_id(Network::Arbitrum), Some(42161));
        // Deliberately not 10, see the note on the default table
        assert_eq!(registry.chain_id(Network::Optimistic), Some(250));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_with_chain_overrides_entry() {
        let registry = ChainRegistry::default().with_chain(Network::Optimistic, 10);
        assert_eq!(registry.chain_id(Network::Optimistic), Some(10));

        let empty = ChainRegistry::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.chain_id(Network::Bsc), None);
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("arbitrum".parse::<Network>().unwrap(), Network::Arbitrum);
        assert_eq!(" BSC ".parse::<Network>().unwrap(), Network::Bsc);
        assert_eq!("optimistic".parse::<Network>().unwrap(), Network::Optimistic);
        assert!("ethereum".parse::<Network>().is_err());
    }

    #[test]
    fn test_source_networks() {
        assert!(Network::Arbitrum.is_source());
        assert!(Network::Bsc.is_source());
        assert!(!Network::Optimistic.is_source());
        assert_eq!(Network::Arbitrum.to_string(), "arbitrum");
    }
}
