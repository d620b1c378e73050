//! Swap checker configuration

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

use crate::chains::{ChainRegistry, Network};
use crate::checker::{ScanPolicy, SwapChecker};
use crate::fetcher::{LogFetcher, RpcLogSource};
use crate::redact::{rpc_origin, Redacted};
use crate::verifier::{SwapRules, SwapValidator};

/// Bridge contract, deployed at the same address on every source chain
pub const DEFAULT_BRIDGE_ADDRESS: &str = "0xA2A786ff9148f7C88EE93372Db8CBe9e94585c74";

/// Swap checker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Infura project id used to build provider URLs
    pub infura_project_id: Option<Redacted<String>>,
    /// Full RPC URL for Arbitrum, takes precedence over Infura
    pub arbitrum_rpc_url: Option<Redacted<String>>,
    /// Full RPC URL for BSC, takes precedence over Infura
    pub bsc_rpc_url: Option<Redacted<String>>,

    /// Bridge contract address
    pub bridge_address: Address,
    /// First block of the historical log query
    pub from_block: u64,
    /// Which matched transactions are examined
    pub scan_policy: ScanPolicy,

    /// Chain id table
    pub registry: ChainRegistry,
    /// Amount and destination rules
    pub rules: SwapRules,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_env()
    }

    /// Build configuration from process environment only
    pub fn from_env() -> Result<Self> {
        let bridge_address = match optional_var("BRIDGE_ADDRESS") {
            Some(raw) => Address::from_str(&raw).wrap_err("Invalid BRIDGE_ADDRESS")?,
            None => Address::from_str(DEFAULT_BRIDGE_ADDRESS)?,
        };

        let scan_policy = match optional_var("SCAN_POLICY") {
            Some(raw) => raw.parse::<ScanPolicy>().wrap_err("Invalid SCAN_POLICY")?,
            None => ScanPolicy::default(),
        };

        let mut registry = ChainRegistry::default();
        for (var, network) in [
            ("BSC_CHAIN_ID", Network::Bsc),
            ("OPTIMISTIC_CHAIN_ID", Network::Optimistic),
            ("ARBITRUM_CHAIN_ID", Network::Arbitrum),
        ] {
            if let Some(chain_id) = parse_var::<u64>(var)? {
                registry = registry.with_chain(network, chain_id);
            }
        }

        let defaults = SwapRules::default();
        let rules = SwapRules {
            min_amount: parse_var("MIN_SWAP_AMOUNT")?.unwrap_or(defaults.min_amount),
            amount_decimals: parse_var("AMOUNT_DECIMALS")?.unwrap_or(defaults.amount_decimals),
            destination: defaults.destination,
        };

        let config = Self {
            infura_project_id: optional_var("INFURA_PROJECT_ID").map(Redacted),
            arbitrum_rpc_url: optional_var("ARBITRUM_RPC_URL").map(Redacted),
            bsc_rpc_url: optional_var("BSC_RPC_URL").map(Redacted),
            bridge_address,
            from_block: parse_var("FROM_BLOCK")?.unwrap_or(0),
            scan_policy,
            registry,
            rules,
        };

        if config.configured_networks().is_empty() {
            return Err(eyre!(
                "INFURA_PROJECT_ID required (or ARBITRUM_RPC_URL / BSC_RPC_URL)"
            ));
        }

        Ok(config)
    }

    /// RPC URL for a source network, if one can be built
    pub fn rpc_url(&self, network: Network) -> Option<String> {
        let explicit = match network {
            Network::Arbitrum => self.arbitrum_rpc_url.as_ref(),
            Network::Bsc => self.bsc_rpc_url.as_ref(),
            Network::Optimistic => None,
        };
        if let Some(url) = explicit {
            return Some(url.expose().clone());
        }

        if !network.is_source() {
            return None;
        }
        self.infura_project_id.as_ref().map(|key| {
            format!(
                "https://{}-mainnet.infura.io/v3/{}",
                network.as_str(),
                key.expose()
            )
        })
    }

    /// Source networks that have an RPC URL
    pub fn configured_networks(&self) -> Vec<Network> {
        Network::SOURCES
            .into_iter()
            .filter(|network| self.rpc_url(*network).is_some())
            .collect()
    }

    /// Build a checker with one RPC-backed fetcher per configured network
    pub fn build_checker(&self) -> Result<SwapChecker> {
        let validator = SwapValidator::new(self.registry.clone(), self.rules);
        let mut checker = SwapChecker::new(validator).with_policy(self.scan_policy);

        for network in self.configured_networks() {
            let Some(rpc_url) = self.rpc_url(network) else {
                continue;
            };
            let source = RpcLogSource::new(&rpc_url)
                .wrap_err_with(|| format!("Failed to create provider for {}", network))?;
            let fetcher = LogFetcher::new(Arc::new(source), self.bridge_address)
                .with_from_block(self.from_block);

            tracing::info!(
                network = %network,
                rpc = %rpc_origin(&rpc_url),
                bridge = %self.bridge_address,
                "Provider configured"
            );
            checker = checker.with_fetcher(network, fetcher);
        }

        Ok(checker)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    optional_var(name)
        .map(|raw| raw.parse().map_err(|_| eyre!("Invalid {}: {}", name, raw)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 11] = [
        "INFURA_PROJECT_ID",
        "ARBITRUM_RPC_URL",
        "BSC_RPC_URL",
        "BRIDGE_ADDRESS",
        "FROM_BLOCK",
        "SCAN_POLICY",
        "MIN_SWAP_AMOUNT",
        "AMOUNT_DECIMALS",
        "BSC_CHAIN_ID",
        "OPTIMISTIC_CHAIN_ID",
        "ARBITRUM_CHAIN_ID",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_with_infura_key() {
        clear_env();
        env::set_var("INFURA_PROJECT_ID", "abc123");

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.bridge_address,
            Address::from_str(DEFAULT_BRIDGE_ADDRESS).unwrap()
        );
        assert_eq!(config.from_block, 0);
        assert_eq!(config.scan_policy, ScanPolicy::FirstTransaction);
        assert_eq!(config.registry, ChainRegistry::default());
        assert_eq!(config.rules, SwapRules::default());
        assert_eq!(
            config.rpc_url(Network::Arbitrum).as_deref(),
            Some("https://arbitrum-mainnet.infura.io/v3/abc123")
        );
        assert_eq!(
            config.rpc_url(Network::Bsc).as_deref(),
            Some("https://bsc-mainnet.infura.io/v3/abc123")
        );
        assert_eq!(config.rpc_url(Network::Optimistic), None);
        assert_eq!(
            config.configured_networks(),
            vec![Network::Arbitrum, Network::Bsc]
        );

        // key never shows up in debug output
        assert!(!format!("{:?}", config).contains("abc123"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_provider_settings_fail() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("INFURA_PROJECT_ID"));
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("ARBITRUM_RPC_URL", "http://localhost:8545");
        env::set_var("FROM_BLOCK", "1200");
        env::set_var("SCAN_POLICY", "any");
        env::set_var("MIN_SWAP_AMOUNT", "100");
        env::set_var("OPTIMISTIC_CHAIN_ID", "10");

        let config = Config::from_env().unwrap();
        assert_eq!(config.configured_networks(), vec![Network::Arbitrum]);
        assert_eq!(
            config.rpc_url(Network::Arbitrum).as_deref(),
            Some("http://localhost:8545")
        );
        assert_eq!(config.from_block, 1200);
        assert_eq!(config.scan_policy, ScanPolicy::AnyTransaction);
        assert_eq!(config.rules.min_amount, 100);
        assert_eq!(config.rules.amount_decimals, 6);
        assert_eq!(config.registry.chain_id(Network::Optimistic), Some(10));

        let checker = config.build_checker().unwrap();
        assert_eq!(checker.policy(), ScanPolicy::AnyTransaction);
        assert_eq!(checker.networks().count(), 1);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_rejected() {
        clear_env();
        env::set_var("INFURA_PROJECT_ID", "abc123");
        env::set_var("FROM_BLOCK", "latest");
        assert!(Config::from_env().is_err());

        env::remove_var("FROM_BLOCK");
        env::set_var("BRIDGE_ADDRESS", "0x1234");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
