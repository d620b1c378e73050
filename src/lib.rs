//! Bridge swap check - Library interface
//!
//! Decides whether a wallet completed a cross-chain swap through the bridge
//! contract by reading the source chain's event history:
//!
//! - [`fetcher`] - historical log query and concurrent receipt lookup
//! - [`events`] - `Transfer` / `ComplexOpProcessed` classification and decoding
//! - [`verifier`] - amount and chain id rules
//! - [`checker`] - the pipeline and its verdicts
//!
//! ```ignore
//! let config = swap_check::config::Config::load()?;
//! let checker = config.build_checker()?;
//! let has_swapped = checker.check_for_swap(wallet, Network::Arbitrum).await;
//! ```

pub mod chains;
pub mod checker;
pub mod config;
pub mod events;
pub mod fetcher;
pub mod hash;
pub mod redact;
pub mod types;
pub mod verifier;

pub use chains::{ChainRegistry, Network};
pub use checker::{ScanPolicy, SwapChecker, SwapVerdict};
pub use events::{
    DecodedEvent, DecodedRequestEvent, DecodedTransferEvent, EventDecoder, TransactionEvents,
};
pub use fetcher::{LogFetcher, LogQuery, LogSource, RpcLogSource};
pub use types::{RawLog, TransactionReceipt};
pub use verifier::{SwapRules, SwapValidator, ValidationFailure};
