//! Single-nominator wallet: order codec and contract address derivation
//!
//! - [`SigningMessage`]: the wallet v3 signing layout and the signed body built from it
//! - [`Order`]: the inner message the wallet is authorised to forward
//! - [`StateInit`]: code + data, whose hash is the contract address
//! - [`SingleNominatorContract`]: ties the above to one deployed contract instance

pub mod config;
pub mod error;
pub mod nominator;
pub mod order;
pub mod signing;
pub mod state_init;

pub use config::{DEFAULT_TIMEOUT_SECS, DEFAULT_WALLET_ID, WalletConfig};
pub use error::WalletError;
pub use nominator::{SingleNominatorContract, TransferArgs};
pub use order::{InternalMessage, Order};
pub use signing::{SIMPLE_ORDER_TAG, Signer, SigningMessage, UNSIGNED_SIGNATURE};
pub use state_init::{StateInit, contract_address};
