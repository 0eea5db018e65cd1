//! Contract state queries
//!
//! The crate never talks to the network itself. Callers plug in a
//! [`ContractProvider`] backed by a lite server, an HTTP API or a test double.

pub mod stack;

pub use stack::{GetMethodResult, StackEntry, StackError, StackItemType};

use async_trait::async_trait;

use crate::tvm::Address;

/// Read-only access to deployed contracts
#[async_trait]
pub trait ContractProvider: Send + Sync {
    /// Whether a contract with code is active at `address`
    async fn is_contract_deployed(&self, address: &Address) -> anyhow::Result<bool>;

    /// Runs a get-method and returns its exit code and result stack
    async fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        stack: Vec<StackEntry>,
    ) -> anyhow::Result<GetMethodResult>;
}
