use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::tvm::CellError;
use crate::tvm::address::MASTERCHAIN;
use crate::wallet::error::{FieldContext, WalletError};

/// Wallet id used by standard wallet v3 contracts on workchain 0
pub const DEFAULT_WALLET_ID: u32 = 698983191;

/// How long a signed order stays valid when no timeout is given
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// Protocol defaults applied when a transfer leaves a field out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub wallet_id: u32,
    pub timeout_secs: u32,
    pub workchain: i8,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet_id: DEFAULT_WALLET_ID,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workchain: MASTERCHAIN,
        }
    }
}

impl WalletConfig {
    /// Order expiry for a message signed at unix time `now`
    pub fn timeout_after(&self, now: i64) -> Result<u32, WalletError> {
        let deadline = now + self.timeout_secs as i64;
        u32::try_from(deadline)
            .map_err(|_| CellError::ValueOutOfRange {
                value: deadline as i128,
                bits: 32,
            })
            .field("timeout")
    }

    /// Order expiry for a message signed now
    pub fn default_timeout(&self) -> Result<u32, WalletError> {
        self.timeout_after(chrono::Utc::now().timestamp())
    }
}

impl FromStr for WalletConfig {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.wallet_id, 698983191);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.workchain, -1);
    }

    #[test]
    fn test_partial_json() {
        let config = WalletConfig::from_str(r#"{"timeout_secs": 300}"#).unwrap();
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.wallet_id, DEFAULT_WALLET_ID);
        assert_eq!(config.workchain, MASTERCHAIN);

        assert!(WalletConfig::from_str(r#"{"wallet_id": -1}"#).is_err());
    }

    #[test]
    fn test_timeout_after() {
        let config = WalletConfig::default();
        assert_eq!(config.timeout_after(1_700_000_000).unwrap(), 1_700_000_060);

        let err = config.timeout_after(u32::MAX as i64).unwrap_err();
        assert_eq!(err.field(), Some("timeout"));
    }

    #[test]
    fn test_default_timeout_is_in_the_future() {
        let now = chrono::Utc::now().timestamp();
        let timeout = WalletConfig::default().default_timeout().unwrap() as i64;
        assert!(timeout >= now + 60);
        assert!(timeout <= now + 61);
    }
}
