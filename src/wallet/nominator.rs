//! Single-nominator contract instance
//!
//! The contract's data cell holds the owner address followed by the validator
//! address. Its address is derived from code and data; transfers are signed
//! wallet v3 messages carrying the order to forward.

use std::sync::Arc;

use crate::client::{ContractProvider, StackError};
use crate::tvm::{Address, Builder, Cell, CellError};
use crate::wallet::config::WalletConfig;
use crate::wallet::error::{FieldContext, WalletError};
use crate::wallet::order::Order;
use crate::wallet::signing::{Signer, SigningMessage};
use crate::wallet::state_init::StateInit;

const SEQNO_METHOD: &str = "seqno";

/// Transfer request as received from the caller
///
/// Numeric fields are wide so that out-of-range input is reported against the
/// field it came from instead of being truncated.
#[derive(Debug, Clone, Default)]
pub struct TransferArgs {
    pub seqno: u64,
    pub send_mode: u64,
    pub wallet_id: Option<u64>,
    pub order: Option<Order>,
    pub timeout: Option<u64>,
}

impl TransferArgs {
    pub fn new(seqno: u64, send_mode: u64, order: Option<Order>) -> Self {
        Self {
            seqno,
            send_mode,
            order,
            ..Default::default()
        }
    }

    pub fn with_wallet_id(mut self, wallet_id: u64) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates field widths and applies defaults from `config`
    pub fn into_signing_message(self, config: &WalletConfig) -> Result<SigningMessage, WalletError> {
        let seqno = narrow::<u32>(self.seqno, 32, "seqno")?;
        let send_mode = narrow::<u8>(self.send_mode, 8, "send_mode")?;
        let wallet_id = self
            .wallet_id
            .map(|id| narrow::<u32>(id, 32, "wallet_id"))
            .transpose()?;
        let timeout = self
            .timeout
            .map(|t| narrow::<u32>(t, 32, "timeout"))
            .transpose()?;

        SigningMessage::new(seqno, send_mode, self.order, wallet_id, timeout, config)
    }
}

fn narrow<T: TryFrom<u64>>(value: u64, bits: usize, field: &'static str) -> Result<T, WalletError> {
    T::try_from(value)
        .map_err(|_| CellError::ValueOutOfRange {
            value: value as i128,
            bits,
        })
        .field(field)
}

/// A single-nominator contract identified by its initial state
#[derive(Debug, Clone)]
pub struct SingleNominatorContract {
    address: Address,
    state_init: StateInit,
    workchain: i8,
    config: WalletConfig,
}

impl SingleNominatorContract {
    /// Contract for `owner` and `validator`, placed on the configured workchain
    pub fn create(
        owner: &Address,
        validator: &Address,
        code: Arc<Cell>,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        let mut data = Builder::new();
        data.store_address(Some(owner)).field("owner")?;
        data.store_address(Some(validator)).field("validator")?;
        let data = data.build().field("data")?;

        let workchain = config.workchain;
        Self::new(code, data, workchain, config)
    }

    /// Contract for arbitrary code and data cells
    pub fn new(
        code: Arc<Cell>,
        data: Arc<Cell>,
        workchain: i8,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        let state_init = StateInit::new(code, data);
        let address = state_init.address(workchain).field("state_init")?;
        log::debug!("single nominator address {}", address.to_hex());

        Ok(Self {
            address,
            state_init,
            workchain,
            config,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn state_init(&self) -> &StateInit {
        &self.state_init
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Current seqno, or 0 when the contract is not deployed yet
    pub async fn get_seqno<P>(&self, provider: &P) -> Result<u32, WalletError>
    where
        P: ContractProvider + ?Sized,
    {
        let deployed = provider
            .is_contract_deployed(&self.address)
            .await
            .map_err(WalletError::Provider)?;
        if !deployed {
            log::debug!("{} is not deployed, seqno is 0", self.address.to_hex());
            return Ok(0);
        }

        let result = provider
            .run_get_method(&self.address, SEQNO_METHOD, Vec::new())
            .await
            .map_err(WalletError::Provider)?;
        if !result.is_success() {
            return Err(StackError::ExitCode(result.exit_code).into());
        }

        let seqno = result
            .stack
            .first()
            .ok_or(StackError::Empty)?
            .as_u32()?;
        log::debug!("{} seqno {}", self.address.to_hex(), seqno);
        Ok(seqno)
    }

    /// Builds the signed transfer body
    ///
    /// Without a signer the body carries a zeroed signature.
    pub fn create_transfer(
        &self,
        args: TransferArgs,
        signer: Option<&dyn Signer>,
    ) -> Result<Arc<Cell>, WalletError> {
        let message = args.into_signing_message(&self.config)?;
        message.sign(signer)
    }
}
