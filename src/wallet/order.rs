//! Orders: the inner message a wallet forwards once the signature checks out

use std::sync::Arc;

use crate::tvm::{Address, Builder, Cell, CellResult};
use crate::wallet::state_init::StateInit;

/// Payload nested under the signing layout as a child cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// Bytes stored verbatim in the child cell
    Raw(Vec<u8>),
    /// A fully described internal message
    Internal(InternalMessage),
}

impl Order {
    /// Serializes the order into `builder`, which becomes the order's child cell
    pub fn write_to(&self, builder: &mut Builder) -> CellResult<()> {
        match self {
            Order::Raw(bytes) => {
                builder.store_bytes(bytes)?;
            }
            Order::Internal(message) => message.write_to(builder)?,
        }
        Ok(())
    }

    pub fn to_cell(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        self.write_to(&mut builder)?;
        builder.build()
    }
}

impl From<InternalMessage> for Order {
    fn from(message: InternalMessage) -> Self {
        Order::Internal(message)
    }
}

/// Internal message sent by the wallet
///
/// ```text
/// int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
///   src:MsgAddressInt dest:MsgAddressInt value:CurrencyCollection
///   ihr_fee:Grams fwd_fee:Grams created_lt:uint64 created_at:uint32
/// message$_ info:CommonMsgInfo init:(Maybe (Either StateInit ^StateInit))
///   body:(Either X ^X) = Message X;
/// ```
///
/// Source, fees and timestamps are left empty; the validator fills them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMessage {
    pub dest: Address,
    /// Amount in nanotons
    pub value: u128,
    pub bounce: bool,
    pub state_init: Option<StateInit>,
    pub body: Option<Arc<Cell>>,
}

impl InternalMessage {
    /// Plain value transfer without body or state init
    pub fn new(dest: Address, value: u128, bounce: bool) -> Self {
        Self {
            dest,
            value,
            bounce,
            state_init: None,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Arc<Cell>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_state_init(mut self, state_init: StateInit) -> Self {
        self.state_init = Some(state_init);
        self
    }

    /// Text comment body: op 0 followed by the UTF-8 text, snake-encoded
    pub fn comment(text: &str) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        builder.store_u32(0)?;
        builder.store_snake_bytes(text.as_bytes())?;
        builder.build()
    }

    pub fn write_to(&self, builder: &mut Builder) -> CellResult<()> {
        builder.store_bit(false)?; // int_msg_info$0
        builder.store_bit(true)?; // ihr_disabled
        builder.store_bit(self.bounce)?;
        builder.store_bit(false)?; // bounced
        builder.store_address(None)?; // src
        builder.store_address(Some(&self.dest))?;
        builder.store_coins(self.value)?;
        builder.store_bit(false)?; // extra currencies
        builder.store_coins(0)?; // ihr_fee
        builder.store_coins(0)?; // fwd_fee
        builder.store_u64(0)?; // created_lt
        builder.store_u32(0)?; // created_at

        match &self.state_init {
            Some(state_init) => {
                builder.store_bit(true)?;
                builder.store_bit(true)?;
                builder.store_ref(state_init.to_cell()?)?;
            }
            None => {
                builder.store_bit(false)?;
            }
        }

        match &self.body {
            Some(body) => {
                builder.store_bit(true)?;
                builder.store_ref(body.clone())?;
            }
            None => {
                builder.store_bit(false)?;
            }
        }

        Ok(())
    }
}
