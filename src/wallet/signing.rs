//! Wallet v3 signing message
//!
//! ```text
//! signing_message wallet_id:uint32 valid_until:uint32 seqno:uint32
//!   op:uint8 [send_mode:uint8 ^order] = SigningMessage;
//! body signature:bits512 signing_message:SigningMessage = Body;
//! ```
//!
//! A fresh wallet (seqno 0) is sent with all 32 bits of `valid_until` set, which
//! disables the expiry check.

use ed25519_dalek::{Signer as _, SigningKey};
use std::sync::Arc;

use crate::tvm::{Builder, Cell};
use crate::wallet::config::WalletConfig;
use crate::wallet::error::{FieldContext, WalletError};
use crate::wallet::order::Order;

/// Op tag of a simple order
pub const SIMPLE_ORDER_TAG: u8 = 0;

/// Signature placeholder used when no key is supplied
pub const UNSIGNED_SIGNATURE: [u8; 64] = [0u8; 64];

const NO_TIMEOUT: u32 = u32::MAX;

/// Produces a signature over a cell hash
pub trait Signer {
    fn sign(&self, digest: &[u8; 32]) -> anyhow::Result<[u8; 64]>;
}

impl Signer for SigningKey {
    fn sign(&self, digest: &[u8; 32]) -> anyhow::Result<[u8; 64]> {
        Ok(self.try_sign(digest)?.to_bytes())
    }
}

/// Fields signed by the wallet owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningMessage {
    pub wallet_id: u32,
    pub timeout: u32,
    pub seqno: u32,
    pub send_mode: u8,
    pub order: Option<Order>,
}

impl SigningMessage {
    /// Builds a message, filling `wallet_id` and `timeout` from `config` when absent
    pub fn new(
        seqno: u32,
        send_mode: u8,
        order: Option<Order>,
        wallet_id: Option<u32>,
        timeout: Option<u32>,
        config: &WalletConfig,
    ) -> Result<Self, WalletError> {
        let timeout = match timeout {
            Some(timeout) => timeout,
            None => config.default_timeout()?,
        };

        Ok(Self {
            wallet_id: wallet_id.unwrap_or(config.wallet_id),
            timeout,
            seqno,
            send_mode,
            order,
        })
    }

    /// Value written in the timeout slot
    pub fn valid_until(&self) -> u32 {
        if self.seqno == 0 {
            NO_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// Writes the signing layout into `builder`
    pub fn write_to(&self, builder: &mut Builder) -> Result<(), WalletError> {
        builder
            .store_uint(self.wallet_id as u64, 32)
            .field("wallet_id")?;
        builder
            .store_uint(self.valid_until() as u64, 32)
            .field("timeout")?;
        builder.store_uint(self.seqno as u64, 32).field("seqno")?;
        builder
            .store_uint(SIMPLE_ORDER_TAG as u64, 8)
            .field("op")?;

        if let Some(order) = &self.order {
            builder
                .store_uint(self.send_mode as u64, 8)
                .field("send_mode")?;
            let order_cell = order.to_cell().field("order")?;
            builder.store_ref(order_cell).field("order")?;
        }

        Ok(())
    }

    /// Cell whose hash is signed
    pub fn signing_cell(&self) -> Result<Arc<Cell>, WalletError> {
        let mut builder = Builder::new();
        self.write_to(&mut builder)?;
        builder.build().field("signing_message")
    }

    /// Body cell: the signature followed by the signing layout, re-encoded
    pub fn body_cell(&self, signature: &[u8; 64]) -> Result<Arc<Cell>, WalletError> {
        let mut builder = Builder::new();
        builder.store_bytes(signature).field("signature")?;
        self.write_to(&mut builder)?;
        builder.build().field("body")
    }

    /// Signs the message and returns the body cell
    ///
    /// Without a signer the signature is 64 zero bytes, which keeps the body the
    /// same size as a signed one.
    pub fn sign(&self, signer: Option<&dyn Signer>) -> Result<Arc<Cell>, WalletError> {
        let signature = match signer {
            Some(signer) => {
                let digest = self.signing_cell()?.hash();
                log::debug!("signing wallet message {}", hex::encode(digest));
                signer.sign(&digest).map_err(WalletError::Signer)?
            }
            None => {
                log::debug!("building unsigned wallet message, seqno {}", self.seqno);
                UNSIGNED_SIGNATURE
            }
        };

        self.body_cell(&signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::{CellError, Slice};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    fn message(seqno: u32, order: Option<Order>) -> SigningMessage {
        SigningMessage {
            wallet_id: 698983191,
            timeout: 1_700_000_060,
            seqno,
            send_mode: 3,
            order,
        }
    }

    #[test]
    fn test_layout_without_order() {
        let cell = message(7, None).signing_cell().unwrap();
        assert_eq!(cell.bit_len(), 104);
        assert_eq!(cell.reference_count(), 0);

        let mut slice = Slice::new(cell);
        assert_eq!(slice.load_u32().unwrap(), 698983191);
        assert_eq!(slice.load_u32().unwrap(), 1_700_000_060);
        assert_eq!(slice.load_u32().unwrap(), 7);
        assert_eq!(slice.load_u8().unwrap(), SIMPLE_ORDER_TAG);
    }

    #[test]
    fn test_layout_with_order() {
        let order = Order::Raw(vec![0xAB]);
        let cell = message(7, Some(order.clone())).signing_cell().unwrap();
        assert_eq!(cell.bit_len(), 112);
        assert_eq!(cell.reference_count(), 1);

        let mut slice = Slice::new(cell);
        slice.skip_bits(104).unwrap();
        assert_eq!(slice.load_u8().unwrap(), 3);
        assert_eq!(
            slice.load_reference().unwrap().hash(),
            order.to_cell().unwrap().hash()
        );
    }

    #[test]
    fn test_zero_seqno_writes_all_ones() {
        let mut msg = message(0, None);
        for timeout in [0, 1, 1_700_000_060, u32::MAX] {
            msg.timeout = timeout;
            let cell = msg.signing_cell().unwrap();
            assert_eq!(&cell.data()[4..8], &[0xFF; 4]);
        }
    }

    #[test]
    fn test_send_mode_ignored_without_order() {
        let mut a = message(1, None);
        let mut b = message(1, None);
        a.send_mode = 3;
        b.send_mode = 128;
        assert_eq!(
            a.signing_cell().unwrap().hash(),
            b.signing_cell().unwrap().hash()
        );
    }

    #[test]
    fn test_unsigned_body() {
        let body = message(5, Some(Order::Raw(vec![1, 2, 3])))
            .sign(None)
            .unwrap();
        assert_eq!(body.bit_len(), 512 + 112);
        assert_eq!(&body.data()[..64], &UNSIGNED_SIGNATURE);
        assert_eq!(body.reference_count(), 1);
    }

    #[test]
    fn test_signed_body_verifies() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let msg = message(5, Some(Order::Raw(vec![1, 2, 3])));

        let body = msg.sign(Some(&key)).unwrap();
        let digest = msg.signing_cell().unwrap().hash();

        let mut signature = [0u8; 64];
        signature.copy_from_slice(&body.data()[..64]);
        let verifying_key: VerifyingKey = key.verifying_key();
        verifying_key
            .verify(&digest, &Signature::from_bytes(&signature))
            .unwrap();

        assert_eq!(&body.data()[64..], &msg.signing_cell().unwrap().data()[..]);
    }

    struct FailingSigner;

    impl Signer for FailingSigner {
        fn sign(&self, _digest: &[u8; 32]) -> anyhow::Result<[u8; 64]> {
            anyhow::bail!("hardware wallet disconnected")
        }
    }

    #[test]
    fn test_signer_error_passes_through() {
        let err = message(1, None).sign(Some(&FailingSigner)).unwrap_err();
        assert!(matches!(err, WalletError::Signer(_)));
        assert_eq!(err.to_string(), "hardware wallet disconnected");
    }

    #[test]
    fn test_oversized_order_reports_field() {
        let err = message(1, Some(Order::Raw(vec![0u8; 200])))
            .signing_cell()
            .unwrap_err();
        assert_eq!(err.field(), Some("order"));
        assert!(matches!(
            err,
            WalletError::Field {
                source: CellError::BitOverflow { .. },
                ..
            }
        ));
    }
}
