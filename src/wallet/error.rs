use thiserror::Error;

use crate::client::StackError;
use crate::tvm::CellError;

/// Errors produced while building or signing wallet messages
#[derive(Debug, Error)]
pub enum WalletError {
    /// A field could not be written: either it does not fit its width or the cell is full
    #[error("failed to encode {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: CellError,
    },
    /// The external signer failed
    #[error(transparent)]
    Signer(anyhow::Error),
    /// The external state query failed
    #[error(transparent)]
    Provider(anyhow::Error),
    /// The state query answered with something that is not a seqno
    #[error("unexpected get-method result: {0}")]
    Stack(#[from] StackError),
}

impl WalletError {
    /// Name of the field that failed to encode, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            WalletError::Field { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Attaches the name of the field being written to a cell error
pub(crate) trait FieldContext<T> {
    fn field(self, field: &'static str) -> Result<T, WalletError>;
}

impl<T> FieldContext<T> for Result<T, CellError> {
    fn field(self, field: &'static str) -> Result<T, WalletError> {
        self.map_err(|source| WalletError::Field { field, source })
    }
}
