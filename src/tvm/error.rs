use thiserror::Error;

use crate::tvm::cell::{MAX_CELL_BITS, MAX_CELL_REFS};

/// Errors raised while building or reading cells
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("cell overflow: cannot store {requested} bits, {used} of {MAX_CELL_BITS} already used")]
    BitOverflow { used: usize, requested: usize },
    #[error("cell overflow: maximum of {MAX_CELL_REFS} references reached")]
    RefOverflow,
    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: i128, bits: usize },
    #[error("unsupported integer width: {0} bits")]
    InvalidWidth(usize),
    #[error("cell underflow: requested {requested}, {remaining} remaining")]
    Underflow { requested: usize, remaining: usize },
    #[error("invalid cell data: {0}")]
    InvalidData(String),
}

impl CellError {
    /// The cell ran out of bits or references
    pub fn is_capacity(&self) -> bool {
        matches!(self, CellError::BitOverflow { .. } | CellError::RefOverflow)
    }

    /// A value could not be represented in its declared width
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            CellError::ValueOutOfRange { .. } | CellError::InvalidWidth(_)
        )
    }
}

pub type CellResult<T> = Result<T, CellError>;
