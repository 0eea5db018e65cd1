//! Contract initial state and address derivation
//!
//! ```text
//! _ split_depth:(Maybe (## 5)) special:(Maybe TickTock)
//!   code:(Maybe ^Cell) data:(Maybe ^Cell)
//!   library:(Maybe ^Cell) = StateInit;
//! ```

use std::sync::Arc;

use crate::tvm::{Address, Builder, Cell, CellResult};

/// Code and initial data of a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInit {
    pub code: Arc<Cell>,
    pub data: Arc<Cell>,
}

impl StateInit {
    pub fn new(code: Arc<Cell>, data: Arc<Cell>) -> Self {
        Self { code, data }
    }

    /// Writes the state init into `builder`: 5 bits and 2 references
    pub fn write_to(&self, builder: &mut Builder) -> CellResult<()> {
        builder.store_bit(false)?; // split_depth
        builder.store_bit(false)?; // special
        builder.store_maybe_ref(Some(self.code.clone()))?;
        builder.store_maybe_ref(Some(self.data.clone()))?;
        builder.store_bit(false)?; // library
        Ok(())
    }

    pub fn to_cell(&self) -> CellResult<Arc<Cell>> {
        let mut builder = Builder::new();
        self.write_to(&mut builder)?;
        builder.build()
    }

    /// Address of a contract deployed with this state on `workchain`
    pub fn address(&self, workchain: i8) -> CellResult<Address> {
        Ok(Address::new(workchain, self.to_cell()?.hash()))
    }
}

/// Derives the address of the contract built from `code` and `data`
pub fn contract_address(workchain: i8, code: &Arc<Cell>, data: &Arc<Cell>) -> CellResult<Address> {
    StateInit::new(code.clone(), data.clone()).address(workchain)
}
