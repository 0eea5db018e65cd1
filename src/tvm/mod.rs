//! TVM (TON Virtual Machine) data structures
//!
//! - Cell: stores up to 1023 bits and up to 4 references, hashed on construction
//! - CellBuilder / Builder: append-only writers producing cells
//! - Slice: a reader for sequentially accessing cell data
//! - Address: internal addresses (workchain + hash)
//! - BoC: Bag of Cells serialization

pub mod address;
pub mod boc;
pub mod builder;
pub mod cell;
pub mod error;
pub mod slice;
#[cfg(test)]
mod tests;

pub use address::{Address, AddressError, BASECHAIN, MASTERCHAIN};
pub use boc::{
    BocError, base64_to_boc, boc_to_base64, boc_to_hex, deserialize_boc, hex_to_boc,
    serialize_boc,
};
pub use builder::{Builder, STD_ADDRESS_BITS};
pub use cell::{Cell, CellBuilder, MAX_CELL_BITS, MAX_CELL_REFS};
pub use error::{CellError, CellResult};
pub use slice::Slice;
