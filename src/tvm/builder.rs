//! High-level builder with TL-B helpers
//!
//! [`Builder`] wraps the low-level [`CellBuilder`] and adds the encodings used
//! by wallet messages: addresses, coins, optional references and snake-encoded
//! byte strings.
//!
//! # Examples
//!
//! ```rust
//! use nominator_wallet::tvm::{Address, Builder};
//!
//! let mut builder = Builder::new();
//! let addr = Address::new(0, [0u8; 32]);
//! builder.store_address(Some(&addr)).unwrap();
//! builder.store_coins(1_000_000_000).unwrap();
//!
//! let cell = builder.build().unwrap();
//! assert_eq!(cell.bit_len(), 267 + 4 + 32);
//! ```

use crate::tvm::address::Address;
use crate::tvm::cell::{Cell, CellBuilder, MAX_CELL_REFS};
use crate::tvm::error::{CellError, CellResult};
use std::sync::Arc;

/// Number of bits taken by a standard internal address
pub const STD_ADDRESS_BITS: usize = 267;

/// Extended builder with convenience methods
#[derive(Debug, Clone, Default)]
pub struct Builder {
    inner: CellBuilder,
}

impl Builder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bits used
    pub fn bit_len(&self) -> usize {
        self.inner.bit_len()
    }

    /// Returns the number of available bits
    pub fn available_bits(&self) -> usize {
        self.inner.available_bits()
    }

    /// Returns the number of available bytes
    pub fn available_bytes(&self) -> usize {
        self.available_bits() / 8
    }

    /// Returns the number of references
    pub fn ref_count(&self) -> usize {
        self.inner.ref_count()
    }

    /// Returns the number of available references
    pub fn available_refs(&self) -> usize {
        self.inner.available_refs()
    }

    /// Stores a single bit
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        self.inner.store_bit(bit)?;
        Ok(self)
    }

    /// Stores multiple bits from a byte slice
    pub fn store_bits(&mut self, bits: &[u8], bit_len: usize) -> CellResult<&mut Self> {
        self.inner.store_bits(bits, bit_len)?;
        Ok(self)
    }

    /// Stores a byte
    pub fn store_byte(&mut self, byte: u8) -> CellResult<&mut Self> {
        self.inner.store_byte(byte)?;
        Ok(self)
    }

    /// Stores multiple bytes
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.inner.store_bytes(bytes)?;
        Ok(self)
    }

    /// Stores a u8 value
    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.inner.store_u8(value)?;
        Ok(self)
    }

    /// Stores a u32 value
    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.inner.store_u32(value)?;
        Ok(self)
    }

    /// Stores a u64 value
    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.inner.store_u64(value)?;
        Ok(self)
    }

    /// Stores an unsigned integer with specific bit length
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        self.inner.store_uint(value, bits)?;
        Ok(self)
    }

    /// Stores a signed integer with specific bit length
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        self.inner.store_int(value, bits)?;
        Ok(self)
    }

    /// Stores a reference to another cell
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        self.inner.store_reference(cell)?;
        Ok(self)
    }

    /// Stores an optional reference (Maybe ^Cell)
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> CellResult<&mut Self> {
        match cell {
            Some(c) => {
                if self.available_refs() == 0 {
                    return Err(CellError::RefOverflow);
                }
                self.store_bit(true)?;
                self.store_ref(c)?;
            }
            None => {
                self.store_bit(false)?;
            }
        }
        Ok(self)
    }

    /// Stores the contents of another cell
    pub fn store_cell(&mut self, cell: &Cell) -> CellResult<&mut Self> {
        if self.ref_count() + cell.reference_count() > MAX_CELL_REFS {
            return Err(CellError::RefOverflow);
        }

        self.store_bits(cell.data(), cell.bit_len())?;
        for reference in cell.references() {
            self.store_ref(reference.clone())?;
        }

        Ok(self)
    }

    /// Stores coins (VarUInteger 16)
    pub fn store_coins(&mut self, amount: u128) -> CellResult<&mut Self> {
        if amount == 0 {
            return self.store_uint(0, 4);
        }

        let byte_len = (128 - amount.leading_zeros() as usize).div_ceil(8);
        if byte_len > 15 {
            return Err(CellError::ValueOutOfRange {
                value: amount as i128,
                bits: 120,
            });
        }

        self.store_uint(byte_len as u64, 4)?;
        let bytes = amount.to_be_bytes();
        self.store_bytes(&bytes[16 - byte_len..])?;

        Ok(self)
    }

    /// Stores bytes using snake encoding (splits across a chain of cells if needed)
    pub fn store_snake_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        let available = self.available_bytes();
        if bytes.len() <= available {
            return self.store_bytes(bytes);
        }
        if self.available_refs() == 0 {
            return Err(CellError::RefOverflow);
        }

        self.store_bytes(&bytes[..available])?;

        let mut next_builder = Builder::new();
        next_builder.store_snake_bytes(&bytes[available..])?;
        self.store_ref(next_builder.build()?)?;

        Ok(self)
    }

    /// Stores a TON address, or `addr_none` when absent
    pub fn store_address(&mut self, address: Option<&Address>) -> CellResult<&mut Self> {
        match address {
            None => {
                // addr_none$00
                self.store_uint(0b00, 2)?;
            }
            Some(addr) => {
                if self.available_bits() < STD_ADDRESS_BITS {
                    return Err(CellError::BitOverflow {
                        used: self.bit_len(),
                        requested: STD_ADDRESS_BITS,
                    });
                }
                // addr_std$10 anycast:(Maybe Anycast) workchain_id:int8 address:bits256
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(addr.workchain as i64, 8)?;
                self.store_bytes(&addr.hash_part)?;
            }
        }
        Ok(self)
    }

    /// Builds the cell
    pub fn build(self) -> CellResult<Arc<Cell>> {
        self.inner.build()
    }
}

impl From<CellBuilder> for Builder {
    fn from(inner: CellBuilder) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let mut builder = Builder::new();
        builder.store_u32(0x12345678).unwrap();
        builder.store_byte(0xFF).unwrap();
        assert_eq!(builder.bit_len(), 40);
        assert_eq!(builder.available_bits(), 1023 - 40);

        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 40);
    }

    #[test]
    fn test_builder_address() {
        let addr = Address::new(-1, [0x11u8; 32]);
        let mut builder = Builder::new();
        builder.store_address(Some(&addr)).unwrap();

        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), STD_ADDRESS_BITS);
        // 10 0 11111111 0001...
        assert_eq!(cell.data()[0], 0b1001_1111);
        assert_eq!(cell.data()[1], 0b1110_0010);
    }

    #[test]
    fn test_builder_address_none() {
        let mut builder = Builder::new();
        builder.store_address(None).unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 2);
        assert_eq!(cell.data(), &[0x00]);
    }

    #[test]
    fn test_address_does_not_partially_write() {
        let mut builder = Builder::new();
        builder.store_bytes(&[0u8; 96]).unwrap();
        let addr = Address::new(0, [0u8; 32]);
        assert!(builder.store_address(Some(&addr)).unwrap_err().is_capacity());
        assert_eq!(builder.bit_len(), 768);
    }

    #[test]
    fn test_builder_coins() {
        let mut builder = Builder::new();
        builder.store_coins(1_000_000_000).unwrap();
        let cell = builder.build().unwrap();
        // len = 4 bytes, 0x3B9ACA00
        assert_eq!(cell.bit_len(), 4 + 32);
        assert_eq!(cell.data(), &[0x43, 0xB9, 0xAC, 0xA0, 0x00]);

        let mut zero = Builder::new();
        zero.store_coins(0).unwrap();
        assert_eq!(zero.bit_len(), 4);
    }

    #[test]
    fn test_builder_snake_bytes() {
        let long = vec![b'a'; 200];
        let mut builder = Builder::new();
        builder.store_snake_bytes(&long).unwrap();

        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 127 * 8);
        assert_eq!(cell.reference_count(), 1);
        assert_eq!(cell.reference(0).unwrap().bit_len(), 73 * 8);
    }

    #[test]
    fn test_store_cell() {
        let mut inner = Builder::new();
        inner.store_uint(0b101, 3).unwrap();
        inner.store_ref(Builder::new().build().unwrap()).unwrap();
        let inner = inner.build().unwrap();

        let mut outer = Builder::new();
        outer.store_bit(true).unwrap();
        outer.store_cell(&inner).unwrap();
        let outer = outer.build().unwrap();

        assert_eq!(outer.bit_len(), 4);
        assert_eq!(outer.data(), &[0b1101_0000]);
        assert_eq!(outer.reference_count(), 1);
    }
}
