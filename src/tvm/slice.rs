//! Slice implementation for reading data from cells
//!
//! A Slice provides a way to read data from a Cell sequentially,
//! tracking the current position in both bits and references.

use crate::tvm::address::Address;
use crate::tvm::cell::Cell;
use crate::tvm::error::{CellError, CellResult};
use std::sync::Arc;

/// A slice for reading data from a cell
#[derive(Debug, Clone)]
pub struct Slice {
    cell: Arc<Cell>,
    bit_pos: usize,
    ref_pos: usize,
}

impl Slice {
    /// Creates a new slice from a cell
    pub fn new(cell: Arc<Cell>) -> Self {
        Self {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    /// Returns the number of remaining bits
    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    /// Returns the number of remaining references
    pub fn remaining_refs(&self) -> usize {
        self.cell.reference_count() - self.ref_pos
    }

    /// Checks if both bits and references are exhausted
    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    fn ensure_bits(&self, n: usize) -> CellResult<()> {
        if n > self.remaining_bits() {
            return Err(CellError::Underflow {
                requested: n,
                remaining: self.remaining_bits(),
            });
        }
        Ok(())
    }

    /// Loads a single bit
    pub fn load_bit(&mut self) -> CellResult<bool> {
        self.ensure_bits(1)?;

        let byte = self.cell.data()[self.bit_pos / 8];
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;

        Ok(bit == 1)
    }

    /// Loads `n` bits, left-aligned into a byte vector
    pub fn load_bits(&mut self, n: usize) -> CellResult<Vec<u8>> {
        self.ensure_bits(n)?;

        let mut result = vec![0u8; n.div_ceil(8)];
        for i in 0..n {
            if self.load_bit()? {
                result[i / 8] |= 1 << (7 - i % 8);
            }
        }

        Ok(result)
    }

    /// Loads a byte (8 bits)
    pub fn load_u8(&mut self) -> CellResult<u8> {
        Ok(self.load_uint(8)? as u8)
    }

    /// Loads a u32 value (32 bits, big-endian)
    pub fn load_u32(&mut self) -> CellResult<u32> {
        Ok(self.load_uint(32)? as u32)
    }

    /// Loads a u64 value (64 bits, big-endian)
    pub fn load_u64(&mut self) -> CellResult<u64> {
        self.load_uint(64)
    }

    /// Loads multiple bytes
    pub fn load_bytes(&mut self, n: usize) -> CellResult<Vec<u8>> {
        self.load_bits(n * 8)
    }

    /// Loads an unsigned integer with a specific number of bits
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        self.ensure_bits(bits)?;

        let mut result = 0u64;
        for _ in 0..bits {
            result = (result << 1) | self.load_bit()? as u64;
        }
        Ok(result)
    }

    /// Loads a signed integer with a specific number of bits
    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits == 0 || bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }

        let unsigned = self.load_uint(bits)?;
        if bits < 64 && unsigned & (1u64 << (bits - 1)) != 0 {
            Ok((unsigned | (!0u64 << bits)) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Loads coins (VarUInteger 16)
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let len = self.load_uint(4)? as usize;
        let bytes = self.load_bytes(len)?;
        Ok(bytes
            .iter()
            .fold(0u128, |acc, &byte| (acc << 8) | byte as u128))
    }

    /// Loads an internal address; `addr_none` yields `None`
    pub fn load_address(&mut self) -> CellResult<Option<Address>> {
        match self.load_uint(2)? {
            0b00 => Ok(None),
            0b10 => {
                if self.load_bit()? {
                    return Err(CellError::InvalidData(
                        "anycast addresses are not supported".to_string(),
                    ));
                }
                let workchain = self.load_int(8)? as i8;
                let mut hash_part = [0u8; 32];
                hash_part.copy_from_slice(&self.load_bytes(32)?);
                Ok(Some(Address::new(workchain, hash_part)))
            }
            tag => Err(CellError::InvalidData(format!(
                "unsupported address tag {tag:#04b}"
            ))),
        }
    }

    /// Loads a reference to another cell
    pub fn load_reference(&mut self) -> CellResult<Arc<Cell>> {
        let reference = self
            .cell
            .reference(self.ref_pos)
            .cloned()
            .ok_or(CellError::Underflow {
                requested: 1,
                remaining: 0,
            })?;

        self.ref_pos += 1;
        Ok(reference)
    }

    /// Skips a number of bits
    pub fn skip_bits(&mut self, n: usize) -> CellResult<()> {
        self.ensure_bits(n)?;
        self.bit_pos += n;
        Ok(())
    }

    /// Gets the underlying cell
    pub fn cell(&self) -> &Arc<Cell> {
        &self.cell
    }
}

impl From<Arc<Cell>> for Slice {
    fn from(cell: Arc<Cell>) -> Self {
        Self::new(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvm::builder::Builder;
    use crate::tvm::cell::CellBuilder;

    #[test]
    fn test_slice_load_bits() {
        let mut builder = CellBuilder::new();
        builder.store_byte(0xFF).unwrap();
        builder.store_byte(0x00).unwrap();
        let cell = builder.build().unwrap();

        let mut slice = Slice::new(cell);
        assert_eq!(slice.remaining_bits(), 16);
        assert_eq!(slice.load_u8().unwrap(), 0xFF);
        assert_eq!(slice.remaining_bits(), 8);
        assert_eq!(slice.load_u8().unwrap(), 0x00);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_slice_load_uint_unaligned() {
        let mut builder = CellBuilder::new();
        builder.store_bit(true).unwrap();
        builder.store_u32(0x12345678).unwrap();
        builder.store_int(-5, 7).unwrap();
        let cell = builder.build().unwrap();

        let mut slice = Slice::new(cell);
        assert!(slice.load_bit().unwrap());
        assert_eq!(slice.load_u32().unwrap(), 0x12345678);
        assert_eq!(slice.load_int(7).unwrap(), -5);
    }

    #[test]
    fn test_slice_underflow() {
        let mut builder = CellBuilder::new();
        builder.store_uint(3, 4).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(
            slice.load_u8().unwrap_err(),
            CellError::Underflow {
                requested: 8,
                remaining: 4
            }
        );
        assert!(slice.load_reference().is_err());
    }

    #[test]
    fn test_slice_load_reference() {
        let ref_cell = CellBuilder::new().build().unwrap();

        let mut builder = CellBuilder::new();
        builder.store_reference(ref_cell.clone()).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        assert_eq!(slice.remaining_refs(), 1);
        assert_eq!(slice.load_reference().unwrap().hash(), ref_cell.hash());
        assert_eq!(slice.remaining_refs(), 0);
    }

    #[test]
    fn test_slice_address_and_coins() {
        let addr = Address::new(-1, [0x22; 32]);
        let mut builder = Builder::new();
        builder.store_address(Some(&addr)).unwrap();
        builder.store_address(None).unwrap();
        builder.store_coins(123_456_789).unwrap();

        let mut slice = Slice::new(builder.build().unwrap());
        assert_eq!(slice.load_address().unwrap(), Some(addr));
        assert_eq!(slice.load_address().unwrap(), None);
        assert_eq!(slice.load_coins().unwrap(), 123_456_789);
        assert_eq!(slice.remaining_bits(), 0);
    }

    #[test]
    fn test_slice_skip() {
        let mut builder = CellBuilder::new();
        builder.store_u32(0x12345678).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());

        slice.skip_bits(16).unwrap();
        assert_eq!(slice.load_uint(16).unwrap(), 0x5678);
    }
}
