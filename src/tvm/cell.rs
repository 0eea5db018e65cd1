//! Cell implementation for TON blockchain
//!
//! A cell is a fundamental data structure in TON that can store up to 1023 bits
//! of data and maintain up to 4 references to other cells.
//!
//! Cells are written through a [`CellBuilder`] and frozen by [`CellBuilder::build`].
//! Depth and representation hash are computed once, when the cell is frozen.

use crate::tvm::error::{CellError, CellResult};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Maximum number of bits a cell can store
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can have
pub const MAX_CELL_REFS: usize = 4;

/// Represents an ordinary cell in the TON blockchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Cell data, `ceil(bit_len / 8)` bytes, unused trailing bits zeroed
    data: Vec<u8>,
    /// Number of bits in the cell (not necessarily a multiple of 8)
    bit_len: usize,
    /// References to other cells
    references: Vec<Arc<Cell>>,
    depth: u16,
    hash: [u8; 32],
}

impl Cell {
    /// Creates a cell from raw data, a bit length and its children
    pub fn new(mut data: Vec<u8>, bit_len: usize, references: Vec<Arc<Cell>>) -> CellResult<Self> {
        if bit_len > MAX_CELL_BITS {
            return Err(CellError::BitOverflow {
                used: 0,
                requested: bit_len,
            });
        }
        if references.len() > MAX_CELL_REFS {
            return Err(CellError::RefOverflow);
        }

        let required_bytes = bit_len.div_ceil(8);
        if data.len() < required_bytes {
            return Err(CellError::InvalidData(format!(
                "{} bytes are insufficient for {} bits",
                data.len(),
                bit_len
            )));
        }
        data.truncate(required_bytes);
        if bit_len % 8 != 0 {
            let mask = 0xFFu8 << (8 - bit_len % 8);
            data[required_bytes - 1] &= mask;
        }

        let depth = references
            .iter()
            .map(|r| r.depth() + 1)
            .max()
            .unwrap_or(0);

        let mut cell = Self {
            data,
            bit_len,
            references,
            depth,
            hash: [0u8; 32],
        };
        cell.hash = cell.compute_hash();
        Ok(cell)
    }

    /// Creates a leaf cell with the given data and bit length
    pub fn with_data(data: Vec<u8>, bit_len: usize) -> CellResult<Self> {
        Self::new(data, bit_len, Vec::new())
    }

    /// Creates an empty cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the cell's data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of bits in the cell
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the cell's references
    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    /// Returns the number of references
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Gets a reference by index
    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    /// Computes the cell's descriptors (2 bytes)
    pub fn descriptors(&self) -> [u8; 2] {
        // d1 = r + 8*s + 32*l, ordinary cells only so s = 0 and l = 0
        let refs_descriptor = self.references.len() as u8;

        // d2 = floor(b/8) + ceil(b/8)
        let bits_descriptor = (self.bit_len / 8 + self.bit_len.div_ceil(8)) as u8;

        [refs_descriptor, bits_descriptor]
    }

    /// Serializes the cell data, appending the completion tag for partial bytes
    pub fn serialize_data(&self) -> Vec<u8> {
        let mut result = self.data.clone();

        if self.bit_len % 8 != 0 {
            let last_byte_idx = self.bit_len / 8;
            result[last_byte_idx] |= 1 << (7 - self.bit_len % 8);
        }

        result
    }

    /// Depth of the cell: 0 for leaves, otherwise one more than its deepest child
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Representation hash of the cell
    pub fn hash(&self) -> [u8; 32] {
        self.hash
    }

    fn compute_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        hasher.update(self.descriptors());
        hasher.update(self.serialize_data());

        for reference in &self.references {
            hasher.update(reference.depth().to_be_bytes());
        }

        for reference in &self.references {
            hasher.update(reference.hash());
        }

        hasher.finalize().into()
    }
}

impl Default for Cell {
    fn default() -> Self {
        let mut cell = Self {
            data: Vec::new(),
            bit_len: 0,
            references: Vec::new(),
            depth: 0,
            hash: [0u8; 32],
        };
        cell.hash = cell.compute_hash();
        cell
    }
}

/// Low-level builder for constructing cells
///
/// Writes are append-only and checked against the 1023-bit and 4-reference limits.
/// A failed write leaves the builder untouched.
/// For address, coins and other TL-B helpers, see [`Builder`](crate::tvm::Builder).
///
/// # Example
///
/// ```rust
/// use nominator_wallet::tvm::CellBuilder;
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// builder.store_byte(0xFF).unwrap();
/// let cell = builder.build().unwrap();
/// assert_eq!(cell.bit_len(), 40);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    /// Creates a new cell builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written so far
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Number of references added so far
    pub fn ref_count(&self) -> usize {
        self.references.len()
    }

    /// Bits still available in this cell
    pub fn available_bits(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    /// References still available in this cell
    pub fn available_refs(&self) -> usize {
        MAX_CELL_REFS - self.references.len()
    }

    /// Stores the first `bit_len` bits of a byte slice, MSB first
    pub fn store_bits(&mut self, bits: &[u8], bit_len: usize) -> CellResult<&mut Self> {
        if bit_len > self.available_bits() {
            return Err(CellError::BitOverflow {
                used: self.bit_len,
                requested: bit_len,
            });
        }

        let required_bytes = bit_len.div_ceil(8);
        if bits.len() < required_bytes {
            return Err(CellError::InvalidData(format!(
                "{} bytes are insufficient for {} bits",
                bits.len(),
                bit_len
            )));
        }

        for i in 0..bit_len {
            let bit = (bits[i / 8] >> (7 - i % 8)) & 1;

            let target_byte_idx = self.bit_len / 8;
            if target_byte_idx >= self.data.len() {
                self.data.push(0);
            }
            if bit == 1 {
                self.data[target_byte_idx] |= 1 << (7 - self.bit_len % 8);
            }

            self.bit_len += 1;
        }

        Ok(self)
    }

    /// Stores a single bit
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        self.store_bits(&[if bit { 0x80 } else { 0x00 }], 1)
    }

    /// Stores a byte
    pub fn store_byte(&mut self, byte: u8) -> CellResult<&mut Self> {
        self.store_bits(&[byte], 8)
    }

    /// Stores multiple bytes
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.store_bits(bytes, bytes.len() * 8)
    }

    /// Stores a u8 value
    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.store_byte(value)
    }

    /// Stores a u32 value
    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_bits(&value.to_be_bytes(), 32)
    }

    /// Stores a u64 value
    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_bits(&value.to_be_bytes(), 64)
    }

    /// Stores `value` as exactly `bits` big-endian bits
    ///
    /// Fails if `value` needs more than `bits` bits.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        if bits < 64 && value >> bits != 0 {
            return Err(CellError::ValueOutOfRange {
                value: value as i128,
                bits,
            });
        }
        if bits == 0 {
            return Ok(self);
        }

        let bytes = (value << (64 - bits)).to_be_bytes();
        self.store_bits(&bytes, bits)
    }

    /// Stores a two's complement signed integer as exactly `bits` bits
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        if bits == 0 || bits > 64 {
            return Err(CellError::InvalidWidth(bits));
        }
        if bits < 64 {
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(CellError::ValueOutOfRange {
                    value: value as i128,
                    bits,
                });
            }
        }

        let unsigned = if bits == 64 {
            value as u64
        } else {
            (value as u64) & ((1u64 << bits) - 1)
        };
        self.store_uint(unsigned, bits)
    }

    /// Adds a reference to another cell
    pub fn store_reference(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        if self.references.len() >= MAX_CELL_REFS {
            return Err(CellError::RefOverflow);
        }
        self.references.push(cell);
        Ok(self)
    }

    /// Freezes the builder into a cell
    pub fn build(self) -> CellResult<Arc<Cell>> {
        Ok(Arc::new(Cell::new(self.data, self.bit_len, self.references)?))
    }
}
