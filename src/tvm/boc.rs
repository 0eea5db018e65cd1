//! Bag of Cells (BoC) serialization and deserialization
//!
//! BoC is the wire format used to move cell trees around: the contract code blob
//! arrives as a BoC, and finished message bodies leave as one.
//! Cells are stored parents-first, so the root always has index 0 and every
//! reference points to a higher index.

use crate::tvm::cell::{Cell, MAX_CELL_REFS};
use crate::tvm::error::CellError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// BoC magic number for standard format
const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// BoC magic number for indexed format
const BOC_INDEXED_MAGIC: u32 = 0x68ff65f3;

/// BoC magic number for indexed format with CRC32C
const BOC_INDEXED_CRC32C_MAGIC: u32 = 0xacc3a728;

#[derive(Debug, Error)]
pub enum BocError {
    #[error("unexpected end of BoC data")]
    UnexpectedEof,
    #[error("invalid BoC magic number: {0:#010x}")]
    InvalidMagic(u32),
    #[error("unsupported BoC feature: {0}")]
    Unsupported(&'static str),
    #[error("malformed BoC: {0}")]
    Malformed(String),
    #[error("CRC32C mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("invalid cell in BoC: {0}")]
    Cell(#[from] CellError),
    #[error("invalid BoC encoding: {0}")]
    Decode(String),
}

pub type BocResult<T> = Result<T, BocError>;

/// Serializes a cell and its references into a Bag of Cells (BoC) format
pub fn serialize_boc(root: &Arc<Cell>, has_crc32: bool) -> BocResult<Vec<u8>> {
    let cells = collect_cells(root);

    let index: HashMap<[u8; 32], usize> = cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| (cell.hash(), idx))
        .collect();

    let size_bytes = bytes_needed(cells.len());

    let mut serialized_cells = Vec::with_capacity(cells.len());
    for cell in &cells {
        serialized_cells.push(serialize_cell(cell, &index, size_bytes)?);
    }

    let cells_size: usize = serialized_cells.iter().map(|c| c.len()).sum();
    let offset_bytes = bytes_needed(cells_size);

    let mut result = Vec::new();
    result.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());

    // has_idx:1 has_crc32c:1 has_cache_bits:1 flags:2 size:3
    let flags = if has_crc32 { 0x40u8 } else { 0x00 };
    result.push(flags | size_bytes as u8);
    result.push(offset_bytes as u8);

    write_uint(&mut result, cells.len(), size_bytes);
    // one root, no absent cells
    write_uint(&mut result, 1, size_bytes);
    write_uint(&mut result, 0, size_bytes);
    write_uint(&mut result, cells_size, offset_bytes);
    write_uint(&mut result, 0, size_bytes);

    for cell_data in serialized_cells {
        result.extend_from_slice(&cell_data);
    }

    if has_crc32 {
        let crc = crate::crc::CRC32C.checksum(&result);
        result.extend_from_slice(&crc.to_le_bytes());
    }

    Ok(result)
}

/// Deserializes a Bag of Cells (BoC) into its root cell
pub fn deserialize_boc(data: &[u8]) -> BocResult<Arc<Cell>> {
    let mut pos = 0;
    let magic = read_uint(data, &mut pos, 4)? as u32;

    match magic {
        BOC_GENERIC_MAGIC => deserialize_boc_generic(data, pos),
        BOC_INDEXED_MAGIC | BOC_INDEXED_CRC32C_MAGIC => {
            Err(BocError::Unsupported("indexed BoC format"))
        }
        _ => Err(BocError::InvalidMagic(magic)),
    }
}

fn deserialize_boc_generic(data: &[u8], mut pos: usize) -> BocResult<Arc<Cell>> {
    let flags_and_size = read_uint(data, &mut pos, 1)? as u8;
    let has_idx = flags_and_size & 0x80 != 0;
    let has_crc32 = flags_and_size & 0x40 != 0;
    let size_bytes = (flags_and_size & 0x07) as usize;

    if size_bytes == 0 || size_bytes > 4 {
        return Err(BocError::Malformed(format!("invalid size_bytes {size_bytes}")));
    }

    let offset_bytes = read_uint(data, &mut pos, 1)?;
    if offset_bytes == 0 || offset_bytes > 8 {
        return Err(BocError::Malformed(format!(
            "invalid offset_bytes {offset_bytes}"
        )));
    }

    let cells_count = read_uint(data, &mut pos, size_bytes)?;
    let roots_count = read_uint(data, &mut pos, size_bytes)?;
    if roots_count != 1 {
        return Err(BocError::Unsupported("multiple roots"));
    }
    let absent_count = read_uint(data, &mut pos, size_bytes)?;
    if absent_count != 0 {
        return Err(BocError::Unsupported("absent cells"));
    }
    let cells_size = read_uint(data, &mut pos, offset_bytes)?;
    let root_idx = read_uint(data, &mut pos, size_bytes)?;

    if has_idx {
        pos += cells_count * offset_bytes;
    }

    let cells_end = pos
        .checked_add(cells_size)
        .ok_or_else(|| BocError::Malformed("cells size overflow".to_string()))?;
    let trailer = if has_crc32 { 4 } else { 0 };
    if cells_end + trailer > data.len() {
        return Err(BocError::UnexpectedEof);
    }

    if has_crc32 {
        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(&data[cells_end..cells_end + 4]);
        let expected = u32::from_le_bytes(crc_bytes);
        let actual = crate::crc::CRC32C.checksum(&data[..cells_end]);
        if expected != actual {
            return Err(BocError::ChecksumMismatch { expected, actual });
        }
    }

    let cells = parse_cells(&data[pos..cells_end], cells_count, size_bytes)?;
    cells
        .get(root_idx)
        .cloned()
        .ok_or_else(|| BocError::Malformed(format!("invalid root index {root_idx}")))
}

struct RawCell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<usize>,
}

fn parse_cells(data: &[u8], count: usize, size_bytes: usize) -> BocResult<Vec<Arc<Cell>>> {
    let mut raw_cells = Vec::with_capacity(count);
    let mut pos = 0;

    for idx in 0..count {
        let d1 = read_uint(data, &mut pos, 1)? as u8;
        let d2 = read_uint(data, &mut pos, 1)? as u8;

        let ref_count = (d1 & 0x07) as usize;
        if d1 & 0x08 != 0 {
            return Err(BocError::Unsupported("exotic cells"));
        }
        if ref_count > MAX_CELL_REFS {
            return Err(BocError::Malformed(format!(
                "cell {idx} has {ref_count} references"
            )));
        }

        let data_size = (d2 as usize).div_ceil(2);
        if pos + data_size > data.len() {
            return Err(BocError::UnexpectedEof);
        }
        let cell_data = data[pos..pos + data_size].to_vec();
        pos += data_size;

        let bit_len = if d2 % 2 == 0 {
            data_size * 8
        } else {
            // the lowest set bit of the last byte is the completion tag
            let last_byte = cell_data[data_size - 1];
            if last_byte == 0 {
                return Err(BocError::Malformed(format!(
                    "cell {idx} has no completion tag"
                )));
            }
            data_size * 8 - last_byte.trailing_zeros() as usize - 1
        };

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let ref_idx = read_uint(data, &mut pos, size_bytes)?;
            if ref_idx <= idx || ref_idx >= count {
                return Err(BocError::Malformed(format!(
                    "cell {idx} has invalid reference {ref_idx}"
                )));
            }
            refs.push(ref_idx);
        }

        raw_cells.push(RawCell {
            data: cell_data,
            bit_len,
            refs,
        });
    }

    // children always follow their parents, so build back to front
    let mut built: Vec<Option<Arc<Cell>>> = vec![None; count];
    for (idx, raw) in raw_cells.into_iter().enumerate().rev() {
        let references = raw
            .refs
            .iter()
            .map(|&r| {
                built[r]
                    .clone()
                    .ok_or_else(|| BocError::Malformed(format!("unresolved reference {r}")))
            })
            .collect::<BocResult<Vec<_>>>()?;
        built[idx] = Some(Arc::new(Cell::new(raw.data, raw.bit_len, references)?));
    }

    Ok(built.into_iter().flatten().collect())
}

fn serialize_cell(
    cell: &Arc<Cell>,
    index: &HashMap<[u8; 32], usize>,
    size_bytes: usize,
) -> BocResult<Vec<u8>> {
    let mut result = Vec::new();
    result.extend_from_slice(&cell.descriptors());
    result.extend_from_slice(&cell.serialize_data());

    for reference in cell.references() {
        let ref_idx = index
            .get(&reference.hash())
            .ok_or_else(|| BocError::Malformed("reference not found in cell index".to_string()))?;
        write_uint(&mut result, *ref_idx, size_bytes);
    }

    Ok(result)
}

/// Unique cells in parents-first order, root at index 0
fn collect_cells(root: &Arc<Cell>) -> Vec<Arc<Cell>> {
    let mut post_order = Vec::new();
    let mut visited = HashMap::new();
    collect_cells_recursive(root, &mut post_order, &mut visited);
    post_order.reverse();
    post_order
}

fn collect_cells_recursive(
    cell: &Arc<Cell>,
    cells: &mut Vec<Arc<Cell>>,
    visited: &mut HashMap<[u8; 32], ()>,
) {
    if visited.contains_key(&cell.hash()) {
        return;
    }
    for reference in cell.references() {
        collect_cells_recursive(reference, cells, visited);
    }
    visited.insert(cell.hash(), ());
    cells.push(cell.clone());
}

fn bytes_needed(value: usize) -> usize {
    let bits = (usize::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

fn write_uint(buf: &mut Vec<u8>, value: usize, size: usize) {
    let bytes = (value as u64).to_be_bytes();
    buf.extend_from_slice(&bytes[8 - size..]);
}

fn read_uint(data: &[u8], pos: &mut usize, size: usize) -> BocResult<usize> {
    if *pos + size > data.len() {
        return Err(BocError::UnexpectedEof);
    }

    let result = data[*pos..*pos + size]
        .iter()
        .fold(0usize, |acc, &byte| (acc << 8) | byte as usize);
    *pos += size;

    Ok(result)
}

/// Converts a hex string to a cell
pub fn hex_to_boc(hex: &str) -> BocResult<Arc<Cell>> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(&hex).map_err(|e| BocError::Decode(e.to_string()))?;
    deserialize_boc(&bytes)
}

/// Converts a cell to a hex BoC string
pub fn boc_to_hex(cell: &Arc<Cell>, has_crc32: bool) -> BocResult<String> {
    Ok(hex::encode(serialize_boc(cell, has_crc32)?))
}

/// Converts a cell to a base64 BoC string
pub fn boc_to_base64(cell: &Arc<Cell>, has_crc32: bool) -> BocResult<String> {
    Ok(STANDARD.encode(serialize_boc(cell, has_crc32)?))
}

/// Converts a base64 BoC string to a cell
pub fn base64_to_boc(b64: &str) -> BocResult<Arc<Cell>> {
    let bytes = STANDARD
        .decode(b64.trim())
        .map_err(|e| BocError::Decode(e.to_string()))?;
    deserialize_boc(&bytes)
}
