//! Cross-module tests for TVM types

use crate::tvm::*;
use std::sync::Arc;

/// Helper function to create a cell with specific data
fn create_test_cell(data: Vec<u8>, bit_len: usize) -> Arc<Cell> {
    Arc::new(Cell::with_data(data, bit_len).unwrap())
}

#[test]
fn test_cell_operations() {
    let cell = create_test_cell(vec![0xFF, 0x00], 16);
    assert_eq!(cell.bit_len(), 16);
    assert_eq!(cell.data(), &[0xFF, 0x00]);
    assert_eq!(cell.hash(), cell.clone().hash());
}

#[test]
fn test_identical_trees_hash_identically() {
    let build = || {
        let mut child = Builder::new();
        child.store_uint(0x2A, 7).unwrap();
        let child = child.build().unwrap();

        let mut root = Builder::new();
        root.store_u32(7).unwrap();
        root.store_ref(child).unwrap();
        root.build().unwrap()
    };
    assert_eq!(build().hash(), build().hash());
}

#[test]
fn test_descendant_change_changes_hash() {
    let with_grandchild = |byte: u8| {
        let grandchild = create_test_cell(vec![byte], 8);
        let mut child = Builder::new();
        child.store_ref(grandchild).unwrap();
        let mut root = Builder::new();
        root.store_ref(child.build().unwrap()).unwrap();
        root.build().unwrap()
    };
    assert_ne!(with_grandchild(1).hash(), with_grandchild(2).hash());
}

#[test]
fn test_ref_count_changes_hash() {
    let leaf = create_test_cell(vec![], 0);

    let mut one = Builder::new();
    one.store_ref(leaf.clone()).unwrap();
    let mut two = Builder::new();
    two.store_ref(leaf.clone()).unwrap();
    two.store_ref(leaf).unwrap();

    assert_ne!(one.build().unwrap().hash(), two.build().unwrap().hash());
}

#[test]
fn test_builder_slice_integration() {
    let addr = Address::new(0, [1u8; 32]);

    let mut builder = Builder::new();
    builder.store_address(Some(&addr)).unwrap();
    builder.store_u32(42).unwrap();
    builder.store_bit(true).unwrap();
    builder.store_bytes(b"Hello").unwrap();
    let cell = builder.build().unwrap();

    assert_eq!(cell.bit_len(), STD_ADDRESS_BITS + 32 + 1 + 40);

    let mut slice = Slice::new(cell);
    assert_eq!(slice.load_address().unwrap(), Some(addr));
    assert_eq!(slice.load_u32().unwrap(), 42);
    assert!(slice.load_bit().unwrap());
    assert_eq!(slice.load_bytes(5).unwrap(), b"Hello".to_vec());
}

#[test]
fn test_boc_roundtrip_with_references() {
    let mut ref_1 = Builder::new();
    ref_1.store_u32(0xAAAAAAAA).unwrap();
    let mut ref_2 = Builder::new();
    ref_2.store_uint(0x5, 3).unwrap();

    let mut root = Builder::new();
    root.store_u64(0xDEADBEEFCAFEBABE).unwrap();
    root.store_ref(ref_1.build().unwrap()).unwrap();
    root.store_ref(ref_2.build().unwrap()).unwrap();
    let root = root.build().unwrap();

    let boc = serialize_boc(&root, true).unwrap();
    let decoded = deserialize_boc(&boc).unwrap();

    assert_eq!(root.hash(), decoded.hash());
    assert_eq!(decoded.reference_count(), 2);
    assert_eq!(decoded.reference(1).unwrap().bit_len(), 3);
}

#[test]
fn test_full_cell_survives_boc() {
    let mut builder = CellBuilder::new();
    for i in 0..MAX_CELL_BITS {
        builder.store_bit(i % 3 == 0).unwrap();
    }
    let cell = builder.build().unwrap();

    let decoded = hex_to_boc(&boc_to_hex(&cell, false).unwrap()).unwrap();
    assert_eq!(decoded.bit_len(), MAX_CELL_BITS);
    assert_eq!(decoded.hash(), cell.hash());
}

#[test]
fn test_errors_classify() {
    assert!(CellError::RefOverflow.is_capacity());
    assert!(!CellError::RefOverflow.is_encoding());
    assert!(CellError::InvalidWidth(65).is_encoding());
    assert!(!CellError::Underflow { requested: 1, remaining: 0 }.is_capacity());
    assert_eq!(
        CellError::ValueOutOfRange { value: 300, bits: 8 }.to_string(),
        "value 300 does not fit in 8 bits"
    );
}
