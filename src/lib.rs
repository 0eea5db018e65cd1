//! Signed transfer bodies and address derivation for the TON single-nominator
//! contract.

pub mod cli;
pub mod client;
pub mod crc;
pub mod tvm;
pub mod utils;
pub mod wallet;
