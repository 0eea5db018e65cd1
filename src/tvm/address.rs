//! TON internal address
//!
//! An address is a workchain id plus the 256-bit hash of the account's initial
//! state. Textual forms are provided for the command line only.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crc::CRC16;

/// Masterchain workchain id
pub const MASTERCHAIN: i8 = -1;

/// Basechain workchain id
pub const BASECHAIN: i8 = 0;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid raw address format: {0}")]
    InvalidRaw(String),
    #[error("invalid user-friendly address length: {0}")]
    InvalidLength(usize),
    #[error("invalid address tag: {0:#04x}")]
    InvalidTag(u8),
    #[error("address checksum mismatch")]
    InvalidChecksum,
    #[error("invalid address encoding: {0}")]
    Decode(String),
}

/// Represents a TON blockchain address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Workchain ID (-1 for masterchain, 0 for basechain)
    pub workchain: i8,
    /// 32-byte hash part of the address
    pub hash_part: [u8; 32],
}

impl Address {
    /// Creates a new address from workchain and hash part
    pub fn new(workchain: i8, hash_part: [u8; 32]) -> Self {
        Self {
            workchain,
            hash_part,
        }
    }

    /// Parses address from raw format: "workchain:hash"
    pub fn from_hex(address: &str) -> Result<Self, AddressError> {
        let (workchain, hash_hex) = address
            .split_once(':')
            .ok_or_else(|| AddressError::InvalidRaw(address.to_string()))?;

        let workchain = workchain
            .parse::<i8>()
            .map_err(|e| AddressError::InvalidRaw(e.to_string()))?;

        if hash_hex.len() != 64 {
            return Err(AddressError::InvalidRaw(
                "hash part must be 64 hex characters".to_string(),
            ));
        }

        let mut hash_part = [0u8; 32];
        hex::decode_to_slice(hash_hex, &mut hash_part)
            .map_err(|e| AddressError::Decode(e.to_string()))?;

        Ok(Self::new(workchain, hash_part))
    }

    /// Parses address from the base64 user-friendly format
    pub fn from_base64(address: &str) -> Result<Self, AddressError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(address)
            .or_else(|_| STANDARD.decode(address))
            .map_err(|e| AddressError::Decode(e.to_string()))?;

        if decoded.len() != 36 {
            return Err(AddressError::InvalidLength(decoded.len()));
        }

        let tag = decoded[0] & !TAG_TEST_ONLY;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(AddressError::InvalidTag(decoded[0]));
        }

        if CRC16.checksum(&decoded[..34]).to_be_bytes() != decoded[34..36] {
            return Err(AddressError::InvalidChecksum);
        }

        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&decoded[2..34]);

        Ok(Self::new(decoded[1] as i8, hash_part))
    }

    /// Converts to raw format (workchain:hash)
    pub fn to_hex(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash_part))
    }

    /// Converts to the user-friendly base64 format
    pub fn to_friendly(&self, bounceable: bool, test_only: bool, url_safe: bool) -> String {
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if test_only {
            tag |= TAG_TEST_ONLY;
        }

        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(self.workchain as u8);
        data.extend_from_slice(&self.hash_part);
        let crc = CRC16.checksum(&data);
        data.extend_from_slice(&crc.to_be_bytes());

        if url_safe {
            URL_SAFE_NO_PAD.encode(&data)
        } else {
            STANDARD.encode(&data)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_friendly(true, false, true))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            Self::from_hex(s)
        } else {
            Self::from_base64(s)
        }
    }
}
