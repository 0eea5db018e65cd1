//! Get-method results
//!
//! Stack entries use the `[type, value]` pair format of the toncenter API,
//! e.g. `["num", "0x2a"]`. Numbers are decoded explicitly instead of being
//! coerced from whatever string the provider returned.

use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
    #[error("get-method returned an empty stack")]
    Empty,
    #[error("get-method failed with exit code {0}")]
    ExitCode(i32),
    #[error("expected a {expected:?} entry, got {actual:?}")]
    UnexpectedType {
        expected: StackItemType,
        actual: StackItemType,
    },
    #[error("malformed integer: {0}")]
    MalformedInteger(String),
    #[error("integer {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackItemType {
    Num,
    Cell,
    Slice,
    Tuple,
    List,
    #[serde(other)]
    Unknown,
}

/// One stack entry: its type tag and the raw value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry(pub StackItemType, pub Value);

impl StackEntry {
    pub fn num(value: impl Into<BigInt>) -> Self {
        let value: BigInt = value.into();
        let hex = match value.sign() {
            Sign::Minus => format!("-0x{}", (-value).to_str_radix(16)),
            _ => format!("0x{}", value.to_str_radix(16)),
        };
        StackEntry(StackItemType::Num, Value::String(hex))
    }

    pub fn item_type(&self) -> StackItemType {
        self.0
    }

    /// Decodes a `num` entry; hex (`0x..`) and decimal strings are accepted
    pub fn as_int(&self) -> Result<BigInt, StackError> {
        if self.0 != StackItemType::Num {
            return Err(StackError::UnexpectedType {
                expected: StackItemType::Num,
                actual: self.0,
            });
        }

        match &self.1 {
            Value::String(s) => parse_int(s),
            Value::Number(n) => parse_int(&n.to_string()),
            other => Err(StackError::MalformedInteger(other.to_string())),
        }
    }

    pub fn as_u32(&self) -> Result<u32, StackError> {
        let value = self.as_int()?;
        u32::try_from(&value).map_err(|_| StackError::OutOfRange {
            value: value.to_string(),
            target: "u32",
        })
    }
}

fn parse_int(raw: &str) -> Result<BigInt, StackError> {
    let malformed = || StackError::MalformedInteger(raw.to_string());

    let s = raw.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if digits.is_empty() {
        return Err(malformed());
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(malformed)?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Outcome of a get-method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetMethodResult {
    pub exit_code: i32,
    pub stack: Vec<StackEntry>,
}

impl GetMethodResult {
    /// TVM exit codes 0 and 1 mean success
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 || self.exit_code == 1
    }
}
