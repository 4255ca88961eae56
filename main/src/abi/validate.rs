// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! Per-field well-formedness checks for constructor argument text.
//!
//! Validation is fail-open: types the grammar does not know are accepted as-is, so unusual but
//! legitimate ABIs are never blocked here. Coercion is where malformed values are refused.

use super::{
    num::{self, IntError},
    types::AbiType,
};
use serde_json::Value;
use sol_deploy_util::text::hex_digits;

pub const REQUIRED: &str = "This field is required";

/// The outcome of checking one value against its declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// Checks `text` against the type descriptor `ty`.
///
/// Stricter than a digits-only check on purpose: integers must also fit their declared
/// width, so `uint8` rejects `256`. Anything accepted here also encodes.
pub fn validate(ty: &str, text: &str) -> Validation {
    validate_as(&AbiType::parse(ty), text)
}

/// Checks `text` against an already parsed type.
pub fn validate_as(ty: &AbiType, text: &str) -> Validation {
    if text.trim().is_empty() {
        return Validation::invalid(REQUIRED);
    }

    match ty {
        AbiType::Address => match hex_digits(text) {
            Some(digits) if digits.len() == 40 => Validation::Valid,
            _ => Validation::invalid(
                "Invalid address format. Must be a valid Ethereum address (0x...)",
            ),
        },
        AbiType::Uint(bits) => match num::parse_uint(text, *bits) {
            Ok(_) => Validation::Valid,
            Err(IntError::Negative) => Validation::invalid("Unsigned integers must be positive"),
            Err(IntError::Format) => Validation::invalid("Must be a positive number (no decimals)"),
            Err(IntError::TooLarge) => Validation::invalid("Number is too large or invalid"),
            Err(IntError::Width(bits)) => {
                Validation::invalid(format!("Number is too large for uint{bits}"))
            }
        },
        AbiType::Int(bits) => match num::parse_int(text, *bits) {
            Ok(_) => Validation::Valid,
            Err(IntError::Width(bits)) => {
                Validation::invalid(format!("Number is out of range for int{bits}"))
            }
            Err(IntError::TooLarge) => Validation::invalid("Number is too large or invalid"),
            Err(_) => Validation::invalid("Must be a valid integer (no decimals)"),
        },
        AbiType::Bool => match text.to_lowercase().as_str() {
            "true" | "false" => Validation::Valid,
            _ => Validation::invalid(r#"Must be either "true" or "false""#),
        },
        AbiType::FixedBytes(len) => match hex_digits(text) {
            None => Validation::invalid("Must be a valid hex string starting with 0x"),
            Some(digits) if digits.len() != len * 2 => Validation::invalid(format!(
                "Must be exactly {len} bytes ({} hex characters after 0x)",
                len * 2
            )),
            Some(_) => Validation::Valid,
        },
        AbiType::Array(..) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(_)) => Validation::Valid,
            Ok(_) => Validation::invalid("Must be a valid array"),
            Err(_) => Validation::invalid(
                r#"Must be a valid JSON array (e.g., ["item1", "item2"] or [1, 2, 3])"#,
            ),
        },
        AbiType::String | AbiType::Bytes | AbiType::Tuple | AbiType::Unknown(_) => {
            Validation::Valid
        }
    }
}
