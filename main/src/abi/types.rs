// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! The Solidity type-descriptor grammar used by ABI parameters.
//!
//! A descriptor string is parsed once into an [`AbiType`], and every later decision
//! (validation, coercion, prompting) matches on that instead of re-inspecting the string.

use std::fmt;

/// A parsed ABI type descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Bool,
    String,
    /// `uint<bits>`; a bare `uint` is 256 bits.
    Uint(usize),
    /// `int<bits>`; a bare `int` is 256 bits.
    Int(usize),
    /// `bytes<len>` with `1 <= len <= 32`.
    FixedBytes(usize),
    Bytes,
    /// `T[]` when the length is `None`, `T[k]` otherwise.
    Array(Box<AbiType>, Option<usize>),
    Tuple,
    /// Anything outside the grammar. Kept verbatim and treated as opaque text.
    Unknown(String),
}

impl AbiType {
    /// Parses a type descriptor. Never fails: unrecognized forms become [`AbiType::Unknown`].
    pub fn parse(descriptor: &str) -> Self {
        let descriptor = descriptor.trim();
        if descriptor.contains('[') && descriptor.contains(']') {
            return Self::parse_array(descriptor);
        }
        match descriptor {
            "address" => Self::Address,
            "bool" => Self::Bool,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "tuple" => Self::Tuple,
            _ => Self::parse_sized(descriptor)
                .unwrap_or_else(|| Self::Unknown(descriptor.to_owned())),
        }
    }

    fn parse_array(descriptor: &str) -> Self {
        let opaque = || Self::Array(Box::new(Self::Unknown(descriptor.to_owned())), None);

        let Some((base, len)) = descriptor
            .strip_suffix(']')
            .and_then(|rest| rest.rsplit_once('['))
        else {
            return opaque();
        };
        let len = match len {
            "" => None,
            len => match len.parse::<usize>() {
                Ok(len) if len > 0 => Some(len),
                _ => return opaque(),
            },
        };
        if base.is_empty() {
            return opaque();
        }
        Self::Array(Box::new(Self::parse(base)), len)
    }

    fn parse_sized(descriptor: &str) -> Option<Self> {
        // `internal...` and friends fall out here since the suffix must be numeric.
        fn width(suffix: &str, default: usize) -> Option<usize> {
            if suffix.is_empty() {
                return Some(default);
            }
            if !suffix.bytes().all(|b| b.is_ascii_digit()) || suffix.starts_with('0') {
                return None;
            }
            suffix.parse().ok()
        }

        if let Some(suffix) = descriptor.strip_prefix("uint") {
            let bits = width(suffix, 256)?;
            return valid_int_width(bits).then_some(Self::Uint(bits));
        }
        if let Some(suffix) = descriptor.strip_prefix("int") {
            let bits = width(suffix, 256)?;
            return valid_int_width(bits).then_some(Self::Int(bits));
        }
        if let Some(suffix) = descriptor.strip_prefix("bytes") {
            let len = width(suffix, 0)?;
            return (1..=32).contains(&len).then_some(Self::FixedBytes(len));
        }
        None
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Uint(_) | Self::Int(_))
    }

    /// The element type of an array, i.e. the descriptor with its trailing `[...]` removed.
    pub fn element(&self) -> Option<&AbiType> {
        match self {
            Self::Array(inner, _) => Some(inner),
            _ => None,
        }
    }

    /// A short human-readable name for the type.
    pub fn describe(&self) -> String {
        match self {
            Self::Address => "Ethereum address".into(),
            Self::Bool => "Boolean (true/false)".into(),
            Self::String => "Text string".into(),
            Self::Uint(_) => "Unsigned integer".into(),
            Self::Int(_) => "Signed integer".into(),
            Self::FixedBytes(_) | Self::Bytes => "Byte array".into(),
            Self::Array(inner, _) => format!("Array of {}", inner.describe().to_lowercase()),
            Self::Tuple => "Struct/Tuple".into(),
            Self::Unknown(ty) => ty.clone(),
        }
    }

    /// An example value shown next to an empty input.
    pub fn placeholder(&self) -> String {
        match self {
            Self::Address => "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0".into(),
            Self::Bool => "true or false".into(),
            Self::String => "My Token".into(),
            Self::Uint(8) => "18".into(),
            Self::Uint(_) => "1000000".into(),
            Self::Int(_) => "-1000 or 1000".into(),
            Self::FixedBytes(len) => format!("0x{}", "ab".repeat(*len)),
            Self::Bytes => "0x1234".into(),
            Self::Array(..) => r#"["item1", "item2"]"#.into(),
            Self::Tuple => r#"["field1", 2]"#.into(),
            Self::Unknown(ty) => format!("Enter {ty} value"),
        }
    }

    /// A sentence explaining what input the type accepts.
    pub fn help_text(&self) -> String {
        match self {
            Self::Address => "A valid Ethereum address (42 characters starting with 0x)".into(),
            Self::Bool => "Boolean value: true or false".into(),
            Self::String => "Any text value (without quotes)".into(),
            Self::Uint(8) => {
                "Unsigned 8-bit integer (0 to 255, commonly used for decimals)".into()
            }
            Self::Uint(bits) => {
                format!("Unsigned {bits}-bit integer (positive numbers only, no decimals)")
            }
            Self::Int(bits) => {
                format!("Signed {bits}-bit integer (positive or negative whole numbers)")
            }
            Self::FixedBytes(len) => {
                format!("Fixed-size byte array ({len} bytes in hex format starting with 0x)")
            }
            Self::Bytes => "Dynamic byte array in hex format starting with 0x".into(),
            Self::Array(inner, Some(len)) => {
                format!("Array of exactly {len} {inner} values in JSON format (e.g., [value1, value2])")
            }
            Self::Array(inner, None) => {
                format!("Array of {inner} values in JSON format (e.g., [value1, value2])")
            }
            Self::Tuple => "Struct fields as a JSON array in declaration order".into(),
            Self::Unknown(ty) => format!("Enter a valid {ty} value"),
        }
    }
}

fn valid_int_width(bits: usize) -> bool {
    (8..=256).contains(&bits) && bits % 8 == 0
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Bytes => f.write_str("bytes"),
            Self::Array(inner, Some(len)) => write!(f, "{inner}[{len}]"),
            Self::Array(inner, None) => write!(f, "{inner}[]"),
            Self::Tuple => f.write_str("tuple"),
            Self::Unknown(ty) => f.write_str(ty),
        }
    }
}

impl From<&str> for AbiType {
    fn from(descriptor: &str) -> Self {
        Self::parse(descriptor)
    }
}
