// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! Conversion of validated argument text into typed values.

use super::{
    num::{self, IntError},
    schema::ConstructorSchema,
    types::AbiType,
};
use alloy::primitives::{I256, U256};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A constructor argument converted to its native representation.
#[derive(Clone, Debug, PartialEq)]
pub enum CoercedArgument {
    Uint(U256),
    Int(I256),
    Bool(bool),
    /// Addresses, strings and byte strings. Binary encoding happens at deploy time.
    Text(String),
    /// A structured value passed through untouched, such as a tuple literal.
    Json(Value),
    Array(Vec<CoercedArgument>),
    /// An array or tuple literal that could not be parsed, kept as the raw text.
    Unparsed(String),
    /// No value was supplied for this slot.
    Absent,
}

impl CoercedArgument {
    /// Whether this value, and everything nested in it, can be handed to a deployment.
    pub fn is_structurally_sound(&self) -> bool {
        match self {
            Self::Unparsed(_) | Self::Absent => false,
            Self::Array(items) => items.iter().all(Self::is_structurally_sound),
            _ => true,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Uint(_) => "unsigned integer",
            Self::Int(_) => "signed integer",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "text",
            Self::Json(_) => "structured value",
            Self::Array(_) => "array",
            Self::Unparsed(_) => "unparsed literal",
            Self::Absent => "missing value",
        }
    }
}

impl fmt::Display for CoercedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Json(value) => write!(f, "{value}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Unparsed(raw) => write!(f, "<unparsed {raw:?}>"),
            Self::Absent => f.write_str("<absent>"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("argument {} ({ty}): {value:?} is not a valid integer: {reason}", index + 1)]
    Integer {
        index: usize,
        ty: String,
        value: String,
        reason: IntError,
    },
    #[error("argument {} ({ty}) is missing", index + 1)]
    Missing { index: usize, ty: String },
    #[error("argument {} ({ty}) is not a well-formed literal: {value}", index + 1)]
    Unparsed {
        index: usize,
        ty: String,
        value: String,
    },
}

impl CoerceError {
    /// Position of the offending argument.
    pub fn index(&self) -> usize {
        match self {
            Self::Integer { index, .. } | Self::Missing { index, .. } | Self::Unparsed { index, .. } => {
                *index
            }
        }
    }
}

/// Converts each value according to the matching schema parameter.
///
/// Integer slots fail the whole conversion when they do not parse. Array and tuple slots whose
/// literal does not parse come back as [`CoercedArgument::Unparsed`]; use [`coerce_strict`] to
/// reject those before deploying.
pub fn coerce(
    schema: &ConstructorSchema,
    values: &[String],
) -> Result<Vec<CoercedArgument>, CoerceError> {
    schema
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let value = match values.get(index) {
                Some(value) if !value.is_empty() => value,
                _ => return Ok(CoercedArgument::Absent),
            };
            coerce_value(&param.abi_type(), value).map_err(|reason| CoerceError::Integer {
                index,
                ty: param.ty.clone(),
                value: value.clone(),
                reason,
            })
        })
        .collect()
}

/// Like [`coerce`], but any absent slot or unparsed structured literal is an error.
pub fn coerce_strict(
    schema: &ConstructorSchema,
    values: &[String],
) -> Result<Vec<CoercedArgument>, CoerceError> {
    let args = coerce(schema, values)?;
    for (index, (param, arg)) in schema.iter().zip(&args).enumerate() {
        if arg.is_structurally_sound() {
            continue;
        }
        let ty = param.ty.clone();
        return Err(match arg {
            CoercedArgument::Absent => CoerceError::Missing { index, ty },
            _ => CoerceError::Unparsed {
                index,
                ty,
                value: values.get(index).cloned().unwrap_or_default(),
            },
        });
    }
    Ok(args)
}

/// Converts a single value of type `ty`.
pub fn coerce_value(ty: &AbiType, text: &str) -> Result<CoercedArgument, IntError> {
    Ok(match ty {
        AbiType::Uint(bits) => CoercedArgument::Uint(num::parse_uint(text, *bits)?),
        AbiType::Int(bits) => CoercedArgument::Int(num::parse_int(text, *bits)?),
        AbiType::Bool => CoercedArgument::Bool(text.eq_ignore_ascii_case("true")),
        AbiType::Array(element, _) => match serde_json::from_str(text) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .map(|item| coerce_element(element, item))
                .collect::<Option<Vec<_>>>()
                .map(CoercedArgument::Array)
                .unwrap_or_else(|| CoercedArgument::Unparsed(text.to_owned())),
            _ => CoercedArgument::Unparsed(text.to_owned()),
        },
        AbiType::Tuple => match serde_json::from_str(text) {
            Ok(value) => CoercedArgument::Json(value),
            Err(_) => CoercedArgument::Unparsed(text.to_owned()),
        },
        AbiType::Address
        | AbiType::String
        | AbiType::Bytes
        | AbiType::FixedBytes(_)
        | AbiType::Unknown(_) => CoercedArgument::Text(text.to_owned()),
    })
}

/// Converts one element of a parsed array literal.
fn coerce_element(ty: &AbiType, item: Value) -> Option<CoercedArgument> {
    let number_text = |item: &Value| match item {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    };

    match ty {
        AbiType::Uint(bits) => {
            let text = number_text(&item)?;
            num::parse_uint(&text, *bits).ok().map(CoercedArgument::Uint)
        }
        AbiType::Int(bits) => {
            let text = number_text(&item)?;
            num::parse_int(&text, *bits).ok().map(CoercedArgument::Int)
        }
        AbiType::Bool => match item {
            Value::Bool(value) => Some(CoercedArgument::Bool(value)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(CoercedArgument::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => {
                Some(CoercedArgument::Bool(false))
            }
            _ => None,
        },
        AbiType::Array(element, _) => match item {
            Value::Array(items) => items
                .into_iter()
                .map(|item| coerce_element(element, item))
                .collect::<Option<Vec<_>>>()
                .map(CoercedArgument::Array),
            _ => None,
        },
        _ => Some(match item {
            Value::String(s) => CoercedArgument::Text(s),
            other => CoercedArgument::Json(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::schema::AbiParameter;
    use serde_json::json;

    fn schema(params: &[(&str, &str)]) -> ConstructorSchema {
        ConstructorSchema::new(
            params
                .iter()
                .map(|(name, ty)| AbiParameter::new(*name, *ty))
                .collect(),
        )
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn owner_and_supply() {
        let schema = schema(&[("owner", "address"), ("supply", "uint256")]);
        let values = strings(&["0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb", "1000000"]);
        let args = coerce(&schema, &values).unwrap();
        assert_eq!(
            args,
            vec![
                CoercedArgument::Text("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb".into()),
                CoercedArgument::Uint(U256::from(1_000_000u64)),
            ]
        );
    }

    #[test]
    fn scalars() {
        let schema = schema(&[
            ("a", "int64"),
            ("b", "bool"),
            ("c", "bool"),
            ("d", "string"),
            ("e", "bytes4"),
            ("f", "bytes"),
            ("g", "function"),
        ]);
        let values = strings(&["-42", "TRUE", "nope", "hi there", "0x01020304", "0x", "f()"]);
        let args = coerce(&schema, &values).unwrap();
        assert_eq!(
            args,
            vec![
                CoercedArgument::Int(I256::try_from(-42i64).unwrap()),
                CoercedArgument::Bool(true),
                CoercedArgument::Bool(false),
                CoercedArgument::Text("hi there".into()),
                CoercedArgument::Text("0x01020304".into()),
                CoercedArgument::Text("0x".into()),
                CoercedArgument::Text("f()".into()),
            ]
        );
    }

    #[test]
    fn bad_integer_fails_everything() {
        let schema = schema(&[("name", "string"), ("supply", "uint256")]);
        let err = coerce(&schema, &strings(&["Token", "12abc"])).unwrap_err();
        assert_eq!(
            err,
            CoerceError::Integer {
                index: 1,
                ty: "uint256".into(),
                value: "12abc".into(),
                reason: IntError::Format,
            }
        );
        assert!(err.to_string().starts_with("argument 2 (uint256)"));

        let schema = self::schema(&[("x", "int8")]);
        assert!(coerce(&schema, &strings(&["-1000"])).is_err());
    }

    #[test]
    fn missing_values_are_absent() {
        let schema = schema(&[("a", "uint8"), ("b", "string"), ("c", "bool")]);
        let args = coerce(&schema, &strings(&["7", ""])).unwrap();
        assert_eq!(
            args,
            vec![
                CoercedArgument::Uint(U256::from(7)),
                CoercedArgument::Absent,
                CoercedArgument::Absent,
            ]
        );
        assert_eq!(
            coerce_strict(&schema, &strings(&["7", ""])).unwrap_err(),
            CoerceError::Missing {
                index: 1,
                ty: "string".into()
            }
        );
    }

    #[test]
    fn integer_arrays() {
        let ty = AbiType::parse("uint256[]");
        assert_eq!(
            coerce_value(&ty, r#"[1, "2", 300]"#).unwrap(),
            CoercedArgument::Array(vec![
                CoercedArgument::Uint(U256::from(1)),
                CoercedArgument::Uint(U256::from(2)),
                CoercedArgument::Uint(U256::from(300)),
            ])
        );
        let ty = AbiType::parse("int8[2]");
        assert_eq!(
            coerce_value(&ty, "[-1, 1]").unwrap(),
            CoercedArgument::Array(vec![
                CoercedArgument::Int(I256::MINUS_ONE),
                CoercedArgument::Int(I256::ONE),
            ])
        );
    }

    #[test]
    fn wide_array_elements_keep_their_digits() {
        let ty = AbiType::parse("uint256[]");
        let wei = U256::from(10u64).pow(U256::from(21));
        assert_eq!(
            coerce_value(&ty, "[1000000000000000000000, 1]").unwrap(),
            CoercedArgument::Array(vec![
                CoercedArgument::Uint(wei),
                CoercedArgument::Uint(U256::ONE),
            ])
        );

        let schema = schema(&[("amounts", "uint256[]")]);
        let values = strings(&["[1000000000000000000000]"]);
        assert_eq!(
            coerce_strict(&schema, &values).unwrap(),
            vec![CoercedArgument::Array(vec![CoercedArgument::Uint(wei)])]
        );
    }

    #[test]
    fn bool_arrays() {
        let ty = AbiType::parse("bool[]");
        assert_eq!(
            coerce_value(&ty, r#"[true, "FALSE", "true"]"#).unwrap(),
            CoercedArgument::Array(vec![
                CoercedArgument::Bool(true),
                CoercedArgument::Bool(false),
                CoercedArgument::Bool(true),
            ])
        );
        assert_eq!(
            coerce_value(&ty, "[1]").unwrap(),
            CoercedArgument::Unparsed("[1]".into())
        );
    }

    #[test]
    fn passthrough_arrays() {
        let ty = AbiType::parse("address[]");
        assert_eq!(
            coerce_value(&ty, r#"["0xabc", 5]"#).unwrap(),
            CoercedArgument::Array(vec![
                CoercedArgument::Text("0xabc".into()),
                CoercedArgument::Json(json!(5)),
            ])
        );
    }

    #[test]
    fn nested_arrays() {
        let ty = AbiType::parse("uint8[][]");
        assert_eq!(
            coerce_value(&ty, "[[1, 2], []]").unwrap(),
            CoercedArgument::Array(vec![
                CoercedArgument::Array(vec![
                    CoercedArgument::Uint(U256::from(1)),
                    CoercedArgument::Uint(U256::from(2)),
                ]),
                CoercedArgument::Array(vec![]),
            ])
        );
        assert!(matches!(
            coerce_value(&ty, "[1, 2]").unwrap(),
            CoercedArgument::Unparsed(_)
        ));
    }

    #[test]
    fn malformed_structures_are_unparsed() {
        let test_cases = vec![
            ("uint8[]", "[1,2,"),
            ("uint8[]", r#"{"a": 1}"#),
            ("uint8[]", "[1.5]"),
            ("uint8[]", "[256]"),
            ("tuple", "(1, 2)"),
        ];
        for (ty, text) in test_cases {
            assert_eq!(
                coerce_value(&AbiType::parse(ty), text).unwrap(),
                CoercedArgument::Unparsed(text.into()),
                "{ty} {text}"
            );
        }
    }

    #[test]
    fn strict_rejects_unparsed() {
        let schema = schema(&[("ids", "uint8[]"), ("cfg", "tuple")]);
        let values = strings(&["[1, 2", r#"[1, "x"]"#]);
        assert!(matches!(
            coerce(&schema, &values).unwrap()[0],
            CoercedArgument::Unparsed(_)
        ));
        assert_eq!(
            coerce_strict(&schema, &values).unwrap_err(),
            CoerceError::Unparsed {
                index: 0,
                ty: "uint8[]".into(),
                value: "[1, 2".into(),
            }
        );

        let values = strings(&["[1, 2]", r#"[1, "x"]"#]);
        let args = coerce_strict(&schema, &values).unwrap();
        assert_eq!(args[1], CoercedArgument::Json(json!([1, "x"])));
    }

    #[test]
    fn display() {
        let arg = CoercedArgument::Array(vec![
            CoercedArgument::Uint(U256::from(1)),
            CoercedArgument::Text("a".into()),
        ]);
        assert_eq!(arg.to_string(), r#"[1, "a"]"#);
    }
}
