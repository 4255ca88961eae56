// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! ABI encoding of coerced constructor arguments into deployment calldata.

use super::{coerce::CoercedArgument, num};
use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::{Address, B256},
};
use serde_json::Value;
use sol_deploy_util::text::decode0x;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("compiled ABI is not a valid JSON ABI: {0}")]
    InvalidAbi(String),
    #[error("mismatch number of constructor arguments (want {want}; got {got})")]
    ArgumentCount { want: usize, got: usize },
    #[error("could not resolve constructor arg {param}: {reason}")]
    Resolve { param: String, reason: String },
    #[error("could not encode constructor arg {} ({ty}): {reason}", index + 1)]
    Value {
        index: usize,
        ty: String,
        reason: String,
    },
    #[error("failed to encode constructor arguments: {0}")]
    Abi(String),
}

/// Parses a compiler-produced JSON ABI into alloy's typed representation.
pub fn parse_abi(abi: &Value) -> Result<JsonAbi, EncodeError> {
    serde_json::from_value(abi.clone()).map_err(|e| EncodeError::InvalidAbi(e.to_string()))
}

/// Encodes `args` against the constructor declared in `abi`.
///
/// Fails closed: absent slots, unparsed literals and out-of-range values are all errors.
pub fn encode_constructor_args(
    abi: &JsonAbi,
    args: &[CoercedArgument],
) -> Result<Vec<u8>, EncodeError> {
    let Some(constructor) = &abi.constructor else {
        if !args.is_empty() {
            return Err(EncodeError::ArgumentCount {
                want: 0,
                got: args.len(),
            });
        }
        return Ok(vec![]);
    };

    let params = &constructor.inputs;
    if params.len() != args.len() {
        return Err(EncodeError::ArgumentCount {
            want: params.len(),
            got: args.len(),
        });
    }

    let mut values = Vec::with_capacity(args.len());
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        let ty = param.resolve().map_err(|e| EncodeError::Resolve {
            param: param.to_string(),
            reason: e.to_string(),
        })?;
        let value =
            to_sol_value(&ty, &param.components, arg).map_err(|reason| EncodeError::Value {
                index,
                ty: param.ty.clone(),
                reason,
            })?;
        values.push(value);
    }
    constructor
        .abi_encode_input(&values)
        .map_err(|e| EncodeError::Abi(e.to_string()))
}

/// Builds the init code for a creation transaction: the bytecode followed by the encoded args.
pub fn deployment_calldata(
    abi: &JsonAbi,
    bytecode: &[u8],
    args: &[CoercedArgument],
) -> Result<Vec<u8>, EncodeError> {
    let mut calldata = bytecode.to_vec();
    calldata.extend(encode_constructor_args(abi, args)?);
    Ok(calldata)
}

fn to_sol_value(
    ty: &DynSolType,
    components: &[Param],
    arg: &CoercedArgument,
) -> Result<DynSolValue, String> {
    match (ty, arg) {
        (_, CoercedArgument::Absent) => Err("no value supplied".into()),
        (_, CoercedArgument::Unparsed(raw)) => Err(format!("{raw:?} is not a well-formed literal")),
        (DynSolType::Uint(bits), CoercedArgument::Uint(value)) => {
            if !num::uint_fits(*value, *bits) {
                return Err(format!("{value} does not fit in uint{bits}"));
            }
            Ok(DynSolValue::Uint(*value, *bits))
        }
        (DynSolType::Int(bits), CoercedArgument::Int(value)) => {
            let (sign, abs) = value.into_sign_and_abs();
            if !num::int_fits(sign, abs, *bits) {
                return Err(format!("{value} does not fit in int{bits}"));
            }
            Ok(DynSolValue::Int(*value, *bits))
        }
        (DynSolType::Bool, CoercedArgument::Bool(value)) => Ok(DynSolValue::Bool(*value)),
        (_, CoercedArgument::Text(text)) => from_text(ty, text),
        (_, CoercedArgument::Json(value)) => from_json(ty, components, value),
        (DynSolType::Array(inner), CoercedArgument::Array(items)) => items
            .iter()
            .map(|item| to_sol_value(inner, components, item))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, len), CoercedArgument::Array(items)) => {
            if items.len() != *len {
                return Err(format!("expected {len} elements, got {}", items.len()));
            }
            items
                .iter()
                .map(|item| to_sol_value(inner, components, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        (ty, arg) => Err(format!(
            "expected {}, got {}",
            ty.sol_type_name(),
            arg.kind()
        )),
    }
}

fn from_text(ty: &DynSolType, text: &str) -> Result<DynSolValue, String> {
    match ty {
        DynSolType::String => Ok(DynSolValue::String(text.to_owned())),
        DynSolType::Address => text
            .parse::<Address>()
            .map(DynSolValue::Address)
            .map_err(|e| format!("invalid address {text:?}: {e}")),
        DynSolType::Bytes => decode0x(text)
            .map(DynSolValue::Bytes)
            .map_err(|e| format!("invalid hex {text:?}: {e}")),
        DynSolType::FixedBytes(len) => {
            let bytes = decode0x(text).map_err(|e| format!("invalid hex {text:?}: {e}"))?;
            if bytes.len() != *len {
                return Err(format!("expected {len} bytes, got {}", bytes.len()));
            }
            Ok(DynSolValue::FixedBytes(B256::right_padding_from(&bytes), *len))
        }
        _ => ty.coerce_str(text).map_err(|e| e.to_string()),
    }
}

fn from_json(ty: &DynSolType, components: &[Param], value: &Value) -> Result<DynSolValue, String> {
    let elements = |inner: &DynSolType, items: &[Value]| {
        items
            .iter()
            .map(|item| from_json(inner, components, item))
            .collect::<Result<Vec<_>, _>>()
    };

    match (ty, value) {
        (_, Value::String(text)) => from_text(ty, text),
        (DynSolType::Bool, Value::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (DynSolType::Uint(bits), Value::Number(n)) => num::parse_uint(&n.to_string(), *bits)
            .map(|v| DynSolValue::Uint(v, *bits))
            .map_err(|e| format!("{n}: {e}")),
        (DynSolType::Int(bits), Value::Number(n)) => num::parse_int(&n.to_string(), *bits)
            .map(|v| DynSolValue::Int(v, *bits))
            .map_err(|e| format!("{n}: {e}")),
        (DynSolType::Array(inner), Value::Array(items)) => {
            elements(inner, items).map(DynSolValue::Array)
        }
        (DynSolType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(format!("expected {len} elements, got {}", items.len()));
            }
            elements(inner, items).map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                return Err(format!(
                    "expected {} tuple fields, got {}",
                    types.len(),
                    items.len()
                ));
            }
            types
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (ty, item))| {
                    let nested = components.get(i).map(|c| c.components.as_slice());
                    from_json(ty, nested.unwrap_or_default(), item)
                })
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        (DynSolType::Tuple(types), Value::Object(fields)) => {
            if components.len() != types.len() {
                return Err("tuple fields are unnamed; pass them as an array instead".into());
            }
            types
                .iter()
                .zip(components)
                .map(|(ty, component)| {
                    let item = fields
                        .get(&component.name)
                        .ok_or_else(|| format!("missing tuple field {:?}", component.name))?;
                    from_json(ty, &component.components, item)
                })
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        _ => Err(format!("cannot use {value} as {}", ty.sol_type_name())),
    }
}
