// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! Typed handling of constructor arguments: schema extraction, validation, coercion and encoding.

pub mod coerce;
pub mod encode;
pub mod num;
pub mod schema;
pub mod types;
pub mod validate;

pub use coerce::{coerce_strict, CoerceError, CoercedArgument};
pub use encode::{deployment_calldata, encode_constructor_args, parse_abi};
pub use schema::{has_constructor, AbiParameter, ConstructorSchema};
pub use types::AbiType;
pub use validate::{validate, validate_as, Validation};
