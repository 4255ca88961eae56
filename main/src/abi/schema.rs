// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use super::types::AbiType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One constructor input as declared in a JSON ABI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl AbiParameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// The name shown to users, falling back to the parameter's position.
    pub fn label(&self, index: usize) -> String {
        match self.name.is_empty() {
            true => format!("Argument {}", index + 1),
            false => self.name.clone(),
        }
    }

    pub fn abi_type(&self) -> AbiType {
        AbiType::parse(&self.ty)
    }
}

/// The ordered inputs of a contract's constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructorSchema {
    params: Vec<AbiParameter>,
}

impl ConstructorSchema {
    pub fn new(params: Vec<AbiParameter>) -> Self {
        Self { params }
    }

    /// Extracts the constructor inputs from a JSON ABI.
    ///
    /// The whole ABI is scanned since entries come in no particular order. Anything that is not
    /// an array of entries, or a constructor without an `inputs` array, yields an empty schema.
    pub fn from_abi(abi: &Value) -> Self {
        let Some(entries) = abi.as_array() else {
            return Self::default();
        };
        let Some(constructor) = entries.iter().find(|entry| is_constructor(entry)) else {
            return Self::default();
        };
        let Some(inputs) = constructor.get("inputs").and_then(Value::as_array) else {
            return Self::default();
        };

        let field = |input: &Value, key: &str| {
            input
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let params = inputs
            .iter()
            .map(|input| AbiParameter::new(field(input, "name"), field(input, "type")))
            .collect();
        Self { params }
    }

    /// Like [`ConstructorSchema::from_abi`], but starting from JSON text.
    pub fn from_abi_str(abi: &str) -> Self {
        serde_json::from_str(abi)
            .map(|abi: Value| Self::from_abi(&abi))
            .unwrap_or_default()
    }

    pub fn params(&self) -> &[AbiParameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbiParameter> {
        self.params.iter()
    }
}

fn is_constructor(entry: &Value) -> bool {
    entry.get("type").and_then(Value::as_str) == Some("constructor")
}

/// Whether the ABI declares a constructor at all.
pub fn has_constructor(abi: &Value) -> bool {
    abi.as_array()
        .is_some_and(|entries| entries.iter().any(is_constructor))
}
