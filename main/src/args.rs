// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use crate::{
    abi::{
        coerce_strict, encode_constructor_args, has_constructor, parse_abi, validate_as,
        ConstructorSchema, Validation,
    },
    macros::*,
    ArgsConfig,
};
use eyre::{bail, Result, WrapErr};
use serde_json::Value;
use sol_deploy_util::{color::Color, sys};

/// Checks constructor arguments against an ABI without touching the network.
pub fn inspect(cfg: ArgsConfig) -> Result<()> {
    let text = sys::read_file_or_stdin(&cfg.abi)?;
    let value: Value = serde_json::from_str(&text).wrap_err("ABI file is not valid JSON")?;
    // accept both a bare ABI and a compile artifact
    let abi = match value.get("abi") {
        Some(abi) => abi.clone(),
        None => value,
    };

    let schema = ConstructorSchema::from_abi(&abi);
    if !has_constructor(&abi) {
        greyln!("no constructor declared; the contract takes no arguments");
    }
    if cfg.values.len() != schema.len() {
        bail!(
            "mismatch number of constructor arguments (want {}; got {})",
            schema.len(),
            cfg.values.len()
        );
    }

    let mut invalid = 0;
    for (index, (param, value)) in schema.iter().zip(&cfg.values).enumerate() {
        let ty = param.abi_type();
        let label = param.label(index);
        match validate_as(&ty, value) {
            Validation::Valid => greyln!("{} {} {}", label.mint(), ty.lavender(), "ok".grey()),
            Validation::Invalid(reason) => {
                invalid += 1;
                egreyln!("{} {} {}", label.mint(), ty.lavender(), reason.red());
            }
        }
    }
    if invalid > 0 {
        bail!("{invalid} invalid argument(s)");
    }

    let args = coerce_strict(&schema, &cfg.values)?;
    for (index, (param, arg)) in schema.iter().zip(&args).enumerate() {
        greyln!("{} = {arg}", param.label(index));
    }
    if cfg.encode {
        let encoded = encode_constructor_args(&parse_abi(&abi)?, &args)?;
        println!("0x{}", hex::encode(encoded));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use tempfile::tempdir;

    const ABI: &str = r#"[
        { "type": "event", "name": "Transfer", "inputs": [], "anonymous": false },
        { "type": "constructor", "stateMutability": "nonpayable", "inputs": [
            { "name": "owner", "type": "address", "internalType": "address" },
            { "name": "decimals", "type": "uint8", "internalType": "uint8" }
        ]}
    ]"#;

    fn config(path: PathBuf, values: &[&str]) -> ArgsConfig {
        ArgsConfig {
            abi: path,
            values: values.iter().map(|v| v.to_string()).collect(),
            encode: true,
        }
    }

    #[test]
    fn checks_arguments() -> Result<()> {
        let dir = tempdir()?;
        let bare = dir.path().join("abi.json");
        fs::write(&bare, ABI)?;
        let artifact = dir.path().join("artifact.json");
        fs::write(&artifact, format!(r#"{{ "contractName": "Token", "abi": {ABI} }}"#))?;

        let owner = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";
        let test_cases = vec![
            (bare.clone(), vec![owner, "18"], true),
            (artifact.clone(), vec![owner, "18"], true),
            (bare.clone(), vec![owner, "256"], false),
            (bare.clone(), vec!["0x1234", "18"], false),
            (artifact, vec![owner], false),
        ];
        for (path, values, ok) in test_cases {
            let result = inspect(config(path, &values));
            assert_eq!(result.is_ok(), ok, "{values:?}: {result:?}");
        }

        let no_constructor = dir.path().join("empty.json");
        fs::write(&no_constructor, "[]")?;
        inspect(config(no_constructor.clone(), &[]))?;
        assert!(inspect(config(no_constructor, &["1"])).is_err());
        Ok(())
    }
}
