// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use crate::AuthOpts;
use alloy::{
    network::EthereumWallet,
    primitives::B256,
    signers::{
        local::{LocalSigner, PrivateKeySigner},
        Signer,
    },
};
use eyre::{bail, eyre, Context, Result};
use sol_deploy_util::text::decode0x;
use std::fs;

/// Loads a wallet for signing transactions.
impl AuthOpts {
    pub fn alloy_wallet(&self, chain_id: u64) -> Result<EthereumWallet> {
        if let Some(key) = &self.private_key {
            let signer = signer_from_hex(key)?.with_chain_id(Some(chain_id));
            return Ok(EthereumWallet::new(signer));
        }

        if let Some(file) = &self.private_key_path {
            let key = fs::read_to_string(file).wrap_err("could not open private key file")?;
            let signer = signer_from_hex(&key)?.with_chain_id(Some(chain_id));
            return Ok(EthereumWallet::new(signer));
        }

        let keystore = self.keystore_path.as_ref().ok_or(eyre!(
            "no wallet configured: pass --private-key, --private-key-path or --keystore-path"
        ))?;
        let password = match &self.keystore_password_path {
            Some(path) => fs::read_to_string(path)
                .wrap_err("could not open keystore password file")?
                .trim_end_matches(['\r', '\n'])
                .to_owned(),
            None => String::new(),
        };

        let signer = LocalSigner::decrypt_keystore(keystore, password)
            .wrap_err("could not decrypt keystore")?
            .with_chain_id(Some(chain_id));
        Ok(EthereumWallet::new(signer))
    }
}

fn signer_from_hex(key: &str) -> Result<PrivateKeySigner> {
    if key.trim().is_empty() {
        bail!("empty private key");
    }
    let bytes = decode0x(key).wrap_err("private key is not valid hex")?;
    if bytes.len() != 32 {
        bail!("private key must be 32 bytes (got {})", bytes.len());
    }
    Ok(PrivateKeySigner::from_bytes(&B256::from_slice(&bytes))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use tempfile::tempdir;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn auth() -> AuthOpts {
        AuthOpts {
            private_key: None,
            private_key_path: None,
            keystore_path: None,
            keystore_password_path: None,
        }
    }

    #[test]
    fn from_private_key() -> Result<()> {
        let opts = AuthOpts {
            private_key: Some(KEY.into()),
            ..auth()
        };
        let wallet = opts.alloy_wallet(1)?;
        assert_eq!(
            wallet.default_signer().address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        Ok(())
    }

    #[test]
    fn from_key_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("key.txt");
        fs::write(&path, format!("{KEY}\n"))?;

        let opts = AuthOpts {
            private_key_path: Some(path),
            ..auth()
        };
        let wallet = opts.alloy_wallet(31337)?;
        assert_eq!(
            wallet.default_signer().address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        Ok(())
    }

    #[test]
    fn bad_keys() {
        let test_cases = vec!["", "0x", "0x1234", "not hex at all"];
        for key in test_cases {
            let opts = AuthOpts {
                private_key: Some(key.into()),
                ..auth()
            };
            assert!(opts.alloy_wallet(1).is_err(), "{key:?}");
        }
        assert!(auth().alloy_wallet(1).is_err());
    }
}
