// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use crate::{
    abi::{self, CoercedArgument},
    macros::*,
    AuthOpts,
};
use alloy::{
    network::TransactionBuilder,
    primitives::{utils::format_units, Address, TxHash},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
};
use eyre::{bail, eyre, Result, WrapErr};
use serde_json::Value;
use sol_deploy_util::color::{Color, DebugColor};

/// Where a contract ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_address: Address,
    /// Absent when only estimating, in which case the address is the predicted one.
    pub transaction_hash: Option<TxHash>,
    pub chain_id: u64,
}

/// Something that can put a compiled contract on chain.
pub trait Deployer {
    async fn deploy(
        &self,
        abi: &Value,
        bytecode: &[u8],
        args: &[CoercedArgument],
    ) -> Result<DeploymentResult>;
}

/// Sends creation transactions over JSON-RPC.
#[derive(Clone, Debug)]
pub struct RpcDeployer {
    pub endpoint: String,
    pub auth: AuthOpts,
    pub expected_chain_id: Option<u64>,
    pub estimate_gas: bool,
    pub verbose: bool,
}

impl Deployer for RpcDeployer {
    async fn deploy(
        &self,
        abi: &Value,
        bytecode: &[u8],
        args: &[CoercedArgument],
    ) -> Result<DeploymentResult> {
        let json_abi = abi::parse_abi(abi)?;
        let init_code = abi::deployment_calldata(&json_abi, bytecode, args)?;

        let provider = ProviderBuilder::new().on_builtin(&self.endpoint).await?;
        let chain_id = provider
            .get_chain_id()
            .await
            .wrap_err_with(|| format!("could not get chain id from {}", self.endpoint))?;
        if let Some(expected) = self.expected_chain_id {
            if expected != chain_id {
                bail!(
                    "endpoint is on chain {} but chain {} was requested",
                    chain_id.red(),
                    expected.red()
                );
            }
        }

        let wallet = self.auth.alloy_wallet(chain_id)?;
        let sender = wallet.default_signer().address();
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_builtin(&self.endpoint)
            .await?;

        if self.verbose {
            greyln!("endpoint: {}", self.endpoint.debug_lavender());
            greyln!("sender address: {}", sender.debug_lavender());
            greyln!("init code: {} bytes", init_code.len());
        }

        let tx = TransactionRequest::default()
            .with_from(sender)
            .with_deploy_code(init_code);

        let gas = provider
            .estimate_gas(&tx)
            .await
            .wrap_err("deployment failed during gas estimation")?;
        let gas_price = provider.get_gas_price().await?;

        if self.verbose || self.estimate_gas {
            print_gas_estimate("deployment", gas, gas_price)?;
        }
        if self.estimate_gas {
            let nonce = provider.get_transaction_count(sender).await?;
            return Ok(DeploymentResult {
                contract_address: sender.create(nonce),
                transaction_hash: None,
                chain_id,
            });
        }

        let tx = provider.send_transaction(tx.with_gas_limit(gas)).await?;
        let tx_hash = *tx.tx_hash();
        if self.verbose {
            greyln!("sent deploy tx: {}", tx_hash.debug_lavender());
        }
        let receipt = tx.get_receipt().await.wrap_err("tx failed to complete")?;
        if !receipt.status() {
            bail!("deploy tx reverted {}", tx_hash.debug_red());
        }
        let contract = receipt.contract_address.ok_or(eyre!("missing address"))?;

        let address = contract.debug_lavender();
        if self.verbose {
            let gas = format_gas(receipt.gas_used);
            greyln!("deployed code at address: {address} {} {gas}", "with".grey());
        } else {
            greyln!("deployed code at address: {address}");
        }
        greyln!("deployment tx hash: {}", tx_hash.debug_lavender());

        Ok(DeploymentResult {
            contract_address: contract,
            transaction_hash: Some(tx_hash),
            chain_id,
        })
    }
}

pub fn print_gas_estimate(name: &str, gas: u64, gas_price: u128) -> Result<()> {
    greyln!("estimates");
    greyln!("{} tx gas: {}", name, gas.debug_lavender());
    greyln!(
        "gas price: {} gwei",
        format_units(gas_price, "gwei")?.debug_lavender()
    );
    let total_cost = gas_price.checked_mul(gas.into()).unwrap_or_default();
    let eth_estimate = format_units(total_cost, "ether")?;
    greyln!(
        "{} tx total cost: {} ETH",
        name,
        eth_estimate.debug_lavender()
    );
    Ok(())
}

pub fn format_gas(gas: u128) -> String {
    let text = format!("{gas} gas");
    if gas <= 3_000_000 {
        text.mint()
    } else if gas <= 7_000_000 {
        text.yellow()
    } else {
        text.pink()
    }
}
