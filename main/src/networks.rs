// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use crate::{constants::DEFAULT_EXPLORER, macros::*, NetworksConfig};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use sol_deploy_util::color::{Color, DebugColor};
use std::{fmt::Display, fs, path::Path};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self::new("Ether", "ETH")
    }
}

impl NativeCurrency {
    fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: 18,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default)]
    pub block_explorer_url: String,
    #[serde(default)]
    pub currency: NativeCurrency,
}

impl Network {
    fn new(name: &str, chain_id: u64, rpc_url: &str, explorer: &str, currency: NativeCurrency) -> Self {
        Self {
            name: name.into(),
            chain_id,
            rpc_url: rpc_url.into(),
            block_explorer_url: explorer.into(),
            currency,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NetworkFile {
    #[serde(default)]
    networks: Vec<Network>,
}

/// Known chains, looked up by chain id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<Network>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        let ether = NativeCurrency::default;
        let networks = vec![
            Network::new("Ethereum Mainnet", 1, "https://eth.llamarpc.com", "https://etherscan.io", ether()),
            Network::new("Goerli Testnet", 5, "", "https://goerli.etherscan.io", NativeCurrency::new("Goerli ETH", "ETH")),
            Network::new("Sepolia Testnet", 11155111, "https://rpc.sepolia.org", "https://sepolia.etherscan.io", NativeCurrency::new("Sepolia ETH", "ETH")),
            Network::new("Polygon Mainnet", 137, "https://polygon-rpc.com", "https://polygonscan.com", NativeCurrency::new("MATIC", "MATIC")),
            Network::new("Mumbai Testnet", 80001, "", "https://mumbai.polygonscan.com", NativeCurrency::new("MATIC", "MATIC")),
            Network::new("Polygon Amoy Testnet", 80002, "https://rpc-amoy.polygon.technology", "https://amoy.polygonscan.com", NativeCurrency::new("MATIC", "MATIC")),
            Network::new("BSC Mainnet", 56, "https://bsc-dataseed.binance.org", "https://bscscan.com", NativeCurrency::new("BNB", "BNB")),
            Network::new("BSC Testnet", 97, "https://data-seed-prebsc-1-s1.binance.org:8545", "https://testnet.bscscan.com", NativeCurrency::new("tBNB", "tBNB")),
            Network::new("Avalanche C-Chain", 43114, "https://api.avax.network/ext/bc/C/rpc", "https://snowtrace.io", NativeCurrency::new("AVAX", "AVAX")),
            Network::new("Avalanche Fuji Testnet", 43113, "https://api.avax-test.network/ext/bc/C/rpc", "https://testnet.snowtrace.io", NativeCurrency::new("AVAX", "AVAX")),
            Network::new("Arbitrum One", 42161, "https://arb1.arbitrum.io/rpc", "https://arbiscan.io", ether()),
            Network::new("Optimism", 10, "https://mainnet.optimism.io", "https://optimistic.etherscan.io", ether()),
            Network::new("Base", 8453, "https://mainnet.base.org", "https://basescan.org", ether()),
        ];
        Self { networks }
    }
}

impl NetworkRegistry {
    pub fn empty() -> Self {
        Self { networks: vec![] }
    }

    /// The built-in networks overlaid with those declared in a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read network file {}", path.display()))?;
        let file: NetworkFile = toml::from_str(&text)
            .wrap_err_with(|| format!("failed to parse network file {}", path.display()))?;

        let mut registry = Self::default();
        for network in file.networks {
            registry.insert(network);
        }
        Ok(registry)
    }

    pub fn from_config(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Adds a network, replacing any existing entry with the same chain id.
    pub fn insert(&mut self, network: Network) {
        match self.networks.iter_mut().find(|n| n.chain_id == network.chain_id) {
            Some(existing) => *existing = network,
            None => self.networks.push(network),
        }
    }

    pub fn get(&self, chain_id: u64) -> Option<&Network> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// Looks a network up by chain id or case-insensitive name.
    pub fn find(&self, query: &str) -> Option<&Network> {
        if let Ok(chain_id) = query.parse() {
            return self.get(chain_id);
        }
        self.networks
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(query.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter()
    }
}

pub fn network_name(registry: &NetworkRegistry, chain_id: u64) -> String {
    match registry.get(chain_id) {
        Some(network) => network.name.clone(),
        None => format!("Chain ID: {chain_id}"),
    }
}

pub fn explorer_url(registry: &NetworkRegistry, chain_id: u64, address: impl Display) -> String {
    let explorer = registry
        .get(chain_id)
        .map(|n| n.block_explorer_url.trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_EXPLORER);
    format!("{explorer}/address/{address}")
}

/// Prints every known network.
pub fn list(cfg: NetworksConfig) -> Result<()> {
    let registry = NetworkRegistry::from_config(cfg.networks.as_deref())?;
    for network in registry.iter() {
        greyln!(
            "{} {} {}",
            network.chain_id.debug_lavender(),
            network.name.mint(),
            format!("({})", network.currency.symbol).grey()
        );
        if !network.rpc_url.is_empty() {
            greyln!("    rpc: {}", network.rpc_url);
        }
        if !network.block_explorer_url.is_empty() {
            greyln!("    explorer: {}", network.block_explorer_url);
        }
    }
    Ok(())
}
