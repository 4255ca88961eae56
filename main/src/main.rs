// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use clap::{Args, Parser};
use constants::{
    DEFAULT_ENDPOINT, DEFAULT_INCLUDE_PATH, DEFAULT_SOLC, REVIEW_ENDPOINT, REVIEW_MODEL,
};
use eyre::{eyre, Context, Result};
use std::path::PathBuf;
use tokio::runtime::Builder;

mod abi;
mod args;
mod collect;
mod compile;
mod constants;
mod deploy;
mod macros;
mod networks;
mod pipeline;
mod prompt;
mod review;
mod wallet;

#[derive(Parser, Debug)]
#[command(name = "sol-deploy")]
#[command(author = "Offchain Labs, Inc.")]
#[command(about = "Compile, review and deploy Solidity contracts with typed constructor arguments", long_about = None)]
#[command(propagate_version = true)]
#[command(version)]
struct Opts {
    #[command(subcommand)]
    command: Apis,
}

#[derive(Parser, Debug, Clone)]
enum Apis {
    /// Compile a Solidity source file and print its ABI and bytecode.
    #[command(alias = "c")]
    Compile(CompileConfig),
    /// Run a security review of a Solidity source file.
    #[command(alias = "r")]
    Review(ReviewConfig),
    /// Compile, review, collect constructor arguments and deploy.
    #[command(alias = "d")]
    Deploy(DeployConfig),
    /// Validate and encode constructor arguments against an ABI, offline.
    #[command(alias = "a")]
    Args(ArgsConfig),
    /// List the networks used to name chains and link explorers.
    Networks(NetworksConfig),
}

#[derive(Args, Clone, Debug)]
struct CommonConfig {
    /// JSON-RPC endpoint.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Whether to print debug info.
    #[arg(long)]
    verbose: bool,
    /// TOML file with extra `[[networks]]` entries, layered over the built-in ones.
    #[arg(long)]
    networks: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct CompilerOpts {
    /// Contract to select when the source declares several (defaults to the first).
    #[arg(long)]
    contract: Option<String>,
    /// Path to the solc binary.
    #[arg(long, default_value = DEFAULT_SOLC)]
    solc: PathBuf,
    /// Enables the optimizer with the given number of runs.
    #[arg(long)]
    optimize_runs: Option<u32>,
    /// Package directory for imports such as `@openzeppelin/...`. Repeatable.
    #[arg(long, default_value = DEFAULT_INCLUDE_PATH)]
    include_path: Vec<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct CompileConfig {
    /// Solidity source file, or `-` for stdin.
    source: PathBuf,
    #[command(flatten)]
    compiler_opts: CompilerOpts,
    /// The output file (defaults to stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Whether to print debug info.
    #[arg(long)]
    verbose: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ReviewOpts {
    /// API key for the review service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Model used for the review.
    #[arg(long, default_value = REVIEW_MODEL)]
    review_model: String,
    /// Responses endpoint used for the review.
    #[arg(long, default_value = REVIEW_ENDPOINT)]
    review_endpoint: String,
}

#[derive(Args, Clone, Debug)]
pub struct ReviewConfig {
    /// Solidity source file, or `-` for stdin.
    source: PathBuf,
    #[command(flatten)]
    review_opts: ReviewOpts,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Debug, Args)]
#[group(multiple = true)]
pub struct AuthOpts {
    /// File path to a text file containing a hex-encoded private key.
    #[arg(long)]
    private_key_path: Option<PathBuf>,
    /// Private key as a hex string. Warning: this exposes your key in shell history. Prefer
    /// --private-key-path, a keystore, or the PRIVATE_KEY environment variable.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
    /// Path to an Ethereum wallet keystore file (e.g. clef).
    #[arg(long)]
    keystore_path: Option<String>,
    /// Keystore password file.
    #[arg(long)]
    keystore_password_path: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct DeployConfig {
    /// Solidity source file, or `-` for stdin.
    source: PathBuf,
    #[command(flatten)]
    common_cfg: CommonConfig,
    #[command(flatten)]
    compiler_opts: CompilerOpts,
    #[command(flatten)]
    review_opts: ReviewOpts,
    #[command(flatten)]
    auth: AuthOpts,
    /// Skips the security review.
    #[arg(long)]
    no_review: bool,
    /// Deploy through a registered network, by name or chain id, instead of --endpoint.
    #[arg(long)]
    network: Option<String>,
    /// Refuse to deploy unless the endpoint reports this chain id.
    #[arg(long)]
    chain_id: Option<u64>,
    /// Only estimate the deployment gas.
    #[arg(long)]
    estimate_gas: bool,
    /// Constructor arguments, skipping the interactive prompts. Must come last.
    #[arg(long, num_args(0..), value_name = "ARGS", allow_hyphen_values = true)]
    constructor_args: Option<Vec<String>>,
}

#[derive(Args, Clone, Debug)]
pub struct ArgsConfig {
    /// JSON ABI, or a compile artifact with an `abi` field. Use `-` for stdin.
    abi: PathBuf,
    /// One value per constructor parameter.
    #[arg(allow_hyphen_values = true)]
    values: Vec<String>,
    /// Print the ABI-encoded arguments.
    #[arg(long)]
    encode: bool,
}

#[derive(Args, Clone, Debug)]
pub struct NetworksConfig {
    /// TOML file with extra `[[networks]]` entries.
    #[arg(long)]
    networks: Option<PathBuf>,
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(main_impl(opts))
}

async fn main_impl(opts: Opts) -> Result<()> {
    macro_rules! run {
        ($expr:expr, $($msg:expr),+) => {
            $expr.wrap_err_with(|| eyre!($($msg),+))?
        };
    }

    match opts.command {
        Apis::Compile(config) => {
            run!(compile::compile(config).await, "failed to compile");
        }
        Apis::Review(config) => {
            run!(review::review_source(config).await, "failed to review");
        }
        Apis::Deploy(config) => {
            run!(pipeline::deploy(config).await, "failed to deploy");
        }
        Apis::Args(config) => {
            run!(args::inspect(config), "invalid constructor arguments");
        }
        Apis::Networks(config) => {
            run!(networks::list(config), "failed to list networks");
        }
    }
    Ok(())
}
