// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! The compile, review, collect and deploy sequence.

use crate::{
    abi::ConstructorSchema,
    collect::ArgumentCollector,
    compile::{self, Compiler},
    deploy::{Deployer, DeploymentResult, RpcDeployer},
    macros::*,
    networks::{explorer_url, network_name, NetworkRegistry},
    prompt::{collect_arguments, Prompter, ScriptedPrompter, TerminalPrompter},
    review::{self, Report, Reviewer},
    DeployConfig,
};
use eyre::{bail, eyre, Result, WrapErr};
use sol_deploy_util::{
    color::{Color, DebugColor},
    sys,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Deployed {
        result: DeploymentResult,
        network: String,
        explorer: String,
    },
    ReviewDeclined,
    Cancelled,
}

/// Collaborators for one run of the deployment sequence. Each step starts only once the
/// previous one has finished.
pub struct Workflow<C, R, D> {
    pub compiler: C,
    /// Skips the security review when absent.
    pub reviewer: Option<R>,
    pub deployer: D,
    pub registry: NetworkRegistry,
}

impl<C: Compiler, R: Reviewer, D: Deployer> Workflow<C, R, D> {
    pub async fn run(
        &self,
        prompter: &mut impl Prompter,
        source: &str,
        contract: Option<&str>,
    ) -> Result<WorkflowOutcome> {
        let output = self.compiler.compile(source, contract).await?;
        let compiled = compile::report(output)?;
        greyln!("compiled contract: {}", compiled.name.mint());

        let report = match &self.reviewer {
            Some(reviewer) => {
                let report = reviewer
                    .review(source)
                    .await
                    .wrap_err("security review failed")?;
                review::print_report(&report);
                if !prompter.confirm("Continue to deployment?")? {
                    mintln!("deployment stopped. Fix the reported issues and try again");
                    return Ok(WorkflowOutcome::ReviewDeclined);
                }
                Some(report)
            }
            None => None,
        };

        let schema = ConstructorSchema::from_abi(&compiled.abi);
        if let Some(got) = prompter.answers() {
            if got != schema.len() {
                bail!(
                    "mismatch number of constructor arguments (want {}; got {})",
                    schema.len(),
                    got
                );
            }
        }

        let mut collector = ArgumentCollector::new(schema);
        let Some(args) = collect_arguments(prompter, &mut collector)? else {
            if let Some(report) = &report {
                show_summary(report);
            }
            return Ok(WorkflowOutcome::Cancelled);
        };

        let result = self
            .deployer
            .deploy(&compiled.abi, &compiled.bytecode, &args)
            .await?;
        let network = network_name(&self.registry, result.chain_id);
        let explorer = explorer_url(&self.registry, result.chain_id, result.contract_address);
        Ok(WorkflowOutcome::Deployed {
            result,
            network,
            explorer,
        })
    }
}

fn show_summary(report: &Report) {
    greyln!("argument collection cancelled; the review is still available:");
    greyln!(
        "{} risk: {}",
        report.overall_risk.lavender(),
        report.summary
    );
}

/// Compiles, optionally reviews, and deploys a source file.
pub async fn deploy(cfg: DeployConfig) -> Result<()> {
    let source = sys::read_file_or_stdin(&cfg.source)?;
    let registry = NetworkRegistry::from_config(cfg.common_cfg.networks.as_deref())?;

    let (endpoint, expected_chain_id) = match &cfg.network {
        Some(query) => {
            let network = registry
                .find(query)
                .ok_or_else(|| eyre!("unknown network {query}"))?;
            if network.rpc_url.is_empty() {
                bail!("network {} has no rpc url configured", network.name);
            }
            let chain_id = cfg.chain_id.unwrap_or(network.chain_id);
            (network.rpc_url.clone(), Some(chain_id))
        }
        None => (cfg.common_cfg.endpoint.clone(), cfg.chain_id),
    };

    let deployer = RpcDeployer {
        endpoint,
        auth: cfg.auth.clone(),
        expected_chain_id,
        estimate_gas: cfg.estimate_gas,
        verbose: cfg.common_cfg.verbose,
    };
    let reviewer = match cfg.no_review {
        true => None,
        false => Some(cfg.review_opts.reviewer()?),
    };
    let workflow = Workflow {
        compiler: cfg.compiler_opts.solc_compiler(),
        reviewer,
        deployer,
        registry,
    };

    let contract = cfg.compiler_opts.contract.as_deref();
    let outcome = match cfg.constructor_args {
        Some(values) => {
            let mut prompter = ScriptedPrompter::new(values);
            workflow.run(&mut prompter, &source, contract).await?
        }
        None => {
            let mut prompter = TerminalPrompter::stdio();
            workflow.run(&mut prompter, &source, contract).await?
        }
    };

    match outcome {
        WorkflowOutcome::Deployed {
            result,
            network,
            explorer,
        } => {
            let address = result.contract_address.debug_lavender();
            if result.transaction_hash.is_none() {
                greyln!("estimated address on {network}: {address}");
                return Ok(());
            }
            mintln!("deployed to {network}");
            greyln!("contract address: {address}");
            greyln!("explorer: {explorer}");
        }
        WorkflowOutcome::ReviewDeclined => {}
        WorkflowOutcome::Cancelled => mintln!("deployment cancelled"),
    }
    Ok(())
}
