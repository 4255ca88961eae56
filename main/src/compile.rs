// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use crate::{
    constants::{SOLC_INSTALL_LINK, SOURCE_KEY},
    macros::*,
    CompileConfig,
};
use alloy::primitives::Bytes;
use eyre::{bail, Result, WrapErr};
use serde_json::{json, Value};
use sol_deploy_util::{
    color::{Color, DebugColor},
    sys,
};
use std::{io::Write, path::PathBuf};

/// A contract ready to be deployed.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledContract {
    pub name: String,
    pub abi: Value,
    pub bytecode: Bytes,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CompileOutput {
    Success(CompiledContract),
    Failed {
        errors: Vec<String>,
        warnings: Vec<String>,
    },
}

impl CompileOutput {
    fn failed(error: impl Into<String>, warnings: Vec<String>) -> Self {
        Self::Failed {
            errors: vec![error.into()],
            warnings,
        }
    }
}

/// Turns Solidity source into a deployable contract.
pub trait Compiler {
    /// Compiles `source`, selecting `contract` by name when given.
    async fn compile(&self, source: &str, contract: Option<&str>) -> Result<CompileOutput>;
}

/// Compiles through the solc standard JSON interface.
#[derive(Clone, Debug)]
pub struct SolcCompiler {
    pub solc: PathBuf,
    pub optimizer_runs: Option<u32>,
    pub include_paths: Vec<PathBuf>,
}

impl SolcCompiler {
    pub fn new(solc: impl Into<PathBuf>, optimizer_runs: Option<u32>) -> Self {
        Self {
            solc: solc.into(),
            optimizer_runs,
            include_paths: vec![],
        }
    }

    /// Adds package directories that imports are resolved against.
    pub fn with_include_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.include_paths.extend(paths);
        self
    }

    /// Command line for a standard JSON run. Include paths that do not exist are skipped,
    /// and solc requires a base path once any remain.
    pub fn solc_args(&self) -> Vec<String> {
        let mut args = vec!["--standard-json".to_owned()];
        let include: Vec<_> = self.include_paths.iter().filter(|p| p.is_dir()).collect();
        if !include.is_empty() {
            args.extend(["--base-path".to_owned(), ".".to_owned()]);
        }
        for path in include {
            args.push("--include-path".to_owned());
            args.push(path.to_string_lossy().into_owned());
        }
        args
    }

    pub fn standard_input(&self, source: &str) -> Value {
        let mut settings = json!({
            "outputSelection": {
                "*": { "*": ["abi", "evm.bytecode"] }
            }
        });
        if let Some(runs) = self.optimizer_runs {
            settings["optimizer"] = json!({ "enabled": true, "runs": runs });
        }
        json!({
            "language": "Solidity",
            "sources": { SOURCE_KEY: { "content": source } },
            "settings": settings,
        })
    }
}

impl Compiler for SolcCompiler {
    async fn compile(&self, source: &str, contract: Option<&str>) -> Result<CompileOutput> {
        if !sys::command_exists(&self.solc) {
            let link = SOLC_INSTALL_LINK.red();
            bail!("solc not found. Please see\n{link}");
        }
        let input = serde_json::to_vec(&self.standard_input(source))?;
        let solc = self.solc.clone();
        let args = self.solc_args();
        let output = tokio::task::spawn_blocking(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            sys::pipe_through(&solc, &args, &input)
        })
        .await??;

        let output: Value =
            serde_json::from_slice(&output).wrap_err("solc produced invalid standard JSON")?;
        Ok(parse_standard_output(&output, contract, source))
    }
}

impl crate::CompilerOpts {
    pub fn solc_compiler(&self) -> SolcCompiler {
        SolcCompiler::new(&self.solc, self.optimize_runs)
            .with_include_paths(self.include_path.iter().cloned())
    }
}

/// Interprets solc standard JSON output.
///
/// Only diagnostics of severity `error` fail the compilation. Without an explicit name, the first
/// contract declared in `source` is chosen, or else the first one solc reports.
pub fn parse_standard_output(output: &Value, contract: Option<&str>, source: &str) -> CompileOutput {
    let mut errors = vec![];
    let mut warnings = vec![];
    for diagnostic in output["errors"].as_array().into_iter().flatten() {
        let message = diagnostic["formattedMessage"]
            .as_str()
            .or(diagnostic["message"].as_str())
            .unwrap_or("unknown solc diagnostic")
            .trim_end()
            .to_owned();
        match diagnostic["severity"].as_str() {
            Some("error") => errors.push(message),
            _ => warnings.push(message),
        }
    }
    if !errors.is_empty() {
        return CompileOutput::Failed { errors, warnings };
    }

    let contracts = output["contracts"][SOURCE_KEY].as_object();
    let Some(contracts) = contracts.filter(|c| !c.is_empty()) else {
        return CompileOutput::failed("No contract found in the source code", warnings);
    };

    let selected = match contract {
        Some(name) => contracts.get(name).map(|c| (name.to_owned(), c)),
        None => extract_contract_name(source)
            .and_then(|name| contracts.get(&name).map(|c| (name, c)))
            .or_else(|| contracts.iter().next().map(|(name, c)| (name.clone(), c))),
    };
    let Some((name, compiled)) = selected else {
        let name = contract.unwrap_or_default();
        return CompileOutput::failed(format!("Contract \"{name}\" not found"), warnings);
    };

    let code = compiled["evm"]["bytecode"]["object"].as_str().unwrap_or_default();
    let bytecode = match hex::decode(code.trim_start_matches("0x")) {
        Ok(bytes) if !bytes.is_empty() => Bytes::from(bytes),
        Ok(_) => {
            let error = format!("Contract \"{name}\" has no bytecode (is it abstract?)");
            return CompileOutput::failed(error, warnings);
        }
        Err(err) => {
            let error = format!("Contract \"{name}\" has malformed bytecode: {err}");
            return CompileOutput::failed(error, warnings);
        }
    };

    CompileOutput::Success(CompiledContract {
        name,
        abi: compiled["abi"].clone(),
        bytecode,
        warnings,
    })
}

/// Finds the name of the first `contract` declared in `source`.
pub fn extract_contract_name(source: &str) -> Option<String> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';

    for (start, keyword) in source.match_indices("contract") {
        let before = source[..start].chars().next_back();
        let rest = &source[start + keyword.len()..];
        if before.is_some_and(is_ident) || !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let rest = rest.trim_start();
        let end = rest.find(|c: char| !is_ident(c)).unwrap_or(rest.len());
        let name = &rest[..end];
        if name.chars().next().is_some_and(|c| !c.is_ascii_digit()) {
            return Some(name.to_owned());
        }
    }
    None
}

/// Prints compiler diagnostics, returning the contract on success.
pub fn report(output: CompileOutput) -> Result<CompiledContract> {
    match output {
        CompileOutput::Success(contract) => {
            for warning in &contract.warnings {
                yellowln!("{warning}");
            }
            Ok(contract)
        }
        CompileOutput::Failed { errors, warnings } => {
            for warning in &warnings {
                yellowln!("{warning}");
            }
            for error in &errors {
                egreyln!("{}", error.red());
            }
            bail!("compilation failed with {} error(s)", errors.len());
        }
    }
}

/// Compiles a source file and writes its ABI and bytecode as JSON.
pub async fn compile(cfg: CompileConfig) -> Result<()> {
    let source = sys::read_file_or_stdin(&cfg.source)?;
    let compiler = cfg.compiler_opts.solc_compiler();
    let output = compiler
        .compile(&source, cfg.compiler_opts.contract.as_deref())
        .await?;
    let contract = report(output)?;

    if cfg.verbose {
        greyln!(
            "compiled {} ({} bytes of bytecode)",
            contract.name.debug_lavender(),
            contract.bytecode.len()
        );
    }
    let artifact = json!({
        "contractName": contract.name,
        "abi": contract.abi,
        "bytecode": contract.bytecode.to_string(),
    });
    let mut out = sys::file_or_stdout(cfg.output)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&artifact)?)?;
    Ok(())
}
