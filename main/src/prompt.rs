// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! Front ends that feed an [`ArgumentCollector`].

use crate::{
    abi::{AbiParameter, AbiType, CoercedArgument},
    collect::{ArgumentCollector, CollectError, FieldError},
};
use eyre::{bail, Result};
use sol_deploy_util::color::Color;
use std::io::{self, BufRead, Stdout, StdinLock, Write};

/// Something that can ask a user for constructor arguments.
pub trait Prompter {
    /// Asks for the value of one parameter. `None` cancels collection.
    fn ask(&mut self, index: usize, param: &AbiParameter, ty: &AbiType) -> Result<Option<String>>;

    fn show_error(&mut self, error: &FieldError) -> Result<()>;

    /// Asks a yes/no question.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Whether an invalid answer should be asked for again.
    fn retries(&self) -> bool {
        true
    }

    /// How many answers are already known, for prompters that replay fixed values.
    fn answers(&self) -> Option<usize> {
        None
    }
}

/// Interactive prompts over a line-oriented reader and writer.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, index: usize, param: &AbiParameter, ty: &AbiType) -> Result<Option<String>> {
        let out = &mut self.output;
        writeln!(out, "{} {}", param.label(index).mint(), ty.lavender())?;
        writeln!(out, "  {}", ty.help_text().grey())?;
        write!(out, "  {} {} ", format!("e.g. {}", ty.placeholder()).dim(), ">".grey())?;
        out.flush()?;

        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        match line.trim() {
            ":q" => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    fn show_error(&mut self, error: &FieldError) -> Result<()> {
        writeln!(self.output, "  {}", error.message.red())?;
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{question} {} ", "[y/N]".grey())?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Replays a fixed list of answers, such as values given on the command line.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompter {
    values: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, index: usize, _: &AbiParameter, _: &AbiType) -> Result<Option<String>> {
        Ok(Some(self.values.get(index).cloned().unwrap_or_default()))
    }

    fn show_error(&mut self, _: &FieldError) -> Result<()> {
        Ok(())
    }

    fn confirm(&mut self, _: &str) -> Result<bool> {
        Ok(true)
    }

    fn retries(&self) -> bool {
        false
    }

    fn answers(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

/// Drives `collector` to completion using `prompter`.
///
/// Returns `None` when the user cancels. Prompters that retry are asked again for each invalid
/// field; the others fail with every field error at once.
pub fn collect_arguments(
    prompter: &mut impl Prompter,
    collector: &mut ArgumentCollector,
) -> Result<Option<Vec<CoercedArgument>>> {
    if let Some(args) = collector.open()? {
        return Ok(Some(args));
    }
    let params = collector.schema().params().to_vec();
    let mut pending: Vec<usize> = (0..params.len()).collect();

    loop {
        for &index in &pending {
            let param = &params[index];
            let ty = param.abi_type();
            loop {
                let Some(text) = prompter.ask(index, param, &ty)? else {
                    collector.cancel()?;
                    return Ok(None);
                };
                collector.set_value(index, text)?;
                collector.touch(index)?;

                let errors = collector.visible_errors();
                let Some(error) = errors.iter().find(|e| e.index == index) else {
                    break;
                };
                prompter.show_error(error)?;
                if !prompter.retries() {
                    break;
                }
            }
        }

        match collector.confirm() {
            Ok(args) => return Ok(Some(args)),
            Err(CollectError::Rejected(errors)) => {
                let errors: Vec<_> = errors.iter().map(ToString::to_string).collect();
                bail!("invalid constructor arguments: {}", errors.join("; "));
            }
            Err(CollectError::Coerce(err)) if prompter.retries() => {
                prompter.show_error(&FieldError {
                    index: err.index(),
                    message: err.to_string(),
                })?;
                pending = vec![err.index()];
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::ConstructorSchema;
    use alloy::primitives::U256;
    use std::io::Cursor;

    const OWNER: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    fn collector(params: &[(&str, &str)]) -> ArgumentCollector {
        let params = params
            .iter()
            .map(|(name, ty)| AbiParameter::new(*name, *ty))
            .collect();
        ArgumentCollector::new(ConstructorSchema::new(params))
    }

    fn terminal(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), vec![])
    }

    #[test]
    fn terminal_reasks_invalid_fields() {
        let mut c = collector(&[("owner", "address"), ("supply", "uint256")]);
        let mut prompter = terminal(&format!("0x1234\n{OWNER}\n-5\n1000000\n"));

        let args = collect_arguments(&mut prompter, &mut c).unwrap().unwrap();
        assert_eq!(
            args,
            vec![
                CoercedArgument::Text(OWNER.into()),
                CoercedArgument::Uint(U256::from(1_000_000u64)),
            ]
        );

        let output = String::from_utf8(prompter.output).unwrap();
        assert!(output.contains("owner"));
        assert!(output.contains("uint256"));
        assert!(output.contains("Invalid address format"));
        assert!(output.contains("Unsigned integers must be positive"));
    }

    #[test]
    fn terminal_cancels() {
        let test_cases = vec![":q\n", "  :q  \n", ""];
        for input in test_cases {
            let mut c = collector(&[("name", "string")]);
            let mut prompter = terminal(input);
            assert_eq!(collect_arguments(&mut prompter, &mut c).unwrap(), None);
            assert_eq!(c.state(), crate::collect::CollectState::Cancelled);
        }
    }

    #[test]
    fn terminal_blank_is_required() {
        let mut c = collector(&[("name", "string")]);
        let mut prompter = terminal("\n   \nToken\n");
        let args = collect_arguments(&mut prompter, &mut c).unwrap().unwrap();
        assert_eq!(args, vec![CoercedArgument::Text("Token".into())]);

        let output = String::from_utf8(prompter.output).unwrap();
        assert_eq!(output.matches("This field is required").count(), 2);
    }

    #[test]
    fn terminal_reasks_unparsed_structures() {
        let mut c = collector(&[("flags", "bool[]")]);
        let mut prompter = terminal("[1]\n[false]\n");
        let args = collect_arguments(&mut prompter, &mut c).unwrap().unwrap();
        assert_eq!(
            args,
            vec![CoercedArgument::Array(vec![CoercedArgument::Bool(false)])]
        );
    }

    #[test]
    fn terminal_confirm() {
        let test_cases = vec![("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false), ("", false)];
        for (input, want) in test_cases {
            assert_eq!(terminal(input).confirm("continue?").unwrap(), want, "{input:?}");
        }
    }

    #[test]
    fn scripted_arguments() {
        let mut c = collector(&[("name", "string"), ("decimals", "uint8")]);
        let mut prompter = ScriptedPrompter::new(vec!["Token".into(), "18".into()]);
        let args = collect_arguments(&mut prompter, &mut c).unwrap().unwrap();
        assert_eq!(args[1], CoercedArgument::Uint(U256::from(18)));
    }

    #[test]
    fn scripted_errors_are_reported_together() {
        let mut c = collector(&[("name", "string"), ("decimals", "uint8"), ("on", "bool")]);
        let mut prompter = ScriptedPrompter::new(vec!["Token".into(), "256".into()]);
        let err = collect_arguments(&mut prompter, &mut c).unwrap_err().to_string();
        assert!(err.contains("argument 2: Number is too large for uint8"), "{err}");
        assert!(err.contains("argument 3: This field is required"), "{err}");
    }

    #[test]
    fn scripted_unparsed_fails() {
        let mut c = collector(&[("ids", "uint256[]")]);
        let mut prompter = ScriptedPrompter::new(vec![r#"["x"]"#.into()]);
        assert!(collect_arguments(&mut prompter, &mut c).is_err());
    }

    #[test]
    fn no_params_needs_no_answers() {
        let mut c = collector(&[]);
        let mut prompter = terminal("");
        assert_eq!(collect_arguments(&mut prompter, &mut c).unwrap(), Some(vec![]));
    }
}
