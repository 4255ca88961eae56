// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use eyre::{Context, Result};
use std::{
    ffi::OsStr,
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

pub fn command_exists<S: AsRef<OsStr>>(program: S) -> bool {
    Command::new(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .arg("--version")
        .output()
        .map(|x| x.status.success())
        .unwrap_or_default()
}

/// Runs a program, feeding `input` through its stdin and collecting its stdout.
pub fn pipe_through<S: AsRef<OsStr>>(program: S, args: &[&str], input: &[u8]) -> Result<Vec<u8>> {
    let program = program.as_ref();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .wrap_err_with(|| format!("failed to run {}", program.to_string_lossy()))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input)?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        eyre::bail!(
            "{} exited with {}",
            program.to_string_lossy(),
            output.status
        );
    }
    Ok(output.stdout)
}

/// Opens a file for writing, or stdout.
pub fn file_or_stdout(path: Option<PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(file) => Box::new(File::create(file)?),
        None => Box::new(io::stdout().lock()),
    })
}

/// Reads a file to a string, or stdin when the path is `-`.
pub fn read_file_or_stdin(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path == Path::new("-") {
        io::stdin().read_to_string(&mut text)?;
    } else {
        text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read {}", path.display()))?;
    }
    Ok(text)
}
