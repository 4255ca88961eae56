// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

/// Formats a line and writes it with `$print` in the given colour.
/// Callers need `sol_deploy_util::color::Color` in scope.
macro_rules! colorln {
    ($print:ident, $color:ident, $($msg:expr),*) => {{
        let line = format!($($msg),*);
        $print!("{}", line.$color())
    }};
}

macro_rules! greyln {
    ($($msg:expr),*) => { $crate::macros::colorln!(println, grey, $($msg),*) };
}

macro_rules! mintln {
    ($($msg:expr),*) => { $crate::macros::colorln!(println, mint, $($msg),*) };
}

/// Warnings that should not stop the run.
macro_rules! yellowln {
    ($($msg:expr),*) => { $crate::macros::colorln!(println, yellow, $($msg),*) };
}

macro_rules! egreyln {
    ($($msg:expr),*) => { $crate::macros::colorln!(eprintln, grey, $($msg),*) };
}

pub(crate) use {colorln, egreyln, greyln, mintln, yellowln};
