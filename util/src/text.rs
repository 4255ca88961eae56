// Copyright 2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use eyre::Result;

pub fn decode0x<T: AsRef<str>>(text: T) -> Result<Vec<u8>> {
    let text = text.as_ref().trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    Ok(hex::decode(text)?)
}

/// Returns the digits following a mandatory lowercase `0x` prefix, if they are all hex.
pub fn hex_digits(text: &str) -> Option<&str> {
    let digits = text.strip_prefix("0x")?;
    digits
        .bytes()
        .all(|b| b.is_ascii_hexdigit())
        .then_some(digits)
}
