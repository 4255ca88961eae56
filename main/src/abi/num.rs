// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! Decimal parsing for `uintN` / `intN` values.

use alloy::primitives::{Sign, I256, U256};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum IntError {
    #[error("unsigned integers must be positive")]
    Negative,
    #[error("not a whole decimal number")]
    Format,
    #[error("number is too large or invalid")]
    TooLarge,
    #[error("number does not fit in {0} bits")]
    Width(usize),
}

/// Largest magnitude representable by a `uint<bits>`.
fn uint_max(bits: usize) -> U256 {
    U256::MAX >> (256 - bits)
}

/// Largest positive value of an `int<bits>`; the most negative value is one past it.
fn int_max(bits: usize) -> U256 {
    U256::MAX >> (257 - bits)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a `uint<bits>` from plain decimal digits.
pub fn parse_uint(text: &str, bits: usize) -> Result<U256, IntError> {
    if text.starts_with('-') {
        return Err(IntError::Negative);
    }
    if !is_digits(text) {
        return Err(IntError::Format);
    }
    let value = U256::from_str_radix(text, 10).map_err(|_| IntError::TooLarge)?;
    if value > uint_max(bits) {
        return Err(IntError::Width(bits));
    }
    Ok(value)
}

/// Parses an `int<bits>` from an optional `-` followed by decimal digits.
pub fn parse_int(text: &str, bits: usize) -> Result<I256, IntError> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(digits) => (Sign::Negative, digits),
        None => (Sign::Positive, text),
    };
    if !is_digits(digits) {
        return Err(IntError::Format);
    }
    let abs = U256::from_str_radix(digits, 10).map_err(|_| IntError::TooLarge)?;
    if abs.is_zero() {
        return Ok(I256::ZERO);
    }
    if !int_fits(sign, abs, bits) {
        return Err(IntError::Width(bits));
    }
    I256::checked_from_sign_and_abs(sign, abs).ok_or(IntError::TooLarge)
}

/// Whether `sign * abs` is representable as an `int<bits>`.
pub fn int_fits(sign: Sign, abs: U256, bits: usize) -> bool {
    let max = int_max(bits);
    match sign {
        Sign::Positive => abs <= max,
        Sign::Negative => abs <= max + U256::from(1),
    }
}

/// Whether `value` is representable as a `uint<bits>`.
pub fn uint_fits(value: U256, bits: usize) -> bool {
    value <= uint_max(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_bounds() {
        assert_eq!(parse_uint("255", 8), Ok(U256::from(255)));
        assert_eq!(parse_uint("256", 8), Err(IntError::Width(8)));
        assert_eq!(parse_uint("0", 256), Ok(U256::ZERO));
        assert_eq!(parse_uint(&U256::MAX.to_string(), 256), Ok(U256::MAX));
        let too_big = format!("{}0", U256::MAX);
        assert_eq!(parse_uint(&too_big, 256), Err(IntError::TooLarge));
        assert_eq!(parse_uint(&"9".repeat(500), 256), Err(IntError::TooLarge));
    }

    #[test]
    fn unsigned_format() {
        assert_eq!(parse_uint("-1", 256), Err(IntError::Negative));
        assert_eq!(parse_uint("1.5", 256), Err(IntError::Format));
        assert_eq!(parse_uint("+1", 256), Err(IntError::Format));
        assert_eq!(parse_uint("0x10", 256), Err(IntError::Format));
        assert_eq!(parse_uint(" 1", 256), Err(IntError::Format));
        assert_eq!(parse_uint("", 256), Err(IntError::Format));
    }

    #[test]
    fn signed_bounds() {
        assert_eq!(parse_int("-128", 8), Ok(I256::try_from(-128i64).unwrap()));
        assert_eq!(parse_int("127", 8), Ok(I256::try_from(127i64).unwrap()));
        assert_eq!(parse_int("128", 8), Err(IntError::Width(8)));
        assert_eq!(parse_int("-129", 8), Err(IntError::Width(8)));
        assert_eq!(parse_int(&I256::MIN.to_string(), 256), Ok(I256::MIN));
        assert_eq!(parse_int(&I256::MAX.to_string(), 256), Ok(I256::MAX));
        assert_eq!(
            parse_int(&U256::MAX.to_string(), 256),
            Err(IntError::Width(256))
        );
    }

    #[test]
    fn signed_format() {
        assert_eq!(parse_int("-", 256), Err(IntError::Format));
        assert_eq!(parse_int("--1", 256), Err(IntError::Format));
        assert_eq!(parse_int("1e3", 256), Err(IntError::Format));
        assert_eq!(parse_int("-0", 256), Ok(I256::ZERO));
    }
}
