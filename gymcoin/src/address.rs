//! Ledger address validation and display helpers.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::{GymError, Result};

/// Strings the front end shows before a wallet address is known.
const PLACEHOLDERS: &[&str] = &["0x...", "0x", "0x0"];

/// Parse a `0x`-prefixed, 40-hex-digit address.
///
/// All-lowercase and all-uppercase digits are accepted as-is. Mixed case is
/// treated as an EIP-55 checksum and must match exactly.
///
/// # Errors
///
/// Returns [`GymError::InvalidAddress`] if the string is not a well-formed
/// address.
pub fn parse_address(value: &str) -> Result<Address> {
    let invalid = |reason: &str| GymError::InvalidAddress(format!("{value:?}: {reason}"));

    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix"))?;
    if digits.len() != 40 {
        return Err(invalid("expected 40 hex digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("non-hex character"));
    }

    let address = Address::from_str(value).map_err(|e| invalid(&e.to_string()))?;

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != value {
        return Err(invalid("checksum mismatch"));
    }

    Ok(address)
}

/// Format check only; says nothing about whether the account exists.
pub fn is_valid_address(value: &str) -> bool {
    parse_address(value).is_ok()
}

/// Whether `value` stands for "no address resolved yet".
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || PLACEHOLDERS.contains(&trimmed)
        || parse_address(trimmed).is_ok_and(|a| a == Address::ZERO)
}

/// `0x1234...abcd` style short form for display.
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
