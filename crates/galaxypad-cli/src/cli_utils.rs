//! Common CLI utility functions shared across commands.

use anyhow::{Result, bail};

/// Parse a 32-bit hex address, with or without a `0x` prefix.
pub fn parse_hex_address(value: &str) -> Result<u32> {
    let value = value.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if digits.is_empty() {
        bail!("Invalid hex address '{}': no digits", value);
    }
    match u32::from_str_radix(digits, 16) {
        Ok(address) => Ok(address),
        Err(e) => bail!("Invalid hex address '{}': {}", value, e),
    }
}
