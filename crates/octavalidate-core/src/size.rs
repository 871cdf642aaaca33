//! Human-readable byte sizes
//!
//! Converts strings such as `"5MB"`, `"1.5 gb"` or `"10bytes"` into byte
//! counts. Units are powers of 1024.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{EngineError, Result};

static SIZE_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(bytes|kb|mb|gb|tb|pb)$").expect("size syntax must compile")
});

/// Storage units accepted by [`parse_size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
    Petabytes,
}

impl SizeUnit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "bytes" => Some(SizeUnit::Bytes),
            "kb" => Some(SizeUnit::Kilobytes),
            "mb" => Some(SizeUnit::Megabytes),
            "gb" => Some(SizeUnit::Gigabytes),
            "tb" => Some(SizeUnit::Terabytes),
            "pb" => Some(SizeUnit::Petabytes),
            _ => None,
        }
    }

    /// Number of bytes in one unit
    pub fn multiplier(&self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kilobytes => 1 << 10,
            SizeUnit::Megabytes => 1 << 20,
            SizeUnit::Gigabytes => 1 << 30,
            SizeUnit::Terabytes => 1 << 40,
            SizeUnit::Petabytes => 1 << 50,
        }
    }
}

/// Parse a size string into a byte count
///
/// Case and whitespace are ignored. Fractional amounts are floored to whole
/// bytes. Anything that is not `<number><unit>` is a [`EngineError::FormatError`].
pub fn parse_size(input: &str) -> Result<u64> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let invalid = || {
        EngineError::format_error(format!(
            "invalid size '{}': expected a number followed by one of bytes, kb, mb, gb, tb, pb",
            input
        ))
    };

    let captures = SIZE_SYNTAX.captures(&normalized).ok_or_else(invalid)?;
    let amount = &captures[1];
    let unit = SizeUnit::from_suffix(&captures[2]).ok_or_else(invalid)?;
    let multiplier = unit.multiplier();

    let overflow = || EngineError::format_error(format!("size '{}' is too large", input));

    if let Ok(whole) = amount.parse::<u64>() {
        return whole.checked_mul(multiplier).ok_or_else(overflow);
    }

    let fractional: f64 = amount.parse().map_err(|_| invalid())?;
    let bytes = (fractional * multiplier as f64).floor();
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(overflow());
    }
    Ok(bytes as u64)
}

/// A parsed size that remembers how it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSize {
    bytes: u64,
    label: String,
}

impl ByteSize {
    /// Parse a size string, keeping the original text for messages
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self {
            bytes: parse_size(input)?,
            label: input.trim().to_string(),
        })
    }

    /// Build from a raw byte count
    pub fn from_bytes(bytes: u64) -> Self {
        Self {
            bytes,
            label: format!("{} bytes", bytes),
        }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
