//! Hex encoding utility
//! Renders packed buffers and reads buffers to unpack

use std::fmt::Write;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Odd number of hex digits: {0}")]
    OddLength(usize),

    #[error("Invalid hex digit {ch:?} at position {position}")]
    InvalidDigit { ch: char, position: usize },
}

/// Encode bytes to a hex string
/// Example: [0x12, 0x34, 0xAB] -> "1234AB" (uppercase) or "1234ab"
pub fn encode(data: &[u8], uppercase: bool) -> String {
    let mut result = String::with_capacity(data.len() * 2);
    for byte in data {
        // Writing to String buffer is infallible
        let _ = if uppercase {
            write!(&mut result, "{:02X}", byte)
        } else {
            write!(&mut result, "{:02x}", byte)
        };
    }
    result
}

/// Decode a hex string into bytes
///
/// Accepts an optional `0x` prefix and ignores whitespace, so both
/// `"0x1234AB"` and `"12 34 ab"` decode to `[0x12, 0x34, 0xAB]`.
/// Error positions are byte offsets into `text` as given.
pub fn decode(text: &str) -> Result<Vec<u8>, HexError> {
    let trimmed = text.trim_start();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let start = text.len() - body.len();

    let mut digits = Vec::with_capacity(body.len());
    for (index, ch) in body.char_indices() {
        if ch.is_whitespace() {
            continue;
        }
        let digit = ch.to_digit(16).ok_or(HexError::InvalidDigit {
            ch,
            position: start + index,
        })?;
        digits.push(digit as u8);
    }

    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }

    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}
