//! Fixed-width integer conversions with byte order support
//!
//! Writes and reads 1/2/4/8-byte integers to and from byte slices. The width
//! is the length of the slice passed in; signed values travel through their
//! unsigned bit pattern and are recovered with two's-complement rules.

use super::Endian;

// ============================================================================
// Unsigned Conversions
// ============================================================================

/// Write the low `dst.len()` bytes of `value` in the given order
///
/// Single-byte destinations are a direct copy regardless of order.
pub fn put_uint(dst: &mut [u8], value: u64, endian: Endian) {
    let width = dst.len();
    debug_assert!(width <= 8, "Integer width out of range: {}", width);

    match endian {
        Endian::Little => {
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = (value >> (8 * i)) as u8;
            }
        },
        Endian::Big => {
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = (value >> (8 * (width - 1 - i))) as u8;
            }
        },
    }
}

/// Assemble an unsigned integer from `src` in the given order
pub fn get_uint(src: &[u8], endian: Endian) -> u64 {
    debug_assert!(src.len() <= 8, "Integer width out of range: {}", src.len());

    match endian {
        Endian::Little => src
            .iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64),
        Endian::Big => src.iter().fold(0u64, |acc, &byte| (acc << 8) | byte as u64),
    }
}

// ============================================================================
// Signed Conversions
// ============================================================================

/// Reinterpret a `width`-byte unsigned pattern as a two's-complement value
///
/// If `raw` exceeds the signed maximum for the width, the result is
/// `raw - 2^(8 * width)`. Bits above the width are ignored.
pub fn sign_recover(raw: u64, width: usize) -> i64 {
    debug_assert!(
        (1..=8).contains(&width),
        "Integer width out of range: {}",
        width
    );

    let modulus = 1i128 << (8 * width);
    let signed_max = (modulus >> 1) - 1;
    let raw = (raw as i128) & (modulus - 1);

    if raw > signed_max {
        (raw - modulus) as i64
    } else {
        raw as i64
    }
}

/// Write a signed integer as its `dst.len()`-byte two's-complement pattern
pub fn put_int(dst: &mut [u8], value: i64, endian: Endian) {
    put_uint(dst, value as u64, endian);
}

/// Read a `src.len()`-byte signed integer
pub fn get_int(src: &[u8], endian: Endian) -> i64 {
    sign_recover(get_uint(src, endian), src.len())
}
