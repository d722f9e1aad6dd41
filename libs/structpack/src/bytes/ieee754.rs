//! IEEE-754 bit pattern encoding
//!
//! Two interchangeable strategies turn a float into an unsigned integer bit
//! pattern (and back):
//!
//! - **Reinterpretation**: `f32::to_bits` / `f64::to_bits`. Exact for every
//!   value, including infinities, NaN and negative zero.
//! - **Bit math**: [`pack_ieee754`] / [`unpack_ieee754`], which build the
//!   sign, exponent and significand fields arithmetically for any total width
//!   and exponent width.
//!
//! [`FloatFormat`] picks reinterpretation wherever Rust has a native type for
//! the width and falls back to bit math for binary16.

/// Encode `value` as an IEEE-754 style bit pattern of `bits` total bits with
/// an `exp_bits` wide exponent field
///
/// The magnitude is normalized to `1.f × 2^shift` by repeated halving or
/// doubling, the exponent is biased by `2^(exp_bits - 1) - 1` and the
/// significand is `round(f × 2^(bits - exp_bits - 1))`.
///
/// Known limitations of this encoding:
/// - `0.0` and `-0.0` both encode to `0`.
/// - The normalization loop never terminates on infinities, so non-finite
///   inputs are mapped to the all-ones exponent first: infinities keep their
///   sign with a zero significand, NaN becomes the positive quiet NaN.
/// - Magnitudes beyond the format's range saturate to infinity; magnitudes
///   below the smallest normal are encoded as subnormals.
pub fn pack_ieee754(value: f64, bits: u32, exp_bits: u32) -> u64 {
    debug_assert!(bits <= 64, "Bit width out of range: {}", bits);
    debug_assert!(
        exp_bits >= 2 && exp_bits + 2 <= bits,
        "Exponent width out of range: {}",
        exp_bits
    );

    let sig_bits = bits - exp_bits - 1;
    let bias = (1i64 << (exp_bits - 1)) - 1;
    let max_exp = (1i64 << exp_bits) - 1;
    let sig_scale = (1u64 << sig_bits) as f64;

    if value == 0.0 {
        return 0;
    }

    if value.is_nan() {
        return ((max_exp as u64) << sig_bits) | (1u64 << (sig_bits - 1));
    }

    let sign = u64::from(value < 0.0);
    let infinity = (sign << (bits - 1)) | ((max_exp as u64) << sig_bits);
    if value.is_infinite() {
        return infinity;
    }

    // Normalize to 1.f x 2^shift
    let mut fnorm = value.abs();
    let mut shift = 0i64;
    while fnorm >= 2.0 {
        fnorm /= 2.0;
        shift += 1;
    }
    while fnorm < 1.0 {
        fnorm *= 2.0;
        shift -= 1;
    }

    let mut exponent = shift + bias;
    if exponent >= max_exp {
        return infinity;
    }

    let significand = if exponent <= 0 {
        // Subnormal: exponent field 0 stands for 2^(1 - bias) with no implicit one.
        // A rounded significand of 2^sig_bits carries into exponent field 1.
        let mut scaled = fnorm;
        for _ in exponent..1 {
            scaled /= 2.0;
        }
        exponent = 0;
        (scaled * sig_scale).round() as u64
    } else {
        let mut significand = ((fnorm - 1.0) * sig_scale).round() as u64;
        if significand == 1u64 << sig_bits {
            significand = 0;
            exponent += 1;
            if exponent >= max_exp {
                return infinity;
            }
        }
        significand
    };

    (sign << (bits - 1)) | ((exponent as u64) << sig_bits) | significand
}

/// Decode a bit pattern produced by [`pack_ieee754`] (or any IEEE-754
/// encoder) with the same `bits` / `exp_bits`
///
/// Fields are extracted by mask and shift, and the magnitude is rebuilt by
/// repeated doubling or halving according to the unbiased exponent. An
/// all-ones exponent decodes to infinity or NaN; a zero exponent decodes as
/// a subnormal.
pub fn unpack_ieee754(raw: u64, bits: u32, exp_bits: u32) -> f64 {
    debug_assert!(bits <= 64, "Bit width out of range: {}", bits);

    let sig_bits = bits - exp_bits - 1;
    let bias = (1i64 << (exp_bits - 1)) - 1;
    let max_exp = (1u64 << exp_bits) - 1;
    let sig_scale = (1u64 << sig_bits) as f64;

    if raw == 0 {
        return 0.0;
    }

    let significand = raw & ((1u64 << sig_bits) - 1);
    let exponent = (raw >> sig_bits) & max_exp;
    let negative = (raw >> (bits - 1)) & 1 == 1;

    let magnitude = if exponent == max_exp {
        if significand == 0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        let (mut result, mut shift) = if exponent == 0 {
            (significand as f64 / sig_scale, 1 - bias)
        } else {
            (1.0 + significand as f64 / sig_scale, exponent as i64 - bias)
        };
        while shift > 0 {
            result *= 2.0;
            shift -= 1;
        }
        while shift < 0 {
            result /= 2.0;
            shift += 1;
        }
        result
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// IEEE-754 interchange formats handled by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatFormat {
    /// binary16: 1 sign, 5 exponent, 10 significand bits (bit math)
    Half,
    /// binary32 (`f32` reinterpretation)
    Single,
    /// binary64 (`f64` reinterpretation)
    Double,
}

impl FloatFormat {
    /// Total encoded width in bits
    pub fn bits(&self) -> u32 {
        match self {
            Self::Half => 16,
            Self::Single => 32,
            Self::Double => 64,
        }
    }

    /// Exponent field width in bits
    pub fn exp_bits(&self) -> u32 {
        match self {
            Self::Half => 5,
            Self::Single => 8,
            Self::Double => 11,
        }
    }

    /// Encoded width in bytes
    pub fn size(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Encode `value` into the low `bits()` bits of the result
    ///
    /// `Single` narrows `value` to `f32` first.
    pub fn encode(&self, value: f64) -> u64 {
        match self {
            Self::Half => pack_ieee754(value, self.bits(), self.exp_bits()),
            Self::Single => (value as f32).to_bits() as u64,
            Self::Double => value.to_bits(),
        }
    }

    /// Decode the low `bits()` bits of `raw`
    pub fn decode(&self, raw: u64) -> f64 {
        match self {
            Self::Half => unpack_ieee754(raw & 0xFFFF, self.bits(), self.exp_bits()),
            Self::Single => f32::from_bits(raw as u32) as f64,
            Self::Double => f64::from_bits(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 10] = [
        1.0,
        -1.0,
        0.5,
        25.0,
        -3.140625,
        1234.5678,
        1.0e-300,
        6.02214076e23,
        f64::MAX,
        f64::MIN_POSITIVE,
    ];

    #[test]
    fn test_bit_math_matches_reinterpretation_f64() {
        for value in SAMPLES {
            assert_eq!(
                pack_ieee754(value, 64, 11),
                value.to_bits(),
                "encode {}",
                value
            );
            assert_eq!(unpack_ieee754(value.to_bits(), 64, 11), value);
        }
    }

    #[test]
    fn test_bit_math_matches_reinterpretation_f32() {
        for value in [1.0f32, -2.5, 25.0, 0.1, 3.4028235e38, 1.1754944e-38] {
            assert_eq!(
                pack_ieee754(value as f64, 32, 8),
                value.to_bits() as u64,
                "encode {}",
                value
            );
            assert_eq!(
                unpack_ieee754(value.to_bits() as u64, 32, 8),
                value as f64
            );
        }
    }

    #[test]
    fn test_zero_loses_sign() {
        assert_eq!(pack_ieee754(0.0, 32, 8), 0);
        assert_eq!(pack_ieee754(-0.0, 32, 8), 0);
        assert_eq!(unpack_ieee754(0, 16, 5), 0.0);
    }

    #[test]
    fn test_half_known_patterns() {
        let cases = [
            (1.0, 0x3C00u64),
            (-2.0, 0xC000),
            (0.5, 0x3800),
            (65504.0, 0x7BFF),
            (6.103515625e-5, 0x0400),        // smallest normal
            (5.9604644775390625e-8, 0x0001), // smallest subnormal
        ];

        for (value, bits) in cases {
            assert_eq!(pack_ieee754(value, 16, 5), bits, "encode {}", value);
            assert_eq!(unpack_ieee754(bits, 16, 5), value, "decode {:#06x}", bits);
        }
    }

    #[test]
    fn test_half_saturates_and_rounds() {
        assert_eq!(pack_ieee754(1.0e6, 16, 5), 0x7C00);
        assert_eq!(pack_ieee754(-1.0e6, 16, 5), 0xFC00);
        // 65520 rounds past the largest finite half
        assert_eq!(pack_ieee754(65520.0, 16, 5), 0x7C00);
        // 1 + 2^-11 rounds to 1 + 2^-10
        assert_eq!(pack_ieee754(1.00048828125, 16, 5), 0x3C01);
    }

    #[test]
    fn test_non_finite_bit_math() {
        assert_eq!(pack_ieee754(f64::INFINITY, 16, 5), 0x7C00);
        assert_eq!(pack_ieee754(f64::NEG_INFINITY, 16, 5), 0xFC00);
        assert_eq!(pack_ieee754(f64::NAN, 16, 5), 0x7E00);
        assert_eq!(unpack_ieee754(0x7C00, 16, 5), f64::INFINITY);
        assert_eq!(unpack_ieee754(0xFC00, 16, 5), f64::NEG_INFINITY);
        assert!(unpack_ieee754(0x7E00, 16, 5).is_nan());
    }

    #[test]
    fn test_float_format_reinterpretation_is_exact() {
        assert_eq!(FloatFormat::Single.encode(-0.0), 0x8000_0000);
        assert_eq!(FloatFormat::Double.encode(f64::INFINITY), 0x7FF0_0000_0000_0000);
        assert!(FloatFormat::Single.decode(FloatFormat::Single.encode(f64::NAN)).is_nan());
        assert_eq!(
            FloatFormat::Double.decode(FloatFormat::Double.encode(f64::NEG_INFINITY)),
            f64::NEG_INFINITY
        );
        assert!(FloatFormat::Double.decode(0x8000_0000_0000_0000).is_sign_negative());
    }

    #[test]
    fn test_float_format_sizes() {
        assert_eq!(FloatFormat::Half.size(), 2);
        assert_eq!(FloatFormat::Single.size(), 4);
        assert_eq!(FloatFormat::Double.size(), 8);
    }
}
