//! The floating-point view of a word.
//!
//! | Mantissa                   | Exponent             |
//! |----------------------------|----------------------|
//! | 30 bits (9-38)             | 9 bits (0-8)         |
//!
//! The mantissa is a two's-complement fraction: its top bit is the
//! sign and the other 29 bits follow the binary point.  The exponent
//! is unsigned and biased by 256, so the value of a word is
//! `mantissa × 2^(exponent − 256)`.  A normalised mantissa has its
//! sign bit and the bit after it different; that is, its magnitude
//! lies in [0.5, 1) for positive numbers and [-1, -0.5) for negative
//! ones.  The all-zero word is 0.0.
//!
//! Every value representable in this format is exactly representable
//! as an `f64`, so decoding cannot fail.  Encoding can: the exponent
//! may be too large (overflow) or too small (underflow).
use super::error::FloatRangeError;
use super::word::Word;


pub const MANTISSA_BITS: u32 = 30;
pub const EXPONENT_BITS: u32 = 9;
pub const EXPONENT_BIAS: i32 = 256;
pub const EXPONENT_MAX: i32 = (1 << EXPONENT_BITS) - 1;

const EXPONENT_MASK: u64 = (1 << EXPONENT_BITS) - 1;
const MANTISSA_MASK: u64 = (1 << MANTISSA_BITS) - 1;
const FRACTION_BITS: i32 = MANTISSA_BITS as i32 - 1;

const F64_FRACTION_BITS: u32 = 52;
const F64_EXPONENT_BIAS: i32 = 1023;
const F64_EXPONENT_MASK: u64 = 0x7ff;
const F64_FRACTION_MASK: u64 = (1 << F64_FRACTION_BITS) - 1;

/// An exact power of two.  `n` must be within the normal range of
/// `f64`, which it always is for the exponents this format can
/// produce.
fn pow2(n: i32) -> f64 {
    f64::from_bits(((n + F64_EXPONENT_BIAS) as u64) << F64_FRACTION_BITS)
}

impl Word {
    /// The signed 30-bit mantissa, as an integer.
    pub const fn mantissa(self) -> i32 {
        let m = (self.bits() >> EXPONENT_BITS) as u32;
        ((m << (32 - MANTISSA_BITS)) as i32) >> (32 - MANTISSA_BITS)
    }

    /// The unbiased 9-bit exponent field.
    pub const fn exponent(self) -> i32 {
        (self.bits() & EXPONENT_MASK) as i32
    }

    /// Build a floating-point word from its fields.  Out-of-range
    /// fields are masked.
    pub const fn from_float_parts(mantissa: i32, exponent: i32) -> Word {
        Word::from_bits(
            (((mantissa as u64) & MANTISSA_MASK) << EXPONENT_BITS)
                | ((exponent as u64) & EXPONENT_MASK),
        )
    }

    /// Interpret the word as a floating-point number.
    pub fn to_f64(self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let mut mantissa = self.mantissa();
        if mantissa == 0 {
            return 0.0;
        }
        let mut exponent = self.exponent();
        // Normalise: shift left until the sign bit and the next bit
        // differ.
        const TOP_TWO: i32 = 0b11 << (MANTISSA_BITS - 2);
        const SIGN_ONLY: i32 = 0b10 << (MANTISSA_BITS - 2);
        let mut m = mantissa & ((1 << MANTISSA_BITS) - 1);
        while m & TOP_TWO == 0 || m & TOP_TWO == TOP_TWO {
            m = (m << 1) & ((1 << MANTISSA_BITS) - 1);
            exponent -= 1;
        }
        debug_assert!(m & TOP_TWO == SIGN_ONLY || m & TOP_TWO == (TOP_TWO ^ SIGN_ONLY));
        mantissa = (m << (32 - MANTISSA_BITS)) >> (32 - MANTISSA_BITS);
        f64::from(mantissa) * pow2(exponent - EXPONENT_BIAS - FRACTION_BITS)
    }

    /// Convert a host floating-point value to the machine format.
    /// The mantissa is truncated toward zero.  Both +0.0 and -0.0
    /// become the zero word.
    pub fn from_f64(x: f64) -> Result<Word, FloatRangeError> {
        if x == 0.0 {
            return Ok(Word::ZERO);
        }
        if !x.is_finite() {
            return Err(FloatRangeError::Overflow);
        }
        let bits = x.abs().to_bits();
        let biased = ((bits >> F64_FRACTION_BITS) & F64_EXPONENT_MASK) as i32;
        if biased == 0 {
            // Subnormal host values are far below 2^-256.
            return Err(FloatRangeError::Underflow);
        }
        // |x| = 1.f × 2^(biased-1023) = 0.1f × 2^(biased-1022).
        let mut exponent = biased - F64_EXPONENT_BIAS + 1 + EXPONENT_BIAS;
        let fraction = bits & F64_FRACTION_MASK;
        let magnitude: i32 = (1 << (FRACTION_BITS - 1))
            | (fraction >> (F64_FRACTION_BITS as i32 - (FRACTION_BITS - 1))) as i32;
        let mantissa = if x.is_sign_negative() {
            if magnitude == 1 << (FRACTION_BITS - 1) {
                // -0.5 is not normalised in two's complement; -1.0 with
                // the next lower exponent is.
                exponent -= 1;
                -(1 << FRACTION_BITS)
            } else {
                -magnitude
            }
        } else {
            magnitude
        };
        if exponent > EXPONENT_MAX {
            Err(FloatRangeError::Overflow)
        } else if exponent < 0 {
            Err(FloatRangeError::Underflow)
        } else {
            Ok(Word::from_float_parts(mantissa, exponent))
        }
    }
}
