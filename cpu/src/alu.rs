//! The arithmetic unit's integer operations.
//!
//! Every operation sign-extends its operands to a host integer,
//! computes an exact result, and then truncates the result back to
//! 39 bits.  The returned flag is true when the exact result did not
//! fit; the control unit folds it into the (sticky) overflow flag.
//! This mirrors the `overflowing_*` methods of the native integer
//! types.
//!
//! The double-length operations work on a 77-bit value held as a
//! [`DoubleLength`]: the accumulator supplies the sign and the 38
//! most significant value bits, the auxiliary register the 38 least
//! significant bits.  128-bit host arithmetic is wide enough for all
//! of these (a double-length product needs 78 bits).
use base::prelude::*;

#[cfg(test)]
mod tests;

/// A 77-bit signed quantity: `high` holds the sign and the top 38
/// bits, `ext` the bottom 38 bits (always non-negative).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoubleLength {
    pub high: Word,
    pub ext: u64,
}

impl DoubleLength {
    pub fn new(high: Word, ext: u64) -> DoubleLength {
        DoubleLength {
            high,
            ext: ext & MAGNITUDE_MASK,
        }
    }

    pub fn to_i128(self) -> i128 {
        (i128::from(self.high.to_i64()) << MAGNITUDE_BITS) | i128::from(self.ext)
    }

    /// Split a host value into the two registers.  Only the low 77
    /// bits of `n` are kept.
    fn from_i128_truncating(n: i128) -> DoubleLength {
        DoubleLength {
            high: Word::from_bits((n >> MAGNITUDE_BITS) as u64),
            ext: (n as u64) & MAGNITUDE_MASK,
        }
    }
}

const DOUBLE_BITS: u32 = WORD_BITS + MAGNITUDE_BITS;

fn fits_in_word(n: i64) -> bool {
    // The bits above the sign bit must all be copies of it.
    let above = n >> (WORD_BITS - 1);
    above == 0 || above == -1
}

fn fits_in_double(n: i128) -> bool {
    let above = n >> (DOUBLE_BITS - 1);
    above == 0 || above == -1
}

fn truncate_double(n: i128) -> i128 {
    (n << (128 - DOUBLE_BITS)) >> (128 - DOUBLE_BITS)
}

fn checked_result(n: i64) -> (Word, bool) {
    (Word::from_i64(n), !fits_in_word(n))
}

pub fn add(a: Word, b: Word) -> (Word, bool) {
    checked_result(a.to_i64() + b.to_i64())
}

pub fn sub(a: Word, b: Word) -> (Word, bool) {
    checked_result(a.to_i64() - b.to_i64())
}

pub fn and(a: Word, b: Word) -> (Word, bool) {
    checked_result(a.to_i64() & b.to_i64())
}

pub fn negate(a: Word) -> (Word, bool) {
    sub(Word::ZERO, a)
}

/// Arithmetic left shift by `places`.  Overflow is reported if any
/// bit that differs from the resulting sign bit is shifted through
/// the sign position, at any step of the shift.
pub fn shl(a: Word, places: u32) -> (Word, bool) {
    let n = a.to_i64();
    // With a 39-bit operand in a 64-bit host integer, up to 25
    // places can be shifted without losing any bits, so the exact
    // result tells us everything.  Once the magnitude exceeds the
    // word it can never come back into range, so "out of range at
    // the end" is the same as "out of range at some step".
    if places <= 64 - WORD_BITS {
        return checked_result(n << places);
    }
    let mut value = n;
    let mut overflow = false;
    for _ in 0..places {
        if value == 0 {
            break;
        }
        value <<= 1;
        if !fits_in_word(value) {
            overflow = true;
            value = Word::from_i64(value).to_i64();
        }
    }
    (Word::from_i64(value), overflow)
}

/// Logical right shift by `places`; vacated bits are filled with
/// zero.  A right shift cannot overflow.
pub fn shr(a: Word, places: u32) -> (Word, bool) {
    if places >= WORD_BITS {
        (Word::ZERO, false)
    } else {
        (Word::from_bits(a.bits() >> places), false)
    }
}

/// Single-length product.  Overflow is reported when the product
/// does not fit in a word.
pub fn mul(a: Word, b: Word) -> (Word, bool) {
    let (x, y) = (a.to_i64(), b.to_i64());
    let small = |n: i64| i64::from(i32::MIN) <= n && n <= i64::from(i32::MAX);
    if small(x) && small(y) {
        checked_result(x * y)
    } else {
        let product = i128::from(x) * i128::from(y);
        let above = product >> (WORD_BITS - 1);
        (Word::from_bits(product as u64), above != 0 && above != -1)
    }
}

/// Double-length product of two words.  The product of two 39-bit
/// signed values always fits in 77 bits except for (-2^38)², which
/// overflows.
pub fn long_mul(a: Word, b: Word) -> (DoubleLength, bool) {
    let product = i128::from(a.to_i64()) * i128::from(b.to_i64());
    (
        DoubleLength::from_i128_truncating(product),
        !fits_in_double(product),
    )
}

/// Divide a double-length value by a word.  The quotient is
/// truncated toward zero and replaces the high word; the extension
/// is cleared.  Division by zero yields zero and overflow.
pub fn long_div(dividend: DoubleLength, divisor: Word) -> (DoubleLength, bool) {
    if divisor.is_zero() {
        return (DoubleLength::default(), true);
    }
    let quotient = dividend.to_i128() / i128::from(divisor.to_i64());
    let overflow = match i64::try_from(quotient) {
        Ok(q) => !fits_in_word(q),
        Err(_) => true,
    };
    (
        DoubleLength {
            high: Word::from_bits(quotient as u64),
            ext: 0,
        },
        overflow,
    )
}

/// Arithmetic left shift of a double-length value; overflow is
/// reported as for [`shl`].
pub fn long_shl(value: DoubleLength, places: u32) -> (DoubleLength, bool) {
    let n = value.to_i128();
    if places <= 128 - DOUBLE_BITS {
        let shifted = n << places;
        return (
            DoubleLength::from_i128_truncating(shifted),
            !fits_in_double(shifted),
        );
    }
    let mut v = n;
    let mut overflow = false;
    for _ in 0..places {
        if v == 0 {
            break;
        }
        v <<= 1;
        if !fits_in_double(v) {
            overflow = true;
            v = truncate_double(v);
        }
    }
    (DoubleLength::from_i128_truncating(v), overflow)
}

/// Arithmetic right shift of a double-length value; this never
/// overflows.
pub fn long_shr(value: DoubleLength, places: u32) -> (DoubleLength, bool) {
    let n = value.to_i128() >> places.min(127);
    (DoubleLength::from_i128_truncating(n), false)
}

pub fn is_zero(a: Word) -> bool {
    a.is_zero()
}

pub fn is_negative(a: Word) -> bool {
    a.is_negative()
}
