//! The floating-point unit.
//!
//! Operands are converted to `f64`, operated on, and converted back.
//! Every machine value is exactly representable as an `f64`, so the
//! only inexactness comes from the final conversion, which truncates
//! the mantissa.  The returned flag reports floating-point overflow;
//! underflow quietly yields zero.
use base::prelude::*;
use conv::*;
use tracing::{event, Level};

#[cfg(test)]
mod tests;

fn encode(x: f64) -> (Word, bool) {
    match Word::from_f64(x) {
        Ok(w) => (w, false),
        Err(FloatRangeError::Overflow) => {
            event!(Level::DEBUG, "floating-point overflow encoding {x}");
            (Word::NOTHING, true)
        }
        Err(FloatRangeError::Underflow) => (Word::ZERO, false),
    }
}

fn integer_as_f64(w: Word) -> f64 {
    // 39-bit integers are well inside the exact range of f64.
    f64::value_from(w.to_i64()).unwrap_or(f64::MAX)
}

pub fn add(a: Word, b: Word) -> (Word, bool) {
    encode(a.to_f64() + b.to_f64())
}

pub fn sub(a: Word, b: Word) -> (Word, bool) {
    encode(a.to_f64() - b.to_f64())
}

pub fn mul(a: Word, b: Word) -> (Word, bool) {
    encode(a.to_f64() * b.to_f64())
}

/// Floating-point division.  Division by zero reports overflow and
/// yields zero.
pub fn div(a: Word, b: Word) -> (Word, bool) {
    let divisor = b.to_f64();
    if divisor == 0.0 {
        (Word::ZERO, true)
    } else {
        encode(a.to_f64() / divisor)
    }
}

/// Convert an integer to floating-point form.
pub fn convert(a: Word) -> (Word, bool) {
    encode(integer_as_f64(a))
}

/// End-around left shift of all 39 bits.
pub fn shl(a: Word, places: u32) -> (Word, bool) {
    let n = places % WORD_BITS;
    let bits = a.bits();
    let rotated = if n == 0 {
        bits
    } else {
        (bits << n) | (bits >> (WORD_BITS - n))
    };
    (Word::from_bits(rotated), false)
}

/// Integer division of the accumulator, truncating toward zero.
///
/// Unlike the other functions here, the flag is an ordinary integer
/// overflow (only MIN / -1 leaves the range).  Division by zero gives
/// `None`, which the caller treats as for [`div`].
pub fn sdiv(a: Word, b: Word) -> Option<(Word, bool)> {
    if b.is_zero() {
        return None;
    }
    let quotient = a.to_i64() / b.to_i64();
    let overflow = quotient > Word::MAX.to_i64();
    Some((Word::from_i64(quotient), overflow))
}

/// Integer square root.  Negative operands give zero.
pub fn sqrt(a: Word) -> (Word, bool) {
    if a.is_negative() {
        return (Word::ZERO, false);
    }
    let root = integer_as_f64(a).sqrt();
    match root.approx_as_by::<i64, RoundToZero>() {
        Ok(n) => (Word::from_i64(n), false),
        Err(e) => {
            event!(Level::WARN, "square root {root} is not representable: {e}");
            (Word::ZERO, false)
        }
    }
}
