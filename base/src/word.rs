//! The machine's 39-bit word.
//!
//! A word is carried in a `u64` whose top 25 bits are always zero.
//! The same 39 bits can be viewed three ways:
//!
//! - as a two's-complement signed integer (bit 38 is the sign, so the
//!   range is -2^38 to 2^38-1);
//! - as an unstructured bit pattern, which is how instruction pairs
//!   and the logical operations see it;
//! - as a floating-point number (see the [`crate::float`] module).
//!
//! Every constructor masks to 39 bits, so a `Word` value can never
//! carry stray high-order bits.
use std::fmt::{self, Debug, Display, Formatter, Octal};

use serde::{Deserialize, Serialize};

use super::error::ConversionFailed;

#[cfg(test)]
mod tests;

/// Number of bits in a word.
pub const WORD_BITS: u32 = 39;

/// Mask selecting the 39 bits of a word.
pub const WORD_MASK: u64 = (1 << WORD_BITS) - 1;

/// The sign bit (bit 38).
pub const SIGN_BIT: u64 = 1 << (WORD_BITS - 1);

/// Number of significant (non-sign) bits.  The auxiliary register
/// holds exactly this many bits.
pub const MAGNITUDE_BITS: u32 = WORD_BITS - 1;

/// Mask selecting the 38 magnitude bits.
pub const MAGNITUDE_MASK: u64 = (1 << MAGNITUDE_BITS) - 1;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Word(u64);

impl Word {
    pub const ZERO: Word = Word(0);
    pub const ONE: Word = Word(1);

    /// The largest positive value, 2^38-1 (137438953471).
    pub const MAX: Word = Word(SIGN_BIT - 1);

    /// The most negative value, -2^38.
    pub const MIN: Word = Word(SIGN_BIT);

    /// All bits set.  Numerically this is -1.  It is also the value
    /// produced by a floating-point operation whose result is too
    /// large to represent.
    pub const NOTHING: Word = Word(WORD_MASK);

    /// Build a word from the low 39 bits of `bits`; any higher bits
    /// are discarded.
    pub const fn from_bits(bits: u64) -> Word {
        Word(bits & WORD_MASK)
    }

    /// The word as an unsigned bit pattern.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The word as a sign-extended integer.
    pub const fn to_i64(self) -> i64 {
        ((self.0 << (64 - WORD_BITS)) as i64) >> (64 - WORD_BITS)
    }

    /// Truncate a signed host integer to 39 bits (two's-complement
    /// wrap-around, not saturation).
    pub const fn from_i64(n: i64) -> Word {
        Word((n as u64) & WORD_MASK)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 & SIGN_BIT != 0
    }

    /// The 38 magnitude bits (that is, the word without its sign
    /// bit).  This is the value the auxiliary register can hold.
    pub const fn magnitude_bits(self) -> u64 {
        self.0 & MAGNITUDE_MASK
    }

    /// Counts the bits following the sign bit which are equal to the
    /// sign bit, scanning down from bit 37.  This is the number of
    /// places the word could be shifted left without overflow.  Zero
    /// and -1 both give 38.
    pub const fn leading_sign_bits(self) -> u32 {
        let sign = self.is_negative();
        let mut count = 0;
        let mut pos = MAGNITUDE_BITS;
        while pos > 0 {
            pos -= 1;
            let bit = self.0 & (1 << pos) != 0;
            if bit != sign {
                break;
            }
            count += 1;
        }
        count
    }
}

impl TryFrom<u64> for Word {
    type Error = ConversionFailed;
    fn try_from(n: u64) -> Result<Word, ConversionFailed> {
        if n > WORD_MASK {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Word(n))
        }
    }
}

impl TryFrom<i64> for Word {
    type Error = ConversionFailed;
    fn try_from(n: i64) -> Result<Word, ConversionFailed> {
        if n > Word::MAX.to_i64() {
            Err(ConversionFailed::TooLarge)
        } else if n < Word::MIN.to_i64() {
            Err(ConversionFailed::TooSmall)
        } else {
            Ok(Word::from_i64(n))
        }
    }
}

impl From<u32> for Word {
    fn from(n: u32) -> Word {
        Word(u64::from(n))
    }
}

impl From<u16> for Word {
    fn from(n: u16) -> Word {
        Word(u64::from(n))
    }
}

impl From<u8> for Word {
    fn from(n: u8) -> Word {
        Word(u64::from(n))
    }
}

impl From<Word> for u64 {
    fn from(w: Word) -> u64 {
        w.bits()
    }
}

impl From<Word> for i64 {
    fn from(w: Word) -> i64 {
        w.to_i64()
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        // Always display as octal.
        write!(f, "{:>013o}", self.0)
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:>013o}", self.0)
    }
}

impl Octal for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let val = self.0;
        Octal::fmt(&val, f) // delegate to u64's implementation
    }
}
