//! Basic error reporting.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Represents a failure to convert a native value to one of the
/// fixed-width types defined in the base crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionFailed {
    TooLarge,
    TooSmall,
}

impl Error for ConversionFailed {}

impl Display for ConversionFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConversionFailed::TooLarge => f.write_str("value is too large"),
            ConversionFailed::TooSmall => f.write_str("value is too small"),
        }
    }
}

/// A host floating-point value has no representation in the
/// machine's floating-point format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatRangeError {
    /// The binary exponent would exceed 511 (or the value is not
    /// finite).  The arithmetic unit represents this result as
    /// [`crate::word::Word::NOTHING`].
    Overflow,
    /// The binary exponent would be below 0.  The arithmetic unit
    /// represents this result as zero.
    Underflow,
}

impl Error for FloatRangeError {}

impl Display for FloatRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            FloatRangeError::Overflow => "floating-point overflow",
            FloatRangeError::Underflow => "floating-point underflow",
        })
    }
}

/// Failure to parse the textual form of an instruction or an
/// instruction pair (for example `26 4 : 06 0`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseInstructionError {
    /// The text did not have the shape `OP ADDR` or `OP ADDR : OP ADDR`.
    Malformed(String),
    /// The function code was not a two-digit octal number below 0o100.
    BadOpcode(String),
    /// The address was not a decimal number below 8192.
    BadAddress(String),
}

impl Error for ParseInstructionError {}

impl Display for ParseInstructionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ParseInstructionError::Malformed(s) => {
                write!(f, "'{s}' is not of the form 'OP ADDR : OP ADDR'")
            }
            ParseInstructionError::BadOpcode(s) => {
                write!(f, "'{s}' is not a valid (octal) function code")
            }
            ParseInstructionError::BadAddress(s) => {
                write!(f, "'{s}' is not a valid (decimal) address")
            }
        }
    }
}
