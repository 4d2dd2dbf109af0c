/// Human-oriented formatting and parsing for instructions.
///
/// Function codes are written as two octal digits and addresses in
/// decimal, which is how programs for the machine were written by
/// hand: `30 100` loads location 100 into the accumulator.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::{Instruction, InstructionPair, ADDRESS_MASK, OPCODE_MASK};
use crate::error::ParseInstructionError;

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:02o} {}", self.opcode(), self.address())
    }
}

impl Display for InstructionPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let separator = if self.b_modified { '/' } else { ':' };
        write!(f, "{} {} {}", self.first, separator, self.second)
    }
}

fn parse_opcode(s: &str) -> Result<u8, ParseInstructionError> {
    match u8::from_str_radix(s, 8) {
        Ok(op) if op <= OPCODE_MASK && s.len() <= 2 => Ok(op),
        _ => Err(ParseInstructionError::BadOpcode(s.to_string())),
    }
}

fn parse_address(s: &str) -> Result<u16, ParseInstructionError> {
    match s.parse::<u16>() {
        Ok(addr) if addr <= ADDRESS_MASK => Ok(addr),
        _ => Err(ParseInstructionError::BadAddress(s.to_string())),
    }
}

impl FromStr for Instruction {
    type Err = ParseInstructionError;

    fn from_str(s: &str) -> Result<Instruction, ParseInstructionError> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        match fields.as_slice() {
            [op, addr] => Ok(Instruction::new(parse_opcode(op)?, parse_address(addr)?)),
            _ => Err(ParseInstructionError::Malformed(s.to_string())),
        }
    }
}

impl FromStr for InstructionPair {
    type Err = ParseInstructionError;

    /// Parses `OP ADDR : OP ADDR` or `OP ADDR / OP ADDR`.  A single
    /// instruction is also accepted, and is paired with `00 0`.
    fn from_str(s: &str) -> Result<InstructionPair, ParseInstructionError> {
        let (first, b_modified, second) = match s.find([':', '/']) {
            Some(pos) => (&s[..pos], s[pos..].starts_with('/'), &s[pos + 1..]),
            None => (s, false, "00 0"),
        };
        let first: Instruction = first.parse()?;
        let second: Instruction = second.parse()?;
        Ok(InstructionPair::new(first, b_modified, second))
    }
}
