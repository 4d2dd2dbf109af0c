//! Binary representation of instructions and instruction pairs.
//!
//! An instruction occupies 19 bits:
//!
//! | Function (opcode) | Address |
//! |-------------------|---------|
//! | 6 bits (13-18)    | 13 bits (0-12) |
//!
//! The function is conventionally written as two octal digits and
//! the address in decimal, so `40 128` is an unconditional jump to
//! the first instruction of word 128.
//!
//! A word holds two instructions and the B-line modifier bit:
//!
//! | First instruction | B     | Second instruction |
//! |-------------------|-------|--------------------|
//! | 19 bits (20-38)   | 1 bit (19) | 19 bits (0-18) |
//!
//! When the B bit is set, the second instruction is modified before
//! it is obeyed by adding the contents of the location addressed by
//! the first instruction.  In written form a pair is shown as
//! `26 4 : 06 0`, with `/` instead of `:` when B is set.

use std::fmt::{self, Debug, Formatter};

use serde::Serialize;

use super::word::Word;

mod format;

/// Number of bits in one instruction.
pub const INSTRUCTION_BITS: u32 = 19;

/// Mask selecting the 19 bits of an instruction.
pub const INSTRUCTION_MASK: u32 = (1 << INSTRUCTION_BITS) - 1;

/// Number of bits in the address field of an instruction.
pub const ADDRESS_BITS: u32 = 13;

/// Mask selecting an address; there are 8192 words of store.
pub const ADDRESS_MASK: u16 = (1 << ADDRESS_BITS) - 1;

/// Mask selecting a function code (0o00 to 0o77).
pub const OPCODE_MASK: u8 = 0o77;

const B_BIT_POS: u32 = INSTRUCTION_BITS;
const FIRST_POS: u32 = INSTRUCTION_BITS + 1;

/// One instruction: a 6-bit function and a 13-bit address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Instruction(u32);

impl Instruction {
    /// Build an instruction; out-of-range fields are masked.
    pub const fn new(opcode: u8, address: u16) -> Instruction {
        let op = (opcode & OPCODE_MASK) as u32;
        let addr = (address & ADDRESS_MASK) as u32;
        Instruction((op << ADDRESS_BITS) | addr)
    }

    /// Build an instruction from the low 19 bits of `bits`.
    pub const fn from_bits(bits: u32) -> Instruction {
        Instruction(bits & INSTRUCTION_MASK)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn opcode(self) -> u8 {
        ((self.0 >> ADDRESS_BITS) as u8) & OPCODE_MASK
    }

    pub const fn address(self) -> u16 {
        (self.0 as u16) & ADDRESS_MASK
    }

    /// The top three bits of the function code.  The group selects
    /// the broad class of instruction (arithmetic, jump, shift,
    /// floating point, input/output).
    pub const fn group(self) -> u8 {
        self.opcode() >> 3
    }

    /// The bottom three bits of the function code.
    pub const fn function(self) -> u8 {
        self.opcode() & 0o7
    }

    /// Add `delta` to the whole 19-bit instruction, as B-line
    /// modification does.  A carry out of the address field changes
    /// the function code; a carry out of the function code is lost.
    pub const fn modified_by(self, delta: u64) -> Instruction {
        let sum = (self.0 as u64).wrapping_add(delta);
        Instruction((sum as u32) & INSTRUCTION_MASK)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:02o} {}", self.opcode(), self.address())
    }
}

/// The decoded form of a word which holds two instructions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct InstructionPair {
    pub first: Instruction,
    pub b_modified: bool,
    pub second: Instruction,
}

impl InstructionPair {
    pub const fn new(first: Instruction, b_modified: bool, second: Instruction) -> InstructionPair {
        InstructionPair {
            first,
            b_modified,
            second,
        }
    }
}

impl Word {
    /// Pack two instructions and the B bit into a word.
    pub const fn from_instructions(
        first: Instruction,
        b_modified: bool,
        second: Instruction,
    ) -> Word {
        let b: u64 = if b_modified { 1 } else { 0 };
        Word::from_bits(
            ((first.bits() as u64) << FIRST_POS) | (b << B_BIT_POS) | (second.bits() as u64),
        )
    }

    pub const fn first_instruction(self) -> Instruction {
        Instruction::from_bits((self.bits() >> FIRST_POS) as u32)
    }

    pub const fn b_bit(self) -> bool {
        (self.bits() >> B_BIT_POS) & 1 != 0
    }

    pub const fn second_instruction(self) -> Instruction {
        Instruction::from_bits(self.bits() as u32)
    }
}

impl From<Word> for InstructionPair {
    fn from(w: Word) -> InstructionPair {
        InstructionPair {
            first: w.first_instruction(),
            b_modified: w.b_bit(),
            second: w.second_instruction(),
        }
    }
}

impl From<InstructionPair> for Word {
    fn from(pair: InstructionPair) -> Word {
        Word::from_instructions(pair.first, pair.b_modified, pair.second)
    }
}
