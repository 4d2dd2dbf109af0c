//! ## Shifts, multiplication and division, group 5
//!
//! The shift count is the low seven bits of the address.  The
//! double-length forms treat A and AR as one 77-bit number; the
//! single-length forms clear AR.
//!
//! | Code | Effect |
//! | ---- | ------ |
//! | 50   | A,AR shifted right (arithmetic) |
//! | 51   | A shifted right (logical), AR cleared |
//! | 52   | A,AR = A × N |
//! | 53   | A = A × N, AR cleared |
//! | 54   | A,AR shifted left |
//! | 55   | A shifted left, AR cleared |
//! | 56   | A = A,AR ÷ N, AR cleared |
//! | 57   | A = AR |
use base::prelude::*;

use crate::alu::{self, DoubleLength};
use crate::memory::Store;

use super::{completed, ControlUnit, OpResult};

/// The shift count field of a group 5 instruction.
pub(crate) fn shift_count(inst: Instruction) -> u32 {
    u32::from(inst.address() & 127)
}

impl ControlUnit {
    fn double_length(&self) -> DoubleLength {
        DoubleLength::new(self.regs.acc, self.regs.ar)
    }

    fn set_double_length(&mut self, value: DoubleLength, overflow: bool) {
        self.regs.acc = value.high;
        self.regs.ar = value.ext;
        self.regs.overflow |= overflow;
    }

    fn set_single_length(&mut self, value: Word, overflow: bool) {
        self.regs.acc = value;
        self.regs.ar = 0;
        self.regs.overflow |= overflow;
    }

    pub(super) fn op_shift(&mut self, inst: Instruction, store: &Store) -> OpResult {
        let count = shift_count(inst);
        let operand = || store.read(u32::from(inst.address()));
        match inst.function() {
            0 => {
                let (v, o) = alu::long_shr(self.double_length(), count);
                self.set_double_length(v, o);
            }
            1 => {
                let (v, o) = alu::shr(self.regs.acc, count);
                self.set_single_length(v, o);
            }
            2 => {
                let (v, o) = alu::long_mul(self.regs.acc, operand());
                self.set_double_length(v, o);
            }
            3 => {
                let (v, o) = alu::mul(self.regs.acc, operand());
                self.set_single_length(v, o);
            }
            4 => {
                let (v, o) = alu::long_shl(self.double_length(), count);
                self.set_double_length(v, o);
            }
            5 => {
                let (v, o) = alu::shl(self.regs.acc, count);
                self.set_single_length(v, o);
            }
            6 => {
                let (v, o) = alu::long_div(self.double_length(), operand());
                self.set_single_length(v.high, o);
            }
            _ => {
                self.regs.acc = Word::from_bits(self.regs.ar);
            }
        }
        completed()
    }
}
