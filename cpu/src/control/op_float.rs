//! ## Floating point, group 6
//!
//! 60 A+N, 61 A-N, 62 N-A, 63 A×N, 64 A÷N, 65 end-around shift of A
//! (or, for addresses of 4096 and above, conversion of A from fixed
//! to floating point), 66 integer division of A by N, 67 integer
//! square root of A.  The result always goes to A.
use base::prelude::*;

use crate::fpu;
use crate::memory::Store;

use super::op_shift::shift_count;
use super::{ControlUnit, OpResult, ProgramCounterChange};

/// Addresses at or above this make function 65 convert rather than
/// shift.
const CONVERT_THRESHOLD: u16 = 4096;

impl ControlUnit {
    pub(super) fn op_float(&mut self, inst: Instruction, store: &Store) -> OpResult {
        let a = self.regs.acc;
        let n = || store.read(u32::from(inst.address()));
        let (result, overflow) = match inst.function() {
            0 => fpu::add(a, n()),
            1 => fpu::sub(a, n()),
            2 => fpu::sub(n(), a),
            3 => fpu::mul(a, n()),
            4 => fpu::div(a, n()),
            5 if inst.address() >= CONVERT_THRESHOLD => fpu::convert(a),
            5 => fpu::shl(a, shift_count(inst)),
            6 => match fpu::sdiv(a, n()) {
                Some((quotient, overflow)) => {
                    self.regs.overflow |= overflow;
                    (quotient, false)
                }
                None => (Word::ZERO, true),
            },
            _ => fpu::sqrt(a),
        };
        self.regs.acc = result;
        Ok((
            ProgramCounterChange::CounterUpdate,
            std::time::Duration::ZERO,
            overflow,
        ))
    }
}
