//! ## Fixed-point arithmetic, groups 0 to 3
//!
//! The low three bits of the function code choose the operation;
//! `x` is A in groups 0 and 2 and N in groups 1 and 3.
//!
//! | f | result |
//! | - | ------ |
//! | 0 | x      |
//! | 1 | -x     |
//! | 2 | N + 1  |
//! | 3 | A & N  |
//! | 4 | A + N  |
//! | 5 | A - N  |
//! | 6 | 0      |
//! | 7 | N - A  |
//!
//! The group decides where the result goes:
//!
//! | Group | Effect |
//! | ----- | ------ |
//! | 0     | A' = f |
//! | 1     | A' = f, N' = A |
//! | 2     | N' = f |
//! | 3     | A' = f, N' = f |
use base::prelude::*;

use crate::alu;
use crate::memory::Store;

use super::{completed, ControlUnit, OpResult};

fn function(f: u8, x: Word, a: Word, n: Word) -> (Word, bool) {
    match f & 7 {
        0 => (x, false),
        1 => alu::negate(x),
        2 => alu::add(n, Word::ONE),
        3 => alu::and(a, n),
        4 => alu::add(a, n),
        5 => alu::sub(a, n),
        6 => (Word::ZERO, false),
        _ => alu::sub(n, a),
    }
}

impl ControlUnit {
    pub(super) fn op_arith(&mut self, inst: Instruction, store: &mut Store) -> OpResult {
        let addr = u32::from(inst.address());
        let a = self.regs.acc;
        let n = store.read(addr);
        let group = inst.group();
        let x = if group == 0 || group == 2 { a } else { n };
        let (result, overflow) = function(inst.function(), x, a, n);
        self.regs.overflow |= overflow;
        match group {
            0 => {
                self.regs.acc = result;
            }
            1 => {
                self.regs.acc = result;
                store.write(addr, a);
            }
            2 => {
                store.write(addr, result);
            }
            _ => {
                self.regs.acc = result;
                store.write(addr, result);
            }
        }
        completed()
    }
}
