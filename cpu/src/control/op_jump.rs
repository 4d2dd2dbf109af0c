//! ## Jumps, group 4
//!
//! - 40, 44: unconditional
//! - 41, 45: if A is negative
//! - 42, 46: if A is zero
//! - 43, 47: if the overflow flag is set; the flag is cleared
//!
//! 40 to 43 continue with the first instruction of the word at N,
//! 44 to 47 with the second.
use base::prelude::*;
use tracing::{event, Level};

use crate::alu;

use super::{completed, ControlUnit, OpResult, ProgramCounterChange};

impl ControlUnit {
    pub(super) fn op_jump(&mut self, inst: Instruction) -> OpResult {
        let taken = match inst.function() & 3 {
            0 => true,
            1 => alu::is_negative(self.regs.acc),
            2 => alu::is_zero(self.regs.acc),
            _ => std::mem::replace(&mut self.regs.overflow, false),
        };
        if !taken {
            return completed();
        }
        let half = (inst.function() >> 2) & 1;
        event!(Level::TRACE, "jump to {}{}", inst.address(), if half == 0 { "" } else { "+" });
        Ok((
            ProgramCounterChange::Jump {
                addr: inst.address(),
                half,
            },
            std::time::Duration::ZERO,
            false,
        ))
    }
}
