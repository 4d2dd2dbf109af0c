//! Instruction timing.
//!
//! Times are in machine cycles.  Most instructions take two cycles
//! and jumps one.  Shifts take longer the further they shift, and
//! multiplication and division take longer the more significant
//! bits the accumulator holds.
use std::time::Duration;

use base::prelude::*;

use crate::clock::Cycles;

use super::op_shift::shift_count;

const BASIC: Cycles = 2;
const JUMP: Cycles = 1;

pub fn instruction_cycles(inst: Instruction, acc_before: Word) -> Cycles {
    let significant = || Cycles::from(MAGNITUDE_BITS - acc_before.leading_sign_bits());
    match (inst.group(), inst.function()) {
        (4, _) => JUMP,
        (5, 0 | 1 | 4 | 5) => BASIC + Cycles::from(shift_count(inst).div_ceil(4)),
        (5, 2 | 3) => BASIC + significant() / 2,
        (5, 6) => BASIC + 2 + significant(),
        _ => BASIC,
    }
}

/// The number of whole cycles covering `delay`.
pub fn cycles_for_delay(delay: Duration, cycle_time: Duration) -> Cycles {
    if delay.is_zero() || cycle_time.is_zero() {
        return 0;
    }
    let cycles = delay.as_nanos().div_ceil(cycle_time.as_nanos());
    Cycles::try_from(cycles).unwrap_or(Cycles::MAX)
}

#[test]
fn test_basic_timings() {
    let zero = Word::ZERO;
    assert_eq!(instruction_cycles(Instruction::new(0o30, 100), zero), 2);
    assert_eq!(instruction_cycles(Instruction::new(0o40, 100), zero), 1);
    assert_eq!(instruction_cycles(Instruction::new(0o43, 100), zero), 1);
    assert_eq!(instruction_cycles(Instruction::new(0o57, 0), zero), 2);
    assert_eq!(instruction_cycles(Instruction::new(0o74, 4096), zero), 2);
}

#[test]
fn test_shift_timings() {
    let zero = Word::ZERO;
    assert_eq!(instruction_cycles(Instruction::new(0o55, 0), zero), 2);
    assert_eq!(instruction_cycles(Instruction::new(0o55, 1), zero), 3);
    assert_eq!(instruction_cycles(Instruction::new(0o55, 4), zero), 3);
    assert_eq!(instruction_cycles(Instruction::new(0o55, 5), zero), 4);
    // Only the low seven address bits count.
    assert_eq!(instruction_cycles(Instruction::new(0o50, 128 + 8), zero), 4);
}

#[test]
fn test_multiply_divide_timings() {
    // Zero and -1 have no significant bits.
    assert_eq!(instruction_cycles(Instruction::new(0o52, 0), Word::ZERO), 2);
    assert_eq!(instruction_cycles(Instruction::new(0o53, 0), Word::NOTHING), 2);
    assert_eq!(instruction_cycles(Instruction::new(0o52, 0), Word::MAX), 2 + 19);
    assert_eq!(instruction_cycles(Instruction::new(0o56, 0), Word::ZERO), 4);
    assert_eq!(instruction_cycles(Instruction::new(0o56, 0), Word::ONE), 5);
    assert_eq!(instruction_cycles(Instruction::new(0o56, 0), Word::MIN), 4 + 38);
}

#[test]
fn test_delay_cycles() {
    let cycle = Duration::from_micros(288);
    assert_eq!(cycles_for_delay(Duration::ZERO, cycle), 0);
    assert_eq!(cycles_for_delay(Duration::from_micros(288), cycle), 1);
    assert_eq!(cycles_for_delay(Duration::from_micros(289), cycle), 2);
    // Reader: 2ms is just under 7 cycles.
    assert_eq!(cycles_for_delay(Duration::from_millis(2), cycle), 7);
}
