//! The `base` crate defines the things which are useful in both the
//! simulator and other associated tools (an assembler or a tape
//! preparation utility, for example).  The idea is that such a tool
//! would depend on the base crate but would not need to depend on
//! the simulator library itself.
//!
//! The machine has a 39-bit word, which holds either a
//! two's-complement integer, a pair of 19-bit instructions or a
//! floating-point number.

mod error;

pub mod float;
pub mod instruction;
pub mod prelude;
pub mod word;

/// Builds an instruction pair word from its written form, for
/// example `pair!("26 4 : 06 0")`.  Panics if the text is not valid,
/// so this is intended for constant program text (such as the
/// initial instructions, or test programs).
#[macro_export]
macro_rules! pair {
    ($text:expr) => {
        match $text.parse::<$crate::prelude::InstructionPair>() {
            Ok(pair) => $crate::prelude::Word::from(pair),
            Err(e) => panic!("invalid instruction pair {:?}: {}", $text, e),
        }
    };
}

#[test]
fn test_pair_macro() {
    use prelude::*;
    let w: Word = pair!("40 128 : 00 0");
    assert_eq!(w.first_instruction(), Instruction::new(0o40, 128));
    assert!(!w.b_bit());
}
