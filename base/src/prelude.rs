//! The prelude exports the types which are useful in representing
//! things to do with the machine.  Providing this prelude is the
//! main purpose of the base crate.
pub use super::error::*;
pub use super::float::{EXPONENT_BIAS, EXPONENT_MAX};
pub use super::instruction::*;
pub use super::pair;
pub use super::word::*;
