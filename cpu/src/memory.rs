//! The core store.
//!
//! The store holds 8192 words.  Addresses wrap around: every address
//! is reduced modulo the store size before use.  Locations 0 to 3
//! hold the initial instructions, which load a program from tape.
//! They are wired rather than stored: programs can execute them but
//! reading them as data yields zero and writing to them has no
//! effect.
use std::error;
use std::fmt::{self, Debug, Display, Formatter};

use tracing::{event, Level};

use base::prelude::*;

#[cfg(test)]
mod tests;

pub const STORE_SIZE: usize = 8192;

/// The number of wired locations at the bottom of the store.
pub const INITIAL_INSTRUCTION_COUNT: usize = 4;

/// The initial instructions (`26 4 : 06 0`, `22 4 / 16 3`,
/// `55 5 : 71 0`, `43 1 : 40 2`).
///
/// These read characters from reader 1, assembling each group of
/// characters into a word which is then stored at the address given
/// by the first word of the tape.  They finish by transferring
/// control to the loaded program.
pub const INITIAL_INSTRUCTIONS: [Word; INITIAL_INSTRUCTION_COUNT] = [
    Word::from_instructions(Instruction::new(0o26, 4), false, Instruction::new(0o06, 0)),
    Word::from_instructions(Instruction::new(0o22, 4), true, Instruction::new(0o16, 3)),
    Word::from_instructions(Instruction::new(0o55, 5), false, Instruction::new(0o71, 0)),
    Word::from_instructions(Instruction::new(0o43, 1), false, Instruction::new(0o40, 2)),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    WrongSize { expected: usize, got: usize },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            SnapshotError::WrongSize { expected, got } => {
                write!(f, "store image has {got} words, expected {expected}")
            }
        }
    }
}

impl error::Error for SnapshotError {}

fn wrap(addr: u32) -> usize {
    (addr as usize) % STORE_SIZE
}

pub struct Store {
    words: Box<[Word; STORE_SIZE]>,
}

impl Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let in_use = self.words.iter().filter(|w| !w.is_zero()).count();
        f.debug_struct("Store")
            .field("non_zero_words", &in_use)
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Store {
        let mut words = Box::new([Word::ZERO; STORE_SIZE]);
        words[..INITIAL_INSTRUCTION_COUNT].copy_from_slice(&INITIAL_INSTRUCTIONS);
        Store { words }
    }

    /// Read a word to be executed.
    pub fn fetch(&self, addr: u32) -> Word {
        self.words[wrap(addr)]
    }

    /// Read a word as an operand.
    pub fn read(&self, addr: u32) -> Word {
        match wrap(addr) {
            a if a < INITIAL_INSTRUCTION_COUNT => Word::ZERO,
            a => self.words[a],
        }
    }

    pub fn write(&mut self, addr: u32, value: Word) {
        match wrap(addr) {
            a if a < INITIAL_INSTRUCTION_COUNT => {
                event!(Level::TRACE, "ignoring write of {value} to wired location {a}");
            }
            a => self.words[a] = value,
        }
    }

    /// Zero the whole store apart from the initial instructions.
    pub fn clear(&mut self) {
        self.words[INITIAL_INSTRUCTION_COUNT..].fill(Word::ZERO);
    }

    /// All 8192 words, as `fetch` would see them.
    pub fn words(&self) -> &[Word] {
        &self.words[..]
    }

    /// Replace the store contents.  The image must cover the whole
    /// store; its first four words are ignored.
    pub fn restore(&mut self, image: &[Word]) -> Result<(), SnapshotError> {
        if image.len() != STORE_SIZE {
            return Err(SnapshotError::WrongSize {
                expected: STORE_SIZE,
                got: image.len(),
            });
        }
        self.words[INITIAL_INSTRUCTION_COUNT..].copy_from_slice(&image[INITIAL_INSTRUCTION_COUNT..]);
        Ok(())
    }

    /// Write consecutive words starting at `addr`, wrapping at the top
    /// of the store and skipping the wired locations.
    pub fn load(&mut self, addr: u32, words: &[Word]) {
        for (offset, w) in (0u32..).zip(words.iter()) {
            self.write(addr.wrapping_add(offset), *w);
        }
    }
}
