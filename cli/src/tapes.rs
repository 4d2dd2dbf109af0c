use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;

use tracing::{event, Level};

/// The tapes named on the command line, to be loaded into reader 1
/// one after another.
#[derive(Debug)]
pub struct TapeSequence {
    pos: usize,
    names: Vec<OsString>,
}

impl TapeSequence {
    pub fn new(names: Vec<OsString>) -> TapeSequence {
        TapeSequence { pos: 0, names }
    }

    pub fn remaining(&self) -> usize {
        self.names.len().saturating_sub(self.pos)
    }

    pub fn next_tape(&mut self) -> Result<Option<File>, io::Error> {
        match self.names.get(self.pos) {
            Some(name) => {
                self.pos += 1;
                event!(Level::INFO, "loading tape {:?}", name);
                OpenOptions::new().read(true).open(name).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[test]
fn test_empty_sequence() {
    let mut tapes = TapeSequence::new(Vec::new());
    assert_eq!(tapes.remaining(), 0);
    assert!(matches!(tapes.next_tape(), Ok(None)));
}

#[test]
fn test_missing_tape_is_an_error() {
    let mut tapes = TapeSequence::new(vec![OsString::from("/nonexistent/e803/tape")]);
    assert_eq!(tapes.remaining(), 1);
    assert!(tapes.next_tape().is_err());
    assert_eq!(tapes.remaining(), 0);
}
