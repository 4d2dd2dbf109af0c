//! Paper tape readers.
//!
//! A reader delivers one five-hole character per transfer from a
//! byte stream supplied by the surrounding application.  Only the
//! low five bits of each byte are significant.
use std::fmt::{self, Debug, Formatter};
use std::io::{ErrorKind, Read};
use std::time::Duration;

use tracing::{event, Level};

use super::{BusyReason, DeviceId, Peripheral, Transfer, CHARACTER_MASK};

pub struct Reader {
    id: DeviceId,
    tape: Option<Box<dyn Read + Send>>,
    busy: Option<BusyReason>,
    character_delay: Duration,
    characters_read: u64,
}

impl Debug for Reader {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Reader")
            .field("id", &self.id)
            .field("loaded", &self.tape.is_some())
            .field("busy", &self.busy)
            .field("characters_read", &self.characters_read)
            .finish()
    }
}

impl Reader {
    pub fn new(id: DeviceId, character_delay: Duration) -> Reader {
        Reader {
            id,
            tape: None,
            busy: None,
            character_delay,
            characters_read: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.tape.is_some()
    }

    pub fn characters_read(&self) -> u64 {
        self.characters_read
    }

    fn starve(&mut self) -> Transfer<u8> {
        self.busy = Some(BusyReason::AwaitingInput);
        Transfer::Busy(BusyReason::AwaitingInput)
    }

    /// Read the next character from the tape.  If there is no tape,
    /// or the tape has run out, the reader becomes busy.
    pub fn read_char(&mut self) -> Transfer<u8> {
        let Some(tape) = self.tape.as_mut() else {
            return self.starve();
        };
        let mut buf = [0u8; 1];
        loop {
            match tape.read(&mut buf) {
                Ok(0) => {
                    event!(
                        Level::DEBUG,
                        "{}: end of tape after {} characters",
                        self.id,
                        self.characters_read
                    );
                    self.tape = None;
                    return self.starve();
                }
                Ok(_) => {
                    self.busy = None;
                    self.characters_read += 1;
                    return Transfer::Done {
                        value: buf[0] & CHARACTER_MASK,
                        delay: self.character_delay,
                    };
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    event!(Level::WARN, "{}: read failed, unloading tape: {e}", self.id);
                    self.tape = None;
                    return self.starve();
                }
            }
        }
    }
}

impl Peripheral for Reader {
    type Stream = Box<dyn Read + Send>;

    fn id(&self) -> DeviceId {
        self.id
    }

    fn attach(&mut self, stream: Self::Stream) {
        event!(Level::INFO, "{}: tape loaded", self.id);
        self.tape = Some(stream);
        self.characters_read = 0;
    }

    fn detach(&mut self) {
        self.tape = None;
    }

    fn busy_reason(&self) -> Option<BusyReason> {
        self.busy
    }

    fn clear_busy(&mut self) {
        self.busy = None;
    }
}
