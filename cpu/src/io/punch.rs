//! Tape punches and the teleprinter.
//!
//! Both consume one character per transfer and write it, as a byte,
//! to a sink supplied by the surrounding application.  A failing sink
//! is dropped; the device then waits for a replacement.
use std::fmt::{self, Debug, Formatter};
use std::io::Write;
use std::time::Duration;

use tracing::{event, Level};

use super::{BusyReason, DeviceId, Peripheral, Transfer, CHARACTER_MASK};

pub struct Punch {
    id: DeviceId,
    sink: Option<Box<dyn Write + Send>>,
    busy: Option<BusyReason>,
    character_delay: Duration,
}

impl Debug for Punch {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Punch")
            .field("id", &self.id)
            .field("attached", &self.sink.is_some())
            .field("busy", &self.busy)
            .finish()
    }
}

impl Punch {
    pub fn new(id: DeviceId, character_delay: Duration) -> Punch {
        Punch {
            id,
            sink: None,
            busy: None,
            character_delay,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    pub fn punch_char(&mut self, ch: u8) -> Transfer<()> {
        let ch = ch & CHARACTER_MASK;
        let Some(sink) = self.sink.as_mut() else {
            self.busy = Some(BusyReason::AwaitingOutput);
            return Transfer::Busy(BusyReason::AwaitingOutput);
        };
        match sink.write_all(&[ch]) {
            Ok(()) => {
                self.busy = None;
                Transfer::Done {
                    value: (),
                    delay: self.character_delay,
                }
            }
            Err(e) => {
                event!(Level::WARN, "{}: write failed, detaching output: {e}", self.id);
                self.sink = None;
                self.busy = Some(BusyReason::AwaitingOutput);
                Transfer::Busy(BusyReason::AwaitingOutput)
            }
        }
    }

    pub fn flush(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                event!(Level::WARN, "{}: flush failed, detaching output: {e}", self.id);
                self.sink = None;
            }
        }
    }
}

impl Peripheral for Punch {
    type Stream = Box<dyn Write + Send>;

    fn id(&self) -> DeviceId {
        self.id
    }

    fn attach(&mut self, stream: Self::Stream) {
        self.flush();
        event!(Level::INFO, "{}: output attached", self.id);
        self.sink = Some(stream);
    }

    fn detach(&mut self) {
        self.flush();
        self.sink = None;
    }

    fn busy_reason(&self) -> Option<BusyReason> {
        self.busy
    }

    fn clear_busy(&mut self) {
        self.busy = None;
    }
}
