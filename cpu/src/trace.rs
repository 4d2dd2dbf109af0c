//! Instruction tracing.
use base::prelude::*;
use serde::Serialize;
use tracing::{event, Level};

/// One executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Where the instruction came from.
    pub scr: u16,
    pub scr2: u8,
    /// The instruction as executed, after any B-line modification.
    pub instruction: Instruction,
    /// Accumulator after execution.
    pub acc: Word,
    pub overflow: bool,
    pub cycles: u64,
}

pub trait TraceSink: Send {
    fn record(&mut self, entry: &TraceEntry);
}

/// Writes each entry as a `tracing` event.
#[derive(Debug, Default)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn record(&mut self, entry: &TraceEntry) {
        event!(
            Level::INFO,
            "{:4}{} {:<8} A={} OV={} t={}",
            entry.scr,
            if entry.scr2 == 0 { ' ' } else { '+' },
            entry.instruction.to_string(),
            entry.acc,
            u8::from(entry.overflow),
            entry.cycles,
        );
    }
}

impl<F> TraceSink for F
where
    F: FnMut(&TraceEntry) + Send,
{
    fn record(&mut self, entry: &TraceEntry) {
        self(entry)
    }
}
