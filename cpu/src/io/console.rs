//! The operator's console word generator.
//!
//! This is a row of 39 keys which set a word that programs read with
//! function 70.  In manual-data mode each read must be confirmed by
//! the operator pressing the OPERATE bar; until then the machine
//! waits.
use base::prelude::*;
use tracing::{event, Level};

use super::{BusyReason, DeviceId, Transfer};

#[derive(Debug, Default)]
pub struct WordGenerator {
    value: Word,
    manual_data: bool,
    arm_after_next_read: bool,
    operated: bool,
    busy: Option<BusyReason>,
}

impl WordGenerator {
    pub fn new() -> WordGenerator {
        WordGenerator::default()
    }

    pub fn id(&self) -> DeviceId {
        DeviceId::WordGenerator
    }

    pub fn value(&self) -> Word {
        self.value
    }

    pub fn set_value(&mut self, value: Word) {
        self.value = value;
    }

    /// Set or clear one key.  Bit 0 is the least significant; keys
    /// outside the word are ignored.
    pub fn set_bit(&mut self, bit: u32, on: bool) {
        if bit >= WORD_BITS {
            event!(Level::WARN, "ignoring word generator key {bit}");
            return;
        }
        let mask = 1u64 << bit;
        let bits = if on {
            self.value.bits() | mask
        } else {
            self.value.bits() & !mask
        };
        self.value = Word::from_bits(bits);
    }

    pub fn manual_data(&self) -> bool {
        self.manual_data
    }

    pub fn set_manual_data(&mut self, on: bool) {
        self.manual_data = on;
        self.arm_after_next_read = false;
        self.operated = false;
        if !on {
            self.busy = None;
        }
    }

    /// Enter manual-data mode once the next read has completed.
    pub fn arm_manual_data_after_next_read(&mut self) {
        self.arm_after_next_read = true;
    }

    /// The operator pressed OPERATE.  A press only counts while a
    /// manual-data read is waiting for it.
    pub fn operate_pressed(&mut self) {
        if self.busy == Some(BusyReason::AwaitingOperator) {
            self.operated = true;
            self.busy = None;
        } else {
            event!(Level::DEBUG, "OPERATE pressed with nothing waiting");
        }
    }

    pub fn read(&mut self) -> Transfer<Word> {
        if self.manual_data {
            if !self.operated {
                self.busy = Some(BusyReason::AwaitingOperator);
                return Transfer::Busy(BusyReason::AwaitingOperator);
            }
            self.operated = false;
        }
        self.busy = None;
        if self.arm_after_next_read {
            self.arm_after_next_read = false;
            self.manual_data = true;
            self.operated = false;
        }
        Transfer::Done {
            value: self.value,
            delay: std::time::Duration::ZERO,
        }
    }

    pub fn busy_reason(&self) -> Option<BusyReason> {
        self.busy
    }

    pub fn clear_busy(&mut self) {
        self.busy = None;
    }

    /// Forget any pending wait, including an unconsumed press.
    pub fn reset(&mut self) {
        self.busy = None;
        self.operated = false;
    }
}
