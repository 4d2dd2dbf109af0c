use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use base::prelude::*;

use super::*;

/// A sink whose contents the test can inspect after handing it to a
/// device.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn delay() -> Duration {
    Duration::from_millis(2)
}

#[test]
fn reader_without_tape_is_busy() {
    let mut reader = Reader::new(DeviceId::Reader1, delay());
    assert_eq!(reader.read_char(), Transfer::Busy(BusyReason::AwaitingInput));
    assert!(reader.is_busy());
    assert_eq!(reader.busy_reason(), Some(BusyReason::AwaitingInput));
}

#[test]
fn reader_masks_to_five_bits_and_detaches_at_end() {
    let mut reader = Reader::new(DeviceId::Reader1, delay());
    reader.attach(Box::new(Cursor::new(vec![0b1110_0101u8, 31])));
    assert_eq!(
        reader.read_char(),
        Transfer::Done {
            value: 0b00101,
            delay: delay()
        }
    );
    assert_eq!(
        reader.read_char(),
        Transfer::Done {
            value: 31,
            delay: delay()
        }
    );
    assert!(!reader.is_busy());
    assert_eq!(reader.read_char(), Transfer::Busy(BusyReason::AwaitingInput));
    assert!(!reader.is_loaded());
    assert_eq!(reader.characters_read(), 2);
}

#[test]
fn punch_writes_characters() {
    let buffer = SharedBuffer::default();
    let mut punch = Punch::new(DeviceId::Punch1, Duration::from_millis(10));
    assert_eq!(punch.punch_char(1), Transfer::Busy(BusyReason::AwaitingOutput));
    punch.attach(Box::new(buffer.clone()));
    assert!(matches!(punch.punch_char(0b100_0011), Transfer::Done { .. }));
    assert!(matches!(punch.punch_char(7), Transfer::Done { .. }));
    assert!(!punch.is_busy());
    assert_eq!(buffer.contents(), vec![3, 7]);
}

#[test]
fn punch_write_error_detaches_quietly() {
    let mut punch = Punch::new(DeviceId::Teleprinter, Duration::from_millis(100));
    punch.attach(Box::new(BrokenSink));
    assert_eq!(punch.punch_char(1), Transfer::Busy(BusyReason::AwaitingOutput));
    assert!(!punch.is_attached());
    assert!(punch.is_busy());
    punch.clear_busy();
    assert!(!punch.is_busy());
}

#[test]
fn word_generator_manual_data() {
    let mut wg = WordGenerator::new();
    wg.set_value(Word::from_i64(5));
    wg.set_bit(38, true);
    let expected = Word::from_bits(SIGN_BIT | 5);
    assert_eq!(
        wg.read(),
        Transfer::Done {
            value: expected,
            delay: Duration::ZERO
        }
    );

    wg.set_manual_data(true);
    assert_eq!(wg.read(), Transfer::Busy(BusyReason::AwaitingOperator));
    wg.operate_pressed();
    assert!(matches!(wg.read(), Transfer::Done { .. }));
    // Each read needs its own press.
    assert_eq!(wg.read(), Transfer::Busy(BusyReason::AwaitingOperator));
    wg.set_manual_data(false);
    assert!(matches!(wg.read(), Transfer::Done { .. }));
}

#[test]
fn word_generator_ignores_a_press_with_nothing_waiting() {
    let mut wg = WordGenerator::new();
    wg.operate_pressed();
    wg.set_manual_data(true);
    assert_eq!(wg.read(), Transfer::Busy(BusyReason::AwaitingOperator));

    // A press latched for one wait does not survive re-entering
    // manual-data mode.
    wg.operate_pressed();
    wg.set_manual_data(true);
    assert_eq!(wg.read(), Transfer::Busy(BusyReason::AwaitingOperator));
}

#[test]
fn word_generator_delayed_arm() {
    let mut wg = WordGenerator::new();
    wg.arm_manual_data_after_next_read();
    assert!(!wg.manual_data());
    assert!(matches!(wg.read(), Transfer::Done { .. }));
    assert!(wg.manual_data());
    assert_eq!(wg.read(), Transfer::Busy(BusyReason::AwaitingOperator));
}

#[test]
fn word_generator_ignores_keys_outside_the_word() {
    let mut wg = WordGenerator::new();
    wg.set_bit(39, true);
    assert_eq!(wg.value(), Word::ZERO);
    wg.set_bit(0, true);
    wg.set_bit(0, false);
    assert_eq!(wg.value(), Word::ZERO);
}

struct Register {
    name: &'static str,
    base: u16,
    mask: u16,
    value: Word,
}

impl ControlDevice for Register {
    fn name(&self) -> &str {
        self.name
    }

    fn address_base(&self) -> u16 {
        self.base
    }

    fn address_mask(&self) -> u16 {
        self.mask
    }

    fn read(&mut self, _addr: u16) -> Option<Word> {
        Some(self.value)
    }

    fn write(&mut self, _addr: u16, value: Word) {
        self.value = value;
    }
}

#[test]
fn control_registry_first_match_wins() {
    let mut registry = ControlRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.read(100), None);
    registry.write(100, Word::ONE);

    registry.register(Box::new(Register {
        name: "narrow",
        base: 0o100,
        mask: 0o7777,
        value: Word::from_i64(1),
    }));
    registry.register(Box::new(Register {
        name: "wide",
        base: 0o100,
        mask: 0o7700,
        value: Word::from_i64(2),
    }));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.read(0o100), Some(Word::from_i64(1)));
    assert_eq!(registry.read(0o101), Some(Word::from_i64(2)));
    assert_eq!(registry.read(0o200), None);

    registry.write(0o105, Word::from_i64(9));
    assert_eq!(registry.read(0o177), Some(Word::from_i64(9)));
    assert_eq!(registry.read(0o100), Some(Word::from_i64(1)));
}

#[test]
fn tape_station_addressing() {
    assert_eq!(reader_for_address(0), DeviceId::Reader1);
    assert_eq!(reader_for_address(2048), DeviceId::Reader2);
    assert_eq!(reader_for_address(4096), DeviceId::Reader1);
    assert_eq!(output_for_address(3), DeviceId::Punch1);
    assert_eq!(output_for_address(2048 + 3), DeviceId::Punch2);
    assert_eq!(output_for_address(4096 + 3), DeviceId::Teleprinter);
    assert_eq!(output_for_address(4096 + 2048), DeviceId::Teleprinter);
}

#[test]
fn peripherals_reset_clears_busy_flags() {
    let mut devices = Peripherals::new(&CharacterDelays::default());
    let reader = devices.reader(DeviceId::Reader2).unwrap();
    assert!(matches!(reader.read_char(), Transfer::Busy(_)));
    assert_eq!(
        devices.busy_reason(DeviceId::Reader2),
        Some(BusyReason::AwaitingInput)
    );
    devices.word_generator.set_manual_data(true);
    assert!(matches!(devices.word_generator.read(), Transfer::Busy(_)));
    devices.reset();
    assert_eq!(devices.busy_reason(DeviceId::Reader2), None);
    assert_eq!(devices.busy_reason(DeviceId::WordGenerator), None);
    assert!(devices.reader(DeviceId::Punch1).is_none());
    assert!(devices.output(DeviceId::Teleprinter).is_some());
}
