//! Interactive mode: the machine runs on its own thread and blocks
//! when a device is not ready, until another thread releases it.
use std::io::Cursor;
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use base::prelude::*;
use cpu::{BusyReason, Configuration, DeviceId, ExecutionMode, Machine, RunOutcome, Stall};

fn interactive() -> Arc<Machine> {
    Arc::new(Machine::new(Configuration {
        mode: ExecutionMode::Interactive,
        ..Configuration::default()
    }))
}

/// Poll until `done` holds, failing the test after a few seconds.
fn wait_until(machine: &Machine, what: &str, done: impl Fn(&Machine) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done(machine) {
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        sleep(Duration::from_millis(1));
    }
}

fn stall_on(device: DeviceId, reason: BusyReason) -> Option<Stall> {
    Some(Stall::Device { device, reason })
}

#[test]
fn attaching_a_tape_releases_the_reader() {
    let machine = interactive();
    machine.write_store(10, pair!("71 0 : 20 100"));
    machine.write_store(11, pair!("71 0 : 40 10"));
    machine.set_next_instruction(10, 0);
    let handle = machine.spawn().unwrap();

    wait_until(&machine, "reader wait", |m| {
        m.waiting_on() == stall_on(DeviceId::Reader1, BusyReason::AwaitingInput)
    });
    assert!(machine.is_running());
    assert_eq!(machine.read_store(100), Word::ZERO);

    machine
        .set_tape(DeviceId::Reader1, Box::new(Cursor::new(vec![101u8])))
        .unwrap();
    // The tape runs out at the second read, and the machine waits
    // again.
    wait_until(&machine, "second reader wait", |m| {
        m.read_store(100) == Word::from_i64(5) && m.waiting_on().is_some()
    });
    let regs = machine.registers();
    assert_eq!((regs.scr, regs.scr2), (11, 0));

    machine.stop();
    assert_eq!(handle.join().unwrap(), RunOutcome::Stopped);
    assert!(!machine.is_running());
}

#[test]
fn operate_bar_releases_the_word_generator() {
    let machine = interactive();
    machine.write_store(10, pair!("70 0 : 20 100"));
    machine.write_store(11, pair!("40 10 : 00 0"));
    machine.set_next_instruction(10, 0);
    machine.set_word_generator(Word::from_i64(41));
    machine.set_manual_data(true);
    let handle = machine.spawn().unwrap();

    wait_until(&machine, "operator wait", |m| {
        m.waiting_on() == stall_on(DeviceId::WordGenerator, BusyReason::AwaitingOperator)
    });
    machine.set_word_generator_bit(0, false);
    assert_eq!(machine.word_generator(), Word::from_i64(40));
    machine.press_operate();
    wait_until(&machine, "word stored", |m| {
        m.read_store(100) == Word::from_i64(40)
    });
    // The loop comes round to 70 again and waits for the next press.
    wait_until(&machine, "second operator wait", |m| m.waiting_on().is_some());

    machine.stop();
    assert_eq!(handle.join().unwrap(), RunOutcome::Stopped);
}

#[test]
fn stop_releases_a_waiting_machine() {
    let machine = interactive();
    machine.write_store(10, pair!("74 5 : 00 0"));
    machine.set_next_instruction(10, 0);
    let handle = machine.spawn().unwrap();
    wait_until(&machine, "punch wait", |m| {
        m.waiting_on() == stall_on(DeviceId::Punch1, BusyReason::AwaitingOutput)
    });
    machine.stop();
    assert_eq!(handle.join().unwrap(), RunOutcome::Stopped);
}

#[test]
fn stop_interrupts_a_running_loop() {
    let machine = interactive();
    machine.write_store(10, pair!("22 100 : 40 10"));
    machine.set_next_instruction(10, 0);
    let handle = machine.spawn().unwrap();
    wait_until(&machine, "program running", |m| {
        m.read_store(100).to_i64() > 1000
    });
    machine.stop();
    assert_eq!(handle.join().unwrap(), RunOutcome::Stopped);
    // Nothing more happens once the machine has stopped.
    let count = machine.read_store(100);
    sleep(Duration::from_millis(20));
    assert_eq!(machine.read_store(100), count);
}

#[test]
fn stop_straight_after_spawn_is_not_lost() {
    for _ in 0..20 {
        let machine = interactive();
        machine.write_store(10, pair!("40 10 : 00 0"));
        machine.set_next_instruction(10, 0);
        let handle = machine.spawn().unwrap();
        assert!(machine.is_running());
        machine.stop();

        let (done, finished) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = done.send(handle.join().unwrap());
        });
        assert_eq!(
            finished.recv_timeout(Duration::from_secs(5)),
            Ok(RunOutcome::Stopped)
        );
    }
}
