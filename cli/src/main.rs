use std::error::Error;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

use base::prelude::*;
use cpu::{
    BusyReason, Configuration, DeviceId, ExecutionMode, LogTrace, Machine, RunOutcome, Stall,
};

mod console;
mod tapes;

use console::ConsoleDisplay;
use tapes::TapeSequence;

/// Emulate the Elliott 803, loading programs from paper tape through
/// the initial instructions.
#[derive(Parser, Debug)]
#[command(name = "e803", version, about)]
struct Args {
    /// Files containing paper tape data, read by reader 1 in turn.
    #[arg(value_name = "TAPE")]
    tapes: Vec<OsString>,

    /// Tape for reader 2.
    #[arg(long, value_name = "FILE")]
    reader2: Option<PathBuf>,

    /// Output file for punch 1.
    #[arg(long, value_name = "FILE")]
    punch: Option<PathBuf>,

    /// Output file for punch 2.
    #[arg(long, value_name = "FILE")]
    punch2: Option<PathBuf>,

    /// Output file for the teleprinter (default: standard output).
    #[arg(long, value_name = "FILE")]
    teleprinter: Option<PathBuf>,

    /// Run without the floating-point unit.
    #[arg(long)]
    no_fpu: bool,

    /// Run no faster than the real machine.
    #[arg(long)]
    real_time: bool,

    /// Run the machine on its own thread and accept operator
    /// commands on standard input.
    #[arg(long)]
    interactive: bool,

    /// Initial word generator setting, e.g. "40 64 : 00 0".
    #[arg(long, value_name = "PAIR", value_parser = parse_word)]
    word_generator: Option<Word>,

    /// Start at this address instead of at the initial instructions.
    #[arg(long, value_name = "ADDR", value_parser = clap::value_parser!(u16).range(0..8192))]
    start: Option<u16>,

    /// Log every instruction executed.
    #[arg(long)]
    trace: bool,

    /// Stop after executing this many instructions.
    #[arg(long, value_name = "N")]
    max_instructions: Option<u64>,
}

fn parse_word(s: &str) -> Result<Word, ParseInstructionError> {
    s.parse::<InstructionPair>().map(Word::from)
}

fn configuration(args: &Args) -> Configuration {
    Configuration {
        real_time: args.real_time,
        mode: if args.interactive {
            ExecutionMode::Interactive
        } else {
            ExecutionMode::Batch
        },
        fpu_installed: !args.no_fpu,
        ..Configuration::default()
    }
}

fn create(path: &PathBuf) -> Result<File, Box<dyn Error>> {
    File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()).into())
}

fn set_up_devices(machine: &Machine, args: &Args) -> Result<(), Box<dyn Error>> {
    match &args.teleprinter {
        Some(path) => machine.set_punch_output(DeviceId::Teleprinter, Box::new(create(path)?))?,
        None => machine.set_punch_output(DeviceId::Teleprinter, Box::new(io::stdout()))?,
    }
    if let Some(path) = &args.punch {
        machine.set_punch_output(DeviceId::Punch1, Box::new(create(path)?))?;
    }
    if let Some(path) = &args.punch2 {
        machine.set_punch_output(DeviceId::Punch2, Box::new(create(path)?))?;
    }
    if let Some(path) = &args.reader2 {
        let tape = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
        machine.set_tape(DeviceId::Reader2, Box::new(tape))?;
    }
    if let Some(w) = args.word_generator {
        machine.set_word_generator(w);
    }
    if let Some(addr) = args.start {
        machine.set_next_instruction(addr, 0);
    }
    if args.trace {
        machine.attach_trace(Box::new(LogTrace));
    }
    Ok(())
}

fn is_waiting_for_tape(stall: &Stall) -> bool {
    matches!(
        stall,
        Stall::Device {
            device: DeviceId::Reader1,
            reason: BusyReason::AwaitingInput
        }
    )
}

/// Run on this thread, loading the next tape whenever reader 1 runs
/// out.
fn run_batch(
    machine: &Machine,
    tapes: &mut TapeSequence,
    max_instructions: Option<u64>,
) -> Result<RunOutcome, Box<dyn Error>> {
    loop {
        let limit = max_instructions.map(|n| n.saturating_sub(machine.instructions_executed()));
        let outcome = machine.run_limited(limit);
        match outcome {
            RunOutcome::Waiting(stall) if is_waiting_for_tape(&stall) => match tapes.next_tape()? {
                Some(tape) => machine.set_tape(DeviceId::Reader1, Box::new(tape))?,
                None => {
                    event!(Level::INFO, "no more tapes");
                    return Ok(outcome);
                }
            },
            RunOutcome::Waiting(stall) => {
                event!(Level::WARN, "machine stopped: {stall}");
                return Ok(outcome);
            }
            RunOutcome::Stopped | RunOutcome::LimitReached => return Ok(outcome),
        }
    }
}

const HELP: &str = "commands: stop, reset, operate, continue, start ADDR, \
wg PAIR, manual on|off, tape FILE, status, quit";

fn operator_command(
    machine: &Machine,
    line: &str,
    console: &mut ConsoleDisplay,
) -> Result<bool, Box<dyn Error>> {
    let mut words = line.splitn(2, char::is_whitespace);
    let command = words.next().unwrap_or("");
    let rest = words.next().unwrap_or("").trim();
    match command {
        "" => (),
        "stop" | "quit" => return Ok(false),
        "reset" => machine.reset(),
        "operate" => machine.press_operate(),
        "continue" => machine.continue_after_overflow(),
        "start" => match rest.parse::<u16>() {
            Ok(addr) if addr < 8192 => machine.set_next_instruction(addr, 0),
            _ => eprintln!("bad address {rest:?}"),
        },
        "wg" => match parse_word(rest) {
            Ok(w) => machine.set_word_generator(w),
            Err(e) => eprintln!("{e}"),
        },
        "manual" => machine.set_manual_data(rest == "on"),
        "tape" => match File::open(rest) {
            Ok(f) => machine.set_tape(DeviceId::Reader1, Box::new(f))?,
            Err(e) => eprintln!("cannot open {rest}: {e}"),
        },
        "status" => {
            console.show(&machine.registers(), machine.instructions_executed())?;
            if let Some(stall) = machine.waiting_on() {
                println!("waiting: {stall}");
            }
        }
        _ => eprintln!("{HELP}"),
    }
    Ok(true)
}

/// Run on an execution thread, feeding tapes from a second thread and
/// taking operator commands on this one.
fn run_interactive(
    machine: Arc<Machine>,
    mut tapes: TapeSequence,
    console: &mut ConsoleDisplay,
) -> Result<RunOutcome, Box<dyn Error>> {
    let execution = machine.spawn()?;
    let feeder = {
        let machine = Arc::clone(&machine);
        thread::Builder::new()
            .name("e803-tapes".to_string())
            .spawn(move || -> Result<(), io::Error> {
                while tapes.remaining() > 0 && machine.is_running() {
                    if machine.waiting_on().as_ref().is_some_and(is_waiting_for_tape) {
                        if let Some(tape) = tapes.next_tape()? {
                            if let Err(e) = machine.set_tape(DeviceId::Reader1, Box::new(tape)) {
                                event!(Level::ERROR, "{e}");
                            }
                        }
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Ok(())
            })?
    };

    eprintln!("{HELP}");
    for line in io::stdin().lock().lines() {
        if !operator_command(&machine, line?.trim(), console)? {
            break;
        }
        if !machine.is_running() {
            break;
        }
    }
    machine.stop();
    let outcome = execution
        .join()
        .map_err(|_| "execution thread panicked".to_string())?;
    match feeder.join() {
        Ok(Ok(())) => (),
        Ok(Err(e)) => event!(Level::ERROR, "failed to load tape: {e}"),
        Err(_) => event!(Level::ERROR, "tape feeder panicked"),
    }
    Ok(outcome)
}

fn run_simulator() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // See
    // https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.  Logs go to stderr because stdout is the teleprinter.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Box::new(e));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let machine = Arc::new(Machine::new(configuration(&args)));
    set_up_devices(&machine, &args)?;

    let mut tapes = TapeSequence::new(args.tapes.clone());
    if let Some(tape) = tapes.next_tape()? {
        machine.set_tape(DeviceId::Reader1, Box::new(tape))?;
    }

    let mut console = ConsoleDisplay::new();
    let outcome = if args.interactive {
        run_interactive(Arc::clone(&machine), tapes, &mut console)?
    } else {
        run_batch(&machine, &mut tapes, args.max_instructions)?
    };
    event!(Level::INFO, "finished: {outcome:?}");
    console.show(&machine.registers(), machine.instructions_executed())?;
    Ok(())
}

fn main() {
    match run_simulator() {
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
