//! The console display printed when the emulator finishes.
use std::io::{self, Write};

use termcolor::{self, ColorChoice, ColorSpec, StandardStream, WriteColor};

use cpu::RegisterDisplay;

fn get_colour_choice() -> termcolor::ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

pub struct ConsoleDisplay {
    stream: StandardStream,
}

impl ConsoleDisplay {
    pub fn new() -> ConsoleDisplay {
        ConsoleDisplay {
            stream: StandardStream::stdout(get_colour_choice()),
        }
    }

    fn lamp(&mut self, name: &str, lit: bool) -> io::Result<()> {
        if lit {
            let mut colour = ColorSpec::new();
            colour.set_fg(Some(termcolor::Color::Red)).set_bold(true);
            self.stream.set_color(&colour)?;
            write!(self.stream, "[{name}]")?;
            self.stream.reset()
        } else {
            write!(self.stream, " {name} ")
        }
    }

    fn label(&mut self, text: &str) -> io::Result<()> {
        let mut colour = ColorSpec::new();
        colour.set_fg(Some(termcolor::Color::Cyan));
        self.stream.set_color(&colour)?;
        write!(self.stream, "{text}")?;
        self.stream.reset()
    }

    pub fn show(&mut self, regs: &RegisterDisplay, instructions: u64) -> io::Result<()> {
        writeln!(self.stream)?;
        self.label("SCR ")?;
        write!(self.stream, "{:4}{}  ", regs.scr, if regs.scr2 == 0 { ' ' } else { '+' })?;
        self.label("IR ")?;
        writeln!(self.stream, "{}", regs.ir)?;
        self.label("A   ")?;
        writeln!(self.stream, "{} ({})", regs.acc, regs.acc.to_i64())?;
        self.label("AR  ")?;
        writeln!(self.stream, "{:013o}", regs.ar)?;
        self.lamp("OVERFLOW", regs.overflow)?;
        write!(self.stream, " ")?;
        self.lamp("FP OVERFLOW", regs.fp_overflow)?;
        writeln!(self.stream, "  {instructions} instructions")?;
        self.stream.flush()
    }
}
