// Console handle and input validation.
// `Console` bundles where lines come from and where output goes, and is
// passed explicitly to every function that talks to the user. Prompt loops
// end when the input is exhausted, or after a configurable number of
// rejected attempts.

use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::style::{style, Color, Stylize};
use dialoguer::Input;
use log::debug;

use crate::error::QuizError;

pub const DEFAULT_WIDTH: u16 = 80;
pub const ANSWER_PROMPT: &str = "Enter your answer here";
pub const INVALID_NUMBER: &str = "Please enter a valid number.";

const WARNING_COLOR: Color = Color::Rgb { r: 0xFF, g: 0x6F, b: 0x61 };

/// Somewhere to read user input from, one line at a time.
pub trait LineSource {
    /// Show `prompt` (if the source is interactive) and read one line
    /// without its terminator. Returns `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

impl<L: LineSource + ?Sized> LineSource for Box<L> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }
}

/// Interactive prompt drawn by `dialoguer`.
pub struct TerminalInput;

impl LineSource for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let result: io::Result<String> = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        match result {
            Ok(line) => Ok(Some(line)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Lines from any buffered reader: piped stdin, or a cursor in tests.
pub struct ReaderInput<R> {
    reader: R,
}

impl<R: BufRead> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        ReaderInput { reader }
    }
}

impl<R: BufRead> LineSource for ReaderInput<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string()))
    }
}

/// Input source and output sink for one quiz session.
pub struct Console<I, W> {
    input: I,
    out: W,
    width: u16,
    max_attempts: Option<u32>,
}

impl Console<Box<dyn LineSource>, io::Stdout> {
    /// Console on the process's stdin/stdout. Uses an interactive prompt
    /// when stdin is a terminal and plain line reads otherwise.
    pub fn stdio() -> Self {
        let input: Box<dyn LineSource> = if io::stdin().is_terminal() {
            Box::new(TerminalInput)
        } else {
            Box::new(ReaderInput::new(io::stdin().lock()))
        };
        let width = crossterm::terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(DEFAULT_WIDTH);
        Console::new(input, io::stdout()).with_width(width)
    }
}

impl<I: LineSource, W: Write> Console<I, W> {
    pub fn new(input: I, out: W) -> Self {
        Console {
            input,
            out,
            width: DEFAULT_WIDTH,
            max_attempts: None,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width.max(1);
        self
    }

    /// Limit how many rejected inputs a prompt loop tolerates. `None`
    /// keeps reprompting until the input ends.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|&n| n > 0);
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn println(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        self.println(style(message).with(WARNING_COLOR).bold().italic())
    }

    /// Read one line. An exhausted or interrupted input cancels the session.
    pub fn prompt(&mut self, prompt: &str) -> Result<String, QuizError> {
        match self.input.read_line(prompt) {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(QuizError::Cancelled),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(QuizError::Cancelled),
            Err(e) => Err(QuizError::Io(e)),
        }
    }

    /// Prompt until `accept` returns a value, printing `warning` after
    /// every rejected line.
    pub fn retry_until<T>(
        &mut self,
        prompt: &str,
        warning: &str,
        mut accept: impl FnMut(&str) -> Option<T>,
    ) -> Result<T, QuizError> {
        let mut rejected = 0u32;
        loop {
            let line = self.prompt(prompt)?;
            if let Some(value) = accept(line.trim()) {
                return Ok(value);
            }
            rejected += 1;
            debug!("rejected input {:?} ({} so far)", line, rejected);
            self.warn(warning)?;
            if self.max_attempts.is_some_and(|max| rejected >= max) {
                return Err(QuizError::RetriesExhausted { attempts: rejected });
            }
        }
    }
}

/// Parse `input` as an integer in `1..=max_value`.
pub fn parse_bounded(input: &str, max_value: usize) -> Option<usize> {
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=max_value).contains(n))
}

/// Prompt for an answer number until one in `1..=max_value` is entered.
pub fn read_bounded_integer<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    max_value: usize,
) -> Result<usize, QuizError> {
    console.retry_until(ANSWER_PROMPT, INVALID_NUMBER, |line| {
        parse_bounded(line, max_value)
    })
}
