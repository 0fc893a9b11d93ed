//! Line-based console prompts for the triage loop

use std::fmt::Display;
use std::io::{self, BufRead, Write};

pub const MENU: &str = "Options:\n1. Delete\n2. Rename and move\n3. Preview";
pub const CHOICE_PROMPT: &str = "Enter your choice (1/2/3): ";
pub const NAME_PROMPT: &str = "Please enter a new name for the file: ";

/// Reads answers from `input` and writes prompts and status lines to `output`.
///
/// Every read returns `Ok(None)` once the input is exhausted so callers can
/// stop instead of prompting forever.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Shows the three-option menu and returns the raw selection token
    pub fn read_choice(&mut self) -> io::Result<Option<String>> {
        writeln!(self.output, "{}", MENU)?;
        self.ask(CHOICE_PROMPT)
    }

    /// Asks for a replacement base name (without extension)
    pub fn read_new_name(&mut self) -> io::Result<Option<String>> {
        self.ask(NAME_PROMPT)
    }

    /// Writes one status line
    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        // Only the line terminator is stripped; spaces can be part of a name
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}
