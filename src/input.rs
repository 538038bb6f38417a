// src/input.rs
//
// Validation of user input and the bounded re-prompt loop used by the
// interactive menu.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use log::debug;

use crate::constants::MAX_SIZE_MB;
use crate::error::{BinGenError, InputError, Result};

/// Entry picked from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Generate,
    Compare,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = InputError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" => Ok(MenuChoice::Generate),
            "2" => Ok(MenuChoice::Compare),
            "x" => Ok(MenuChoice::Exit),
            "" => Err(InputError::Empty),
            other => Err(InputError::InvalidChoice(other.to_string())),
        }
    }
}

/// Parse a data size in megabytes; must be a positive integer.
pub fn parse_size_mb(input: &str) -> std::result::Result<u64, InputError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(InputError::Empty);
    }
    let mb: u64 = s.parse().map_err(|_| InputError::NotANumber(s.to_string()))?;
    match mb {
        0 => Err(InputError::ZeroSize),
        n if n > MAX_SIZE_MB => Err(InputError::TooLarge(n)),
        n => Ok(n),
    }
}

/// Remove one leading and one trailing `'`, then one leading and one trailing `"`.
///
/// Paths pasted from a file manager often arrive quoted.
pub fn strip_quotes(input: &str) -> &str {
    let mut s = input;
    for q in ['\'', '"'] {
        s = s.strip_prefix(q).unwrap_or(s);
        s = s.strip_suffix(q).unwrap_or(s);
    }
    s
}

/// Turn raw input into the path of an existing regular file.
pub fn parse_existing_file(input: &str) -> std::result::Result<PathBuf, InputError> {
    let s = strip_quotes(input.trim());
    if s.is_empty() {
        return Err(InputError::Empty);
    }
    let path = PathBuf::from(s);
    if path.is_file() {
        Ok(path)
    } else {
        Err(InputError::NotAFile(path))
    }
}

/// Asks questions on `output` and reads answers from `input`, retrying
/// rejected answers at most `max_attempts` times.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, max_attempts: usize) -> Self {
        Self {
            input,
            output,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print `question`, read one line, validate it. Repeats on rejection.
    ///
    /// Fails with [`InputError::Exhausted`] at end of input and with
    /// [`InputError::TooManyAttempts`] once the budget is spent.
    pub fn ask<T, V>(&mut self, question: &str, validate: V) -> Result<T>
    where
        V: Fn(&str) -> std::result::Result<T, InputError>,
    {
        for attempt in 1..=self.max_attempts {
            write!(self.output, "{question}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(BinGenError::InvalidInput(InputError::Exhausted));
            }

            match validate(line.trim()) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("attempt {attempt}/{} rejected: {e}", self.max_attempts);
                    writeln!(self.output, "\nERROR! {e}")?;
                }
            }
        }
        Err(BinGenError::InvalidInput(InputError::TooManyAttempts(self.max_attempts)))
    }
}
