// src/error.rs
//
// Error types shared by the generator, the comparator and the prompt layer.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for bingen operations
#[derive(Debug, Error)]
pub enum BinGenError {
    /// Input rejected after the retry budget ran out
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// A chunk buffer could not be allocated
    #[error("Out of memory: could not allocate {requested} bytes")]
    OutOfMemory { requested: u64 },

    /// The run was interrupted by the user
    #[error("Interrupted by user")]
    Cancelled,

    /// The host OS is not one the tool runs on
    #[error("OS not available yet: {0}")]
    UnsupportedPlatform(&'static str),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read failure on one of the two compared inputs
    #[error("read error on {side} input: {source}")]
    Read {
        side: Side,
        #[source]
        source: io::Error,
    },

    /// I/O error on a reader or writer with no path attached
    #[error("I/O error: {0}")]
    Stream(#[from] io::Error),
}

impl BinGenError {
    /// Process exit status for this error: 130 for a user interrupt, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            BinGenError::Cancelled => 130,
            _ => 1,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BinGenError::Io { path: path.into(), source }
    }
}

/// Which of the two compared inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

/// Reasons a single piece of user input was rejected.
///
/// These are recoverable: the prompt loop reports them and asks again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no value entered")]
    Empty,

    #[error("'{0}' is not a valid data size")]
    NotANumber(String),

    #[error("data size must be at least 1 MB")]
    ZeroSize,

    #[error("data size {0} MB is too large")]
    TooLarge(u64),

    #[error("Invalid file at {0}")]
    NotAFile(PathBuf),

    #[error("Invalid option '{0}'")]
    InvalidChoice(String),

    #[error("no input left to read")]
    Exhausted,

    #[error("gave up after {0} invalid attempts")]
    TooManyAttempts(usize),
}

pub type Result<T> = std::result::Result<T, BinGenError>;
