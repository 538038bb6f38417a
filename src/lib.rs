// src/lib.rs
//
// Crate root: the generator, the comparator and the pieces the CLI shares.

pub mod constants;
pub mod config;
pub mod error;
pub mod progress;
pub mod input;

pub mod data_gen;
pub mod compare;
pub mod diff_log;

// ===== Re-exports expected by src/bin/cli.rs at the crate root =====
pub use crate::config::{Config, check_platform};
pub use crate::error::{BinGenError, InputError, Result, Side};
pub use crate::data_gen::{GenerationReport, GenerationRequest, generate_file, write_data};
pub use crate::compare::{
    ComparisonResult,
    ComparisonSummary,
    Difference,
    EarlyEof,
    compare_files,
    compare_readers,
};
pub use crate::input::{MenuChoice, Prompter};

// Callers pass the token in; re-exported so they need no direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
