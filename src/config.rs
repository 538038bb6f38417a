// src/config.rs
//
// Runtime parameters for generation and comparison runs.

use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_EXTENSION, DEFAULT_OUTPUT_NAME,
    DIFF_LOG_NAME, ENV_CHUNK_SIZE, ENV_MAX_ATTEMPTS, ENV_OUTPUT_DIR,
};
use crate::error::{BinGenError, Result};

/// Runtime parameters used by `data_gen` and `compare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output_name:      String,   // file stem, "test" by default
    pub output_extension: String,   // "bin" by default
    pub output_dir:       PathBuf,  // where the generated file and the diff log go
    pub diff_log_name:    String,
    pub chunk_size:       u64,      // bytes per generated chunk, > 0
    pub max_attempts:     usize,    // prompt retry budget, > 0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            output_dir: tool_dir(),
            diff_log_name: DIFF_LOG_NAME.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Defaults, then any `BINGEN_*` variables from the environment.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var(ENV_CHUNK_SIZE) {
            cfg.chunk_size = v.trim().parse().map_err(|_| {
                BinGenError::Config(format!("{ENV_CHUNK_SIZE}='{v}' is not a byte count"))
            })?;
        }
        if let Ok(v) = std::env::var(ENV_OUTPUT_DIR) {
            cfg.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_MAX_ATTEMPTS) {
            cfg.max_attempts = v.trim().parse().map_err(|_| {
                BinGenError::Config(format!("{ENV_MAX_ATTEMPTS}='{v}' is not a count"))
            })?;
        }

        cfg.validate()?;
        debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn with_output_extension(mut self, ext: impl Into<String>) -> Self {
        self.output_extension = ext.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BinGenError::Config("chunk size must be greater than zero".into()));
        }
        if usize::try_from(self.chunk_size).is_err() {
            return Err(BinGenError::Config(format!(
                "chunk size {} does not fit in memory on this platform",
                self.chunk_size
            )));
        }
        if self.max_attempts == 0 {
            return Err(BinGenError::Config("max attempts must be at least 1".into()));
        }
        if self.output_name.is_empty() {
            return Err(BinGenError::Config("output name must not be empty".into()));
        }
        Ok(())
    }

    /// File name of the generated output, e.g. `test.bin`.
    pub fn output_file_name(&self) -> String {
        if self.output_extension.is_empty() {
            self.output_name.clone()
        } else {
            format!("{}.{}", self.output_name, self.output_extension)
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }

    pub fn diff_log_path(&self) -> PathBuf {
        self.output_dir.join(&self.diff_log_name)
    }
}

/// Directory holding the running executable, or `.` if it cannot be found.
pub fn tool_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Fails on hosts other than Linux, macOS and Windows.
pub fn check_platform() -> Result<()> {
    match std::env::consts::OS {
        "linux" | "macos" | "windows" => Ok(()),
        other => Err(BinGenError::UnsupportedPlatform(other)),
    }
}
