// src/diff_log.rs
//
// Difference log: written to a temp file beside its target and only
// persisted when the comparison actually found differences.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::compare::Difference;
use crate::constants::DIFF_LOG_BUFFER_SIZE;
use crate::error::{BinGenError, Result};

pub struct DifferenceLog {
    target: PathBuf,
    writer: BufWriter<NamedTempFile>,
    lines: u64,
}

impl DifferenceLog {
    /// Start a log that will end up at `target`.
    ///
    /// The temp file lives in the target's directory so `persist` is a rename.
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let tmp = NamedTempFile::new_in(&dir).map_err(|e| BinGenError::io(&dir, e))?;
        debug!("difference log staged at {}", tmp.path().display());

        Ok(Self {
            target,
            writer: BufWriter::with_capacity(DIFF_LOG_BUFFER_SIZE, tmp),
            lines: 0,
        })
    }

    pub fn record(&mut self, diff: &Difference) -> Result<()> {
        writeln!(self.writer, "{diff}").map_err(|e| BinGenError::io(&self.target, e))?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and move the log into place, replacing any older log.
    pub fn persist(self) -> Result<PathBuf> {
        let Self { target, writer, lines } = self;
        let tmp = writer
            .into_inner()
            .map_err(|e| BinGenError::io(&target, e.into_error()))?;
        tmp.persist(&target).map_err(|e| BinGenError::io(&target, e.error))?;
        info!("{} difference(s) logged to {}", lines, target.display());
        Ok(target)
    }

    /// Drop the staged log and remove a stale log left at the target by an
    /// earlier run, so no log exists afterwards.
    pub fn discard(self) -> Result<()> {
        let Self { target, writer, .. } = self;
        drop(writer);
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!("removed stale difference log {}", target.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BinGenError::io(&target, e)),
        }
    }
}
