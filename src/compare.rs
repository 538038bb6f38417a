// src/compare.rs
//
// Streaming byte-by-byte comparison of two files.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::constants::{CANCEL_CHECK_INTERVAL, DEFAULT_READ_BUFFER_SIZE};
use crate::diff_log::DifferenceLog;
use crate::error::{BinGenError, Result, Side};

/// One mismatching byte pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Difference {
    /// 0-based offset of the pair in both files
    pub offset: u64,
    pub byte_a: u8,
    pub byte_b: u8,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difference found at address {:#x}: {:02x} vs {:02x}",
            self.offset, self.byte_a, self.byte_b
        )
    }
}

/// Which input ran out first, if either did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EarlyEof {
    #[default]
    Neither,
    FirstFile,
    SecondFile,
}

/// In-memory result of comparing two streams.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparisonResult {
    pub differences: Vec<Difference>,
    pub early_eof: EarlyEof,
    /// Byte pairs read from both inputs
    pub bytes_compared: u64,
}

impl ComparisonResult {
    /// No mismatching pair was found. A length mismatch alone does not count.
    pub fn identical(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Result of [`compare_files`]; the differences themselves are in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub difference_count: u64,
    pub early_eof: EarlyEof,
    pub bytes_compared: u64,
    /// Set only when differences were found and the log was persisted
    pub log_path: Option<PathBuf>,
}

impl ComparisonSummary {
    pub fn identical(&self) -> bool {
        self.difference_count == 0
    }
}

/// Outcome of the read loop, before the results are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub difference_count: u64,
    pub early_eof: EarlyEof,
    pub bytes_compared: u64,
}

#[inline]
fn next_byte<R: BufRead + ?Sized>(reader: &mut R) -> std::io::Result<Option<u8>> {
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        reader.consume(1);
        return Ok(Some(b));
    }
}

/// Read `a` and `b` in lockstep and hand every mismatch to `on_difference`.
///
/// Stops at the first end-of-file on either side. The token is polled every
/// [`CANCEL_CHECK_INTERVAL`] byte pairs.
pub fn compare_streams<A, B, F>(
    a: &mut A,
    b: &mut B,
    cancel: &CancellationToken,
    mut on_difference: F,
) -> Result<StreamStats>
where
    A: BufRead + ?Sized,
    B: BufRead + ?Sized,
    F: FnMut(Difference) -> Result<()>,
{
    let mut offset = 0u64;
    let mut difference_count = 0u64;

    let early_eof = loop {
        if offset % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(BinGenError::Cancelled);
        }

        let byte_a = next_byte(a).map_err(|source| BinGenError::Read { side: Side::First, source })?;
        let byte_b = next_byte(b).map_err(|source| BinGenError::Read { side: Side::Second, source })?;

        match (byte_a, byte_b) {
            (None, None) => break EarlyEof::Neither,
            (None, Some(_)) => break EarlyEof::FirstFile,
            (Some(_), None) => break EarlyEof::SecondFile,
            (Some(x), Some(y)) => {
                if x != y {
                    difference_count += 1;
                    on_difference(Difference { offset, byte_a: x, byte_b: y })?;
                }
            }
        }
        offset += 1;
    };

    Ok(StreamStats {
        difference_count,
        early_eof,
        bytes_compared: offset,
    })
}

/// Compare two readers, collecting every difference in memory.
pub fn compare_readers<A: Read, B: Read>(
    a: A,
    b: B,
    cancel: &CancellationToken,
) -> Result<ComparisonResult> {
    let mut a = BufReader::new(a);
    let mut b = BufReader::new(b);
    let mut differences = Vec::new();

    let stats = compare_streams(&mut a, &mut b, cancel, |d| {
        differences.push(d);
        Ok(())
    })?;

    Ok(ComparisonResult {
        differences,
        early_eof: stats.early_eof,
        bytes_compared: stats.bytes_compared,
    })
}

fn open_for_compare(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| BinGenError::io(path, e))?;
    Ok(BufReader::with_capacity(DEFAULT_READ_BUFFER_SIZE, file))
}

/// Compare two files on disk, streaming differences into a log at `log_path`.
///
/// The log is kept only if at least one difference was found; otherwise it is
/// discarded, along with any log an earlier run left at `log_path`. A cancelled
/// or failed comparison leaves no new log behind.
pub fn compare_files(
    path_a: &Path,
    path_b: &Path,
    log_path: &Path,
    cancel: &CancellationToken,
) -> Result<ComparisonSummary> {
    info!("comparing {} with {}", path_a.display(), path_b.display());

    let mut a = open_for_compare(path_a)?;
    let mut b = open_for_compare(path_b)?;
    let mut log = DifferenceLog::create(log_path)?;

    let stats = compare_streams(&mut a, &mut b, cancel, |d| log.record(&d))
        .map_err(|e| match e {
            BinGenError::Read { side: Side::First, source } => BinGenError::io(path_a, source),
            BinGenError::Read { side: Side::Second, source } => BinGenError::io(path_b, source),
            other => other,
        })?;

    debug!(
        "compared {} byte pair(s), {} difference(s), early eof: {:?}",
        stats.bytes_compared, stats.difference_count, stats.early_eof
    );

    let log_path = if stats.difference_count > 0 {
        Some(log.persist()?)
    } else {
        log.discard()?;
        None
    };

    Ok(ComparisonSummary {
        difference_count: stats.difference_count,
        early_eof: stats.early_eof,
        bytes_compared: stats.bytes_compared,
        log_path,
    })
}
