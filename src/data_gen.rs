// src/data_gen.rs
//
// Chunked generation of semi-predictable binary data.

//! Generates an incrementing byte pattern with one random byte per four-byte group.
//!
//! Byte `i` of a chunk starting at `start_value` has the base value
//! `(start_value + i) mod 256`. Every byte whose local index is `3 mod 4`
//! is replaced by a uniformly random byte. Output is produced in chunks of at
//! most `chunk_size` bytes, and `start_value` advances by the chunk length
//! after each chunk, so the base pattern continues across chunk boundaries.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::constants::{BYTES_PER_MB, DEFAULT_CHUNK_SIZE, MAX_SIZE_MB, RANDOM_LANE, RANDOM_STRIDE};
use crate::error::{BinGenError, InputError, Result};

/// Parameters of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Total bytes to write
    pub total_len: u64,
    /// Base value of the first byte; only its value mod 256 matters
    pub start_value: u64,
    /// Upper bound on a single chunk, > 0
    pub chunk_size: u64,
}

impl GenerationRequest {
    pub fn new(total_len: u64, start_value: u64) -> Self {
        Self {
            total_len,
            start_value,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Request for `size_mb` megabytes, starting at the tool's default
    /// address of `size_mb / 1024`.
    pub fn from_megabytes(size_mb: u64) -> std::result::Result<Self, InputError> {
        if size_mb > MAX_SIZE_MB {
            return Err(InputError::TooLarge(size_mb));
        }
        Ok(Self::new(size_mb * BYTES_PER_MB, size_mb / 1024))
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of chunks this request is written in.
    pub fn chunk_count(&self) -> u64 {
        if self.chunk_size == 0 {
            return 0;
        }
        self.total_len.div_ceil(self.chunk_size)
    }

    fn first_chunk_len(&self) -> Result<usize> {
        let len = self.total_len.min(self.chunk_size);
        usize::try_from(len).map_err(|_| BinGenError::OutOfMemory { requested: len })
    }
}

/// Outcome of a completed generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub bytes_written: u64,
    pub chunks: u64,
    pub elapsed: Duration,
}

impl GenerationReport {
    /// Throughput in MB/s, zero for an instantaneous run.
    pub fn throughput_mbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        (self.bytes_written as f64 / BYTES_PER_MB as f64) / secs
    }
}

/// Deterministic value of the byte at `index` in a run starting at `start_value`.
#[inline]
pub fn base_value(start_value: u64, index: u64) -> u8 {
    (start_value.wrapping_add(index) % 256) as u8
}

/// True if the byte at local chunk index `index` is randomized.
#[inline]
pub fn is_random_position(index: usize) -> bool {
    index % RANDOM_STRIDE == RANDOM_LANE
}

/// Fill `chunk` with the pattern for a chunk beginning at `start_value`.
pub fn fill_chunk<R: Rng>(chunk: &mut [u8], start_value: u64, rng: &mut R) {
    let first = base_value(start_value, 0);
    for (i, b) in chunk.iter_mut().enumerate() {
        *b = first.wrapping_add(i as u8);
    }
    for b in chunk.iter_mut().skip(RANDOM_LANE).step_by(RANDOM_STRIDE) {
        *b = rng.random();
    }
}

fn alloc_chunk(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BinGenError::OutOfMemory { requested: len as u64 })?;
    Ok(buf)
}

/// Write the data described by `request` to `writer`, one chunk at a time.
///
/// `on_chunk` is called after every chunk with the running byte total.
/// Cancellation is checked before each chunk is generated and again before it
/// is written; a cancelled run returns [`BinGenError::Cancelled`] and leaves
/// whatever was already written in place.
pub fn write_data<W, R, F>(
    writer: &mut W,
    request: &GenerationRequest,
    rng: &mut R,
    cancel: &CancellationToken,
    mut on_chunk: F,
) -> Result<GenerationReport>
where
    W: Write + ?Sized,
    R: Rng,
    F: FnMut(u64),
{
    if request.chunk_size == 0 {
        return Err(BinGenError::Config("chunk size must be greater than zero".into()));
    }

    let start = Instant::now();
    let mut remaining = request.total_len;
    let mut address = request.start_value;
    let mut written = 0u64;
    let mut chunks = 0u64;

    // One buffer serves every chunk; only the last one can be shorter.
    let mut buf = alloc_chunk(request.first_chunk_len()?)?;

    while remaining > 0 {
        if cancel.is_cancelled() {
            return Err(BinGenError::Cancelled);
        }

        // chunk_len <= first_chunk_len, which already fits in usize
        let chunk_len = remaining.min(request.chunk_size) as usize;
        buf.resize(chunk_len, 0);
        fill_chunk(&mut buf, address, rng);

        if cancel.is_cancelled() {
            return Err(BinGenError::Cancelled);
        }
        writer.write_all(&buf)?;

        remaining -= chunk_len as u64;
        address = address.wrapping_add(chunk_len as u64);
        written += chunk_len as u64;
        chunks += 1;
        debug!("chunk {} written: {} bytes, {} remaining", chunks, chunk_len, remaining);
        on_chunk(written);
    }

    writer.flush()?;

    Ok(GenerationReport {
        bytes_written: written,
        chunks,
        elapsed: start.elapsed(),
    })
}

/// Create (or truncate) `path` and fill it per `request`.
///
/// On cancellation or any error the partially written file is removed, so no
/// partial output survives a failed run.
pub fn generate_file<R, F>(
    path: &Path,
    request: &GenerationRequest,
    rng: &mut R,
    cancel: &CancellationToken,
    on_chunk: F,
) -> Result<GenerationReport>
where
    R: Rng,
    F: FnMut(u64),
{
    info!(
        "generating {} bytes into {} ({} chunk(s) of up to {} bytes, start value {})",
        request.total_len,
        path.display(),
        request.chunk_count(),
        request.chunk_size,
        request.start_value
    );

    let mut file = File::create(path).map_err(|e| BinGenError::io(path, e))?;
    let result = write_data(&mut file, request, rng, cancel, on_chunk);
    drop(file);

    match result {
        Ok(report) => {
            info!(
                "wrote {} bytes in {} ({:.2} MB/s)",
                report.bytes_written,
                humantime::format_duration(report.elapsed),
                report.throughput_mbps()
            );
            Ok(report)
        }
        Err(err) => {
            warn!("generation of {} failed ({err}); removing partial output", path.display());
            remove_partial(path);
            Err(match err {
                BinGenError::Stream(source) => BinGenError::io(path, source),
                other => other,
            })
        }
    }
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove partial output {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(request: &GenerationRequest, seed: u64) -> Vec<u8> {
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(seed);
        write_data(&mut out, request, &mut rng, &CancellationToken::new(), |_| {})
            .expect("write_data failed");
        out
    }

    #[test]
    fn test_base_value_wraps() {
        assert_eq!(base_value(0, 0), 0);
        assert_eq!(base_value(250, 10), 4);
        assert_eq!(base_value(u64::MAX, 1), 0);
        assert_eq!(base_value(3, 256), 3);
    }

    #[test]
    fn test_fill_chunk_pattern() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut chunk = vec![0u8; 1000];
        fill_chunk(&mut chunk, 254, &mut rng);

        for (i, &b) in chunk.iter().enumerate() {
            if !is_random_position(i) {
                assert_eq!(b, base_value(254, i as u64), "byte {i}");
            }
        }
        assert_eq!(&chunk[..3], &[254, 255, 0]);
    }

    #[test]
    fn test_random_positions_are_randomized() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut chunk = vec![0u8; 64 * 1024];
        fill_chunk(&mut chunk, 0, &mut rng);

        // With 16K random slots, matching the base value everywhere is impossible in practice
        let matches = (RANDOM_LANE..chunk.len())
            .step_by(RANDOM_STRIDE)
            .filter(|&i| chunk[i] == base_value(0, i as u64))
            .count();
        assert!(matches < chunk.len() / RANDOM_STRIDE / 16, "{matches} random slots kept the base value");
    }

    #[test]
    fn test_exact_length_for_odd_sizes() {
        for len in [0u64, 1, 3, 4, 5, 17, 4096, 10_001] {
            let request = GenerationRequest::new(len, 9).with_chunk_size(1024);
            assert_eq!(run(&request, 1).len() as u64, len, "len {len}");
        }
    }

    #[test]
    fn test_base_continuous_across_chunks() {
        let request = GenerationRequest::new(10 * 1024 + 12, 77).with_chunk_size(1024);
        let data = run(&request, 3);

        for (k, &b) in data.iter().enumerate() {
            let local = k % 1024;
            if !is_random_position(local) {
                assert_eq!(b, base_value(77, k as u64), "global offset {k}");
            }
        }
    }

    #[test]
    fn test_random_lane_is_local_to_chunk() {
        // Chunk of 6: local lane 3 falls on global 3, 9, 15 ...
        let request = GenerationRequest::new(18, 0).with_chunk_size(6);
        let data = run(&request, 5);
        for k in [0usize, 1, 2, 4, 5, 6, 7, 8, 10, 11, 12, 13, 14, 16, 17] {
            assert_eq!(data[k], k as u8, "offset {k}");
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let request = GenerationRequest::new(8192, 1).with_chunk_size(3000);
        assert_eq!(run(&request, 99), run(&request, 99));
        assert_ne!(run(&request, 99), run(&request, 100));
    }

    #[test]
    fn test_chunk_count_and_reports() {
        let request = GenerationRequest::new(2500, 0).with_chunk_size(1000);
        assert_eq!(request.chunk_count(), 3);

        let mut seen = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let report = write_data(&mut Vec::<u8>::new(), &request, &mut rng, &CancellationToken::new(), |n| seen.push(n))
            .unwrap();
        assert_eq!(seen, vec![1000, 2000, 2500]);
        assert_eq!(report.bytes_written, 2500);
        assert_eq!(report.chunks, 3);
    }

    #[test]
    fn test_from_megabytes() {
        let request = GenerationRequest::from_megabytes(2048).unwrap();
        assert_eq!(request.total_len, 2048 * 1_048_576);
        assert_eq!(request.start_value, 2);
        assert_eq!(request.chunk_count(), 4);

        assert_eq!(GenerationRequest::from_megabytes(5).unwrap().start_value, 0);
        assert!(matches!(
            GenerationRequest::from_megabytes(u64::MAX),
            Err(InputError::TooLarge(_))
        ));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let request = GenerationRequest::new(10, 0).with_chunk_size(0);
        let mut rng = StdRng::seed_from_u64(0);
        let err = write_data(&mut Vec::<u8>::new(), &request, &mut rng, &CancellationToken::new(), |_| {});
        assert!(matches!(err, Err(BinGenError::Config(_))));
    }

    #[test]
    fn test_cancelled_before_start_writes_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = write_data(&mut out, &GenerationRequest::new(100, 0), &mut rng, &token, |_| {});
        assert!(matches!(err, Err(BinGenError::Cancelled)));
        assert!(out.is_empty());
    }
}
