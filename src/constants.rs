// src/constants.rs
//
// Centralized constants for bingen to avoid hardcoded values throughout the codebase

/// One megabyte as the tool counts it (1 MiB)
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Chunk size used by the generator (512 MiB)
///
/// Each chunk is allocated, filled and written in a single call, so this is
/// also the peak buffer size of a generation run.
pub const DEFAULT_CHUNK_SIZE: u64 = 512 * BYTES_PER_MB;

/// Every `RANDOM_STRIDE`-th byte of a chunk is randomized
pub const RANDOM_STRIDE: usize = 4;

/// Local index (mod `RANDOM_STRIDE`) of the randomized byte in each group
pub const RANDOM_LANE: usize = 3;

/// Default output file stem
pub const DEFAULT_OUTPUT_NAME: &str = "test";

/// Default output file extension
pub const DEFAULT_OUTPUT_EXTENSION: &str = "bin";

/// Name of the difference log written by `compare`
pub const DIFF_LOG_NAME: &str = "differences.txt";

/// How many times an interactive prompt is repeated before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Buffer size for the comparator's readers (1 MiB)
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// The comparator polls for cancellation once per this many byte pairs
pub const CANCEL_CHECK_INTERVAL: u64 = 64 * 1024;

/// Buffer size for the difference log writer (64 KiB)
pub const DIFF_LOG_BUFFER_SIZE: usize = 64 * 1024;

/// Upper bound on a requested size in MB, so `size_mb * BYTES_PER_MB` fits in a u64
pub const MAX_SIZE_MB: u64 = u64::MAX / BYTES_PER_MB;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Overrides the generator chunk size (bytes)
pub const ENV_CHUNK_SIZE: &str = "BINGEN_CHUNK_SIZE";

/// Overrides the directory output files and the difference log are written to
pub const ENV_OUTPUT_DIR: &str = "BINGEN_OUTPUT_DIR";

/// Overrides the interactive retry budget
pub const ENV_MAX_ATTEMPTS: &str = "BINGEN_MAX_ATTEMPTS";
