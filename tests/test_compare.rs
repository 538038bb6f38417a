// tests/test_compare.rs
//
// Integration tests for compare_files: identical copies, single-byte
// differences, strict prefixes, and difference log handling.

use anyhow::Result;
use bingen::{compare_files, generate_file, CancellationToken, EarlyEof, GenerationRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).expect("failed to write test file");
    path
}

fn log_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("differences.txt")
}

fn only_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_generated_file_against_its_copy() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let a = temp_dir.path().join("a.bin");
    let b = temp_dir.path().join("b.bin");

    let request = GenerationRequest::new(300_000, 5).with_chunk_size(65_536);
    let mut rng = StdRng::seed_from_u64(8);
    generate_file(&a, &request, &mut rng, &CancellationToken::new(), |_| {})?;
    fs::copy(&a, &b)?;

    let summary = compare_files(&a, &b, &log_in(&temp_dir), &CancellationToken::new())?;

    assert!(summary.identical());
    assert_eq!(summary.early_eof, EarlyEof::Neither);
    assert_eq!(summary.bytes_compared, 300_000);
    assert_eq!(summary.log_path, None);
    assert!(!log_in(&temp_dir).exists());
    assert_eq!(only_entries(temp_dir.path()), vec!["a.bin", "b.bin"]);
    println!("✅ identical copy compared clean, no log persisted");
    Ok(())
}

#[test]
fn test_single_difference_is_logged() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let original: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
    let mut changed = original.clone();
    changed[4097] = original[4097] ^ 0xFF;

    let a = write(&temp_dir, "a.bin", &original);
    let b = write(&temp_dir, "b.bin", &changed);

    let summary = compare_files(&a, &b, &log_in(&temp_dir), &CancellationToken::new())?;

    assert!(!summary.identical());
    assert_eq!(summary.difference_count, 1);
    assert_eq!(summary.log_path.as_deref(), Some(log_in(&temp_dir).as_path()));

    let text = fs::read_to_string(log_in(&temp_dir))?;
    let expected = format!(
        "Difference found at address 0x1001: {:02x} vs {:02x}\n",
        original[4097], changed[4097]
    );
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn test_many_differences_one_line_each() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let a = write(&temp_dir, "a.bin", &[0u8; 64]);
    let b = write(&temp_dir, "b.bin", &[1u8; 64]);

    let summary = compare_files(&a, &b, &log_in(&temp_dir), &CancellationToken::new())?;
    assert_eq!(summary.difference_count, 64);

    let text = fs::read_to_string(log_in(&temp_dir))?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 64);
    assert_eq!(lines[0], "Difference found at address 0x0: 00 vs 01");
    assert_eq!(lines[63], "Difference found at address 0x3f: 00 vs 01");
    Ok(())
}

#[test]
fn test_strict_prefix_is_identical_with_early_eof() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let long: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
    let short = write(&temp_dir, "short.bin", &long[..1000]);
    let long = write(&temp_dir, "long.bin", &long);

    let summary = compare_files(&short, &long, &log_in(&temp_dir), &CancellationToken::new())?;
    assert!(summary.identical());
    assert_eq!(summary.early_eof, EarlyEof::FirstFile);
    assert_eq!(summary.bytes_compared, 1000);
    assert!(!log_in(&temp_dir).exists());

    let summary = compare_files(&long, &short, &log_in(&temp_dir), &CancellationToken::new())?;
    assert!(summary.identical());
    assert_eq!(summary.early_eof, EarlyEof::SecondFile);
    assert!(!log_in(&temp_dir).exists());
    Ok(())
}

#[test]
fn test_stale_log_removed_when_identical() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let a = write(&temp_dir, "a.bin", b"same bytes");
    let b = write(&temp_dir, "b.bin", b"same bytes");
    fs::write(log_in(&temp_dir), "Difference found at address 0x0: 00 vs 01\n")?;

    let summary = compare_files(&a, &b, &log_in(&temp_dir), &CancellationToken::new())?;
    assert!(summary.identical());
    assert!(!log_in(&temp_dir).exists());
    Ok(())
}

#[test]
fn test_missing_input_is_io_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let a = write(&temp_dir, "a.bin", b"x");
    let missing = temp_dir.path().join("missing.bin");

    let err = compare_files(&a, &missing, &log_in(&temp_dir), &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, bingen::BinGenError::Io { .. }));
    assert!(!log_in(&temp_dir).exists());
}

#[test]
fn test_unreadable_second_input_is_named_in_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let a = write(&temp_dir, "a.bin", b"some bytes");
    let subdir = temp_dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    let err = compare_files(&a, &subdir, &log_in(&temp_dir), &CancellationToken::new()).unwrap_err();
    match err {
        bingen::BinGenError::Io { ref path, .. } => assert_eq!(path, &subdir),
        other => panic!("expected Io error naming {}, got {other:?}", subdir.display()),
    }
    assert!(!log_in(&temp_dir).exists());
}

#[test]
fn test_unreadable_first_input_is_named_in_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let b = write(&temp_dir, "b.bin", b"some bytes");
    let subdir = temp_dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    let err = compare_files(&subdir, &b, &log_in(&temp_dir), &CancellationToken::new()).unwrap_err();
    match err {
        bingen::BinGenError::Io { ref path, .. } => assert_eq!(path, &subdir),
        other => panic!("expected Io error naming {}, got {other:?}", subdir.display()),
    }
}
