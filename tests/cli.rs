//! End-to-end tests for the `loft` binary.
//!
//! Tests cover:
//! 1. index with file and stdin input
//! 2. exit codes per failure phase
//! 3. fetch and verify against a built index
//! 4. generate -> index -> verify round trip

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

/// Helper to create a temporary input file.
fn create_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

/// Helper to run loft and return output.
fn run_loft(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loft"))
        .args(args)
        .output()
        .expect("Failed to run loft")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn path(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

// =============================================================================
// index
// =============================================================================

#[test]
fn test_index_file() {
    let input = create_file(b"A\nBB\nCCC");
    let output = NamedTempFile::new().unwrap();

    let result = run_loft(&["index", "-i", path(&input), "-o", path(&output)]);
    assert!(result.status.success(), "stderr: {}", stderr(&result));
    assert_eq!(fs::read_to_string(output.path()).unwrap(), "2,5,");
}

#[test]
fn test_index_hex_chunk_size_and_stats() {
    let input = create_file(b"A\nBB\nCCC");
    let output = NamedTempFile::new().unwrap();

    let result = run_loft(&[
        "index",
        "-i",
        path(&input),
        "-o",
        path(&output),
        "--chunk-size",
        "0x3",
        "--buffer-size",
        "1K",
        "--stats",
    ]);
    assert!(result.status.success());
    assert!(stderr(&result).contains("Offsets: 2"));
    assert_eq!(fs::read_to_string(output.path()).unwrap(), "2,5,");
}

#[test]
fn test_index_stdin_to_stdout() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_loft"))
        .args(["index", "-i", "-", "-o", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to run loft");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"x\nyy\n")
        .unwrap();
    let result = child.wait_with_output().unwrap();

    assert!(result.status.success());
    assert_eq!(stdout(&result), "2,5,");
}

#[test]
fn test_index_missing_input_exit_code() {
    let output = NamedTempFile::new().unwrap();
    let result = run_loft(&[
        "index",
        "-i",
        "/nonexistent/input.vcf",
        "-o",
        path(&output),
    ]);
    assert_eq!(result.status.code(), Some(2));
    assert!(stderr(&result).contains("cannot open input"));
}

#[test]
fn test_index_bad_output_exit_code() {
    let input = create_file(b"A\n");
    let result = run_loft(&[
        "index",
        "-i",
        path(&input),
        "-o",
        "/nonexistent/dir/offsets.txt",
    ]);
    assert_eq!(result.status.code(), Some(3));
}

#[test]
fn test_index_rejects_tiny_buffer() {
    let input = create_file(b"A\n");
    let output = NamedTempFile::new().unwrap();
    let result = run_loft(&[
        "index",
        "-i",
        path(&input),
        "-o",
        path(&output),
        "--buffer-size",
        "8",
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("invalid configuration"));
}

#[test]
fn test_usage_error_exit_code_differs_from_missing_input() {
    let result = run_loft(&["index", "-i", "in.vcf"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(stderr(&result).contains("--output"));

    let result = run_loft(&["--version"]);
    assert!(result.status.success());
}

#[test]
fn test_index_into_itself_is_refused() {
    let input = create_file(b"A\nBB\n");
    let result = run_loft(&["index", "-i", path(&input), "-o", path(&input)]);
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(fs::read(input.path()).unwrap(), b"A\nBB\n");
}

// =============================================================================
// fetch / verify
// =============================================================================

#[test]
fn test_fetch_records() {
    let input = create_file(b"##header\nchr1\t10\nchr1\t20\nchr2\t5\n");
    let index = NamedTempFile::new().unwrap();
    assert!(run_loft(&["index", "-i", path(&input), "-o", path(&index)])
        .status
        .success());

    let result = run_loft(&["fetch", "-i", path(&input), "-x", path(&index), "-r", "2"]);
    assert!(result.status.success());
    assert_eq!(stdout(&result), "chr1\t20\n");

    let result = run_loft(&[
        "fetch",
        "-i",
        path(&input),
        "-x",
        path(&index),
        "-r",
        "1",
        "-n",
        "3",
    ]);
    assert_eq!(stdout(&result), "chr1\t10\nchr1\t20\nchr2\t5\n");

    let result = run_loft(&["fetch", "-i", path(&input), "-x", path(&index), "-r", "4"]);
    assert!(!result.status.success());
    assert!(stderr(&result).contains("out of range"));
}

#[test]
fn test_verify_detects_stale_index() {
    let input = create_file(b"a\nb\nc\n");
    let index = create_file(b"2,4,6,");

    let result = run_loft(&["verify", "-i", path(&input), "-x", path(&index)]);
    assert!(result.status.success());
    assert_eq!(stdout(&result).trim(), "OK: 3 offsets");

    let stale = create_file(b"2,4,");
    let result = run_loft(&["verify", "-i", path(&input), "-x", path(&stale)]);
    assert_eq!(result.status.code(), Some(8));
}

// =============================================================================
// generate
// =============================================================================

#[test]
fn test_generate_index_verify_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let vcf = dir.path().join("synthetic.vcf");
    let offsets = dir.path().join("synthetic.offsets");
    let vcf = vcf.to_str().unwrap();
    let offsets = offsets.to_str().unwrap();

    let result = run_loft(&["generate", "-o", vcf, "-n", "2K", "--samples", "4"]);
    assert!(result.status.success(), "stderr: {}", stderr(&result));

    let result = run_loft(&["index", "-i", vcf, "-o", offsets, "--mmap"]);
    assert!(result.status.success(), "stderr: {}", stderr(&result));

    let result = run_loft(&["verify", "-i", vcf, "-x", offsets, "--chunk-size", "1K"]);
    assert!(result.status.success(), "stderr: {}", stderr(&result));

    let lines = fs::read(vcf).unwrap().iter().filter(|&&b| b == b'\n').count();
    assert_eq!(stdout(&result).trim(), format!("OK: {} offsets", lines));
}
