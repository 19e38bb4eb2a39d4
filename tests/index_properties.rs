//! Property tests for the offset index.
//!
//! Tests verify:
//! 1. Completeness: one offset per terminator
//! 2. Monotonicity: offsets strictly increase
//! 3. Correctness: a terminator at p yields p + 1
//! 4. Chunk-boundary invariance (buffered and mmap readers)
//! 5. No overrun under many forced flushes
//! 6. End-of-file flush keeps the tail

use loft::commands::IndexCommand;
use loft::index::OffsetIndex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to create a temporary input file.
fn create_input(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

/// Random line-oriented bytes: short and long lines, empty lines, no final
/// newline roughly half the time.
fn random_lines(seed: u64, lines: usize) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut data = Vec::new();
    for _ in 0..lines {
        let len = match rng.gen_range(0..10) {
            0 => 0,
            1 => rng.gen_range(200..2000),
            _ => rng.gen_range(1..80),
        };
        for _ in 0..len {
            data.push(rng.gen_range(b' '..=b'~'));
        }
        data.push(b'\n');
    }
    if rng.gen_bool(0.5) {
        data.extend_from_slice(b"chr1\t12345\t.\tA\tG");
    }
    data
}

/// Expected offsets by definition: every position p holding '\n' gives p + 1.
fn expected_offsets(data: &[u8]) -> Vec<u64> {
    data.iter()
        .enumerate()
        .filter(|(_, &b)| b == b'\n')
        .map(|(p, _)| p as u64 + 1)
        .collect()
}

fn render(offsets: &[u64]) -> String {
    offsets.iter().map(|o| format!("{},", o)).collect()
}

fn index_file(input: &NamedTempFile, cmd: &IndexCommand) -> String {
    let output = NamedTempFile::new().unwrap();
    cmd.run(input.path(), output.path()).unwrap();
    fs::read_to_string(output.path()).unwrap()
}

// =============================================================================
// Example scenarios
// =============================================================================

#[test]
fn test_example_scenarios() {
    let cases: [(&[u8], &str); 4] = [
        (b"A\nBB\nCCC", "2,5,"),
        (b"", ""),
        (b"ABCDEFG", ""),
        (b"A\n", "2,"),
    ];
    for (input, expected) in cases {
        let file = create_input(input);
        assert_eq!(index_file(&file, &IndexCommand::new()), expected);
    }
}

#[test]
fn test_output_is_truncated() {
    let input = create_input(b"A\n");
    let output = NamedTempFile::new().unwrap();
    fs::write(output.path(), "stale contents that are much longer").unwrap();

    IndexCommand::new().run(input.path(), output.path()).unwrap();
    assert_eq!(fs::read_to_string(output.path()).unwrap(), "2,");
}

// =============================================================================
// P1-P3: completeness, monotonicity, correctness
// =============================================================================

#[test]
fn test_offsets_match_definition() {
    for seed in 0..8 {
        let data = random_lines(seed, 500);
        let file = create_input(&data);
        let out = index_file(&file, &IndexCommand::new().with_chunk_size(1000));

        let index = OffsetIndex::from_bytes(out.as_bytes()).unwrap();
        let expected = expected_offsets(&data);

        assert_eq!(index.len(), expected.len(), "seed {}", seed);
        assert!(index.offsets().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(index.offsets(), expected.as_slice());
        assert_eq!(out, render(&expected));
    }
}

// =============================================================================
// P4: chunk-boundary invariance
// =============================================================================

#[test]
fn test_chunk_size_invariance() {
    let data = random_lines(99, 300);
    let file = create_input(&data);

    let reference = index_file(&file, &IndexCommand::new().with_chunk_size(data.len()));
    for chunk_size in [1, 2, 7, 511, 4096, data.len() - 1, data.len() + 100] {
        let out = index_file(&file, &IndexCommand::new().with_chunk_size(chunk_size));
        assert_eq!(out, reference, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_mmap_matches_buffered() {
    let data = random_lines(7, 400);
    let file = create_input(&data);

    let buffered = index_file(&file, &IndexCommand::new().with_chunk_size(333));
    for chunk_size in [1, 333, data.len()] {
        let mapped = index_file(
            &file,
            &IndexCommand::new()
                .with_chunk_size(chunk_size)
                .with_mmap(true),
        );
        assert_eq!(mapped, buffered);
    }
}

#[test]
fn test_mmap_empty_file() {
    let file = create_input(b"");
    let out = index_file(&file, &IndexCommand::new().with_mmap(true));
    assert_eq!(out, "");
}

// =============================================================================
// P5-P6: bounded buffer, tail flush
// =============================================================================

#[test]
fn test_many_flushes_never_overrun() {
    // 200k short lines push offsets past 6 digits
    let data = b"0/1\n".repeat(200_000);
    let file = create_input(&data);
    let output = NamedTempFile::new().unwrap();

    let stats = IndexCommand::new()
        .with_chunk_size(4096)
        .with_buffer_capacity(64)
        .run(file.path(), output.path())
        .unwrap();

    assert_eq!(stats.offsets, 200_000);
    assert!(stats.flushes > 1_000);
    assert!(stats.peak_buffer <= stats.buffer_capacity);

    let out = fs::read(output.path()).unwrap();
    assert_eq!(stats.bytes_written, out.len() as u64);
    let index = OffsetIndex::from_bytes(&out).unwrap();
    assert_eq!(index.offsets(), expected_offsets(&data).as_slice());
}

#[test]
fn test_tail_flushed_without_reaching_threshold() {
    // Buffer never fills; everything arrives in the final drain.
    let data = b"a\nb\nc\n";
    let file = create_input(data);
    let output = NamedTempFile::new().unwrap();

    let stats = IndexCommand::new()
        .with_buffer_capacity(1 << 20)
        .run(file.path(), output.path())
        .unwrap();

    assert_eq!(stats.flushes, 1);
    assert_eq!(fs::read_to_string(output.path()).unwrap(), "2,4,6,");
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn test_missing_input_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.vcf");
    let output = dir.path().join("offsets.txt");

    let err = IndexCommand::new().run(&input, &output).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output() {
    let input = create_input(b"A\n");
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("no_such_dir").join("offsets.txt");

    let err = IndexCommand::new().run(input.path(), &output).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_output_same_as_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("calls.vcf");
    fs::write(&input, b"A\nBB\nCCC\n").unwrap();

    let err = IndexCommand::new().run(&input, &input).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert_eq!(fs::read(&input).unwrap(), b"A\nBB\nCCC\n");

    // Same file reached through a different spelling of the path.
    let aliased = dir.path().join(".").join("calls.vcf");
    assert!(IndexCommand::new().run(&input, &aliased).is_err());
    assert_eq!(fs::read(&input).unwrap(), b"A\nBB\nCCC\n");
}
