//! CLI integration tests for bitglyph
//!
//! Tests the binary as a user would interact with it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn bitglyph() -> Command {
    Command::cargo_bin("bitglyph").unwrap()
}

fn encode_stdin(args: &[&str], input: &[u8]) -> Vec<u8> {
    bitglyph()
        .arg("encode")
        .args(args)
        .write_stdin(input.to_vec())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone()
}

// ============================================================================
// Basic Commands
// ============================================================================

#[test]
fn test_help() {
    bitglyph()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("restricted alphabets"));
}

#[test]
fn test_version() {
    bitglyph()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bitglyph"));
}

#[test]
fn test_config_list() {
    bitglyph()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("url_safe"))
        .stdout(predicate::str::contains("base58"))
        .stdout(predicate::str::contains("base-4096"));
}

#[test]
fn test_config_list_json() {
    bitglyph()
        .args(["config", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default\": \"url_safe\""))
        .stdout(predicate::str::contains("\"name\": \"dna\""));
}

#[test]
fn test_config_show() {
    bitglyph()
        .args(["config", "show", "dna"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Radix: 4"))
        .stdout(predicate::str::contains("ACGT"));
}

#[test]
fn test_config_show_suggests_name() {
    bitglyph()
        .args(["config", "show", "base5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did you mean 'base58'"));
}

// ============================================================================
// Encode/Decode Round-trips
// ============================================================================

#[test]
fn test_roundtrip_stdin() {
    let encoded = encode_stdin(&[], b"hello world");
    assert!(encoded.ends_with(b"\n"));

    bitglyph()
        .arg("decode")
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout("hello world");
}

#[test]
fn test_roundtrip_chunked_payload() {
    let data: Vec<u8> = (0..5000u32).map(|i| (i * 7 % 251) as u8).collect();
    let encoded = encode_stdin(&["-a", "base62"], &data);

    bitglyph()
        .args(["decode", "-a", "base62"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout(data);
}

#[test]
fn test_encode_uses_only_alphabet_symbols() {
    let encoded = encode_stdin(&["-a", "dna"], b"genome");
    let text = String::from_utf8(encoded).unwrap();
    assert!(text.trim_end().chars().all(|c| "ACGT".contains(c)));
}

#[test]
fn test_decode_hex() {
    let encoded = encode_stdin(&[], &[0xde, 0xad, 0xbe, 0xef]);

    bitglyph()
        .args(["decode", "--hex"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout("deadbeef\n");
}

#[test]
fn test_file_input_and_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bin");
    let encoded = dir.path().join("encoded.txt");
    let decoded = dir.path().join("decoded.bin");
    let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    fs::write(&input, &data).unwrap();

    bitglyph()
        .arg("encode")
        .arg(&input)
        .arg("-o")
        .arg(&encoded)
        .assert()
        .success()
        .stdout("");

    bitglyph()
        .arg("decode")
        .arg(&encoded)
        .arg("-o")
        .arg(&decoded)
        .assert()
        .success();

    assert_eq!(fs::read(&decoded).unwrap(), data);
}

#[test]
fn test_alphabet_mismatch_fails() {
    let encoded = encode_stdin(&["-a", "url_safe"], b"payload");

    bitglyph()
        .args(["decode", "-a", "dna"])
        .write_stdin(encoded)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid character"));
}

#[test]
fn test_whitespace_alphabet_roundtrip() {
    let dir = TempDir::new().unwrap();
    let layer = dir.path().join("spaced.toml");
    fs::write(
        &layer,
        "[codec]\nalphabet = \"spaced\"\n\n[alphabets.spaced]\nchars = \" abcdefg\\t\"\n",
    )
    .unwrap();

    for data in [&b"hi"[..], &[0u8; 3][..], &[0xffu8; 40][..]] {
        let encoded = bitglyph()
            .arg("--config")
            .arg(&layer)
            .arg("encode")
            .write_stdin(data.to_vec())
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        if data.len() <= 32 {
            assert!(encoded.starts_with(b" "), "small marker is the space symbol");
        }

        bitglyph()
            .arg("--config")
            .arg(&layer)
            .arg("decode")
            .write_stdin(encoded)
            .assert()
            .success()
            .stdout(data.to_vec());
    }
}

// ============================================================================
// Inspect
// ============================================================================

#[test]
fn test_inspect_small() {
    let encoded = encode_stdin(&[], b"tiny");

    bitglyph()
        .arg("inspect")
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout(predicate::str::contains("small"))
        .stdout(predicate::str::contains("payload bytes:   4"));
}

#[test]
fn test_inspect_json_chunked() {
    let encoded = encode_stdin(&[], &[7u8; 100]);

    bitglyph()
        .args(["inspect", "--json"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"chunked\""))
        .stdout(predicate::str::contains("\"declared_length\": 100"));
}

#[test]
fn test_inspect_truncated_body() {
    let encoded = encode_stdin(&[], &[7u8; 100]);
    let mut text = String::from_utf8(encoded).unwrap();
    text.truncate(text.trim_end().len() - 3);

    bitglyph()
        .arg("inspect")
        .write_stdin(text)
        .assert()
        .failure()
        .stderr(predicate::str::contains("body length"));
}

// ============================================================================
// Global Options
// ============================================================================

#[test]
fn test_threshold_override() {
    let encoded = encode_stdin(&["--threshold", "0"], b"hi");

    bitglyph()
        .args(["inspect", "--threshold", "0"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout(predicate::str::contains("chunked"));
}

#[test]
fn test_threshold_too_large() {
    bitglyph()
        .args(["encode", "--threshold", "300"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds maximum"));
}

#[test]
fn test_backend_none() {
    let data = vec![3u8; 50_000];
    let encoded = encode_stdin(&["--backend", "none"], &data);

    bitglyph()
        .args(["decode", "--backend", "cpu"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout(data);
}

#[test]
fn test_backend_invalid() {
    bitglyph()
        .args(["encode", "--backend", "gpu"])
        .write_stdin("x")
        .assert()
        .failure();
}

#[test]
fn test_empty_input_rejected() {
    bitglyph()
        .arg("encode")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_max_size_limit() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("big.bin");
    fs::write(&input, vec![1u8; 64]).unwrap();

    bitglyph()
        .args(["encode", "--max-size", "10"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Use --force"));

    bitglyph()
        .args(["encode", "--max-size", "10", "--force", "--quiet"])
        .arg(&input)
        .assert()
        .success();
}

#[test]
fn test_stdin_max_size_limit() {
    bitglyph()
        .args(["encode", "--max-size", "4"])
        .write_stdin("too long")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds maximum"));
}

#[test]
fn test_config_layer_from_file() {
    let dir = TempDir::new().unwrap();
    let layer = dir.path().join("layer.toml");
    fs::write(
        &layer,
        "[codec]\nalphabet = \"dna\"\n\n[alphabets.binary]\nchars = \"01\"\n",
    )
    .unwrap();

    let encoded = bitglyph()
        .arg("--config")
        .arg(&layer)
        .arg("encode")
        .write_stdin("abc")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(encoded.clone()).unwrap();
    assert!(text.trim_end().chars().all(|c| "ACGT".contains(c)));

    bitglyph()
        .arg("--config")
        .arg(&layer)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("binary"));
}

#[test]
fn test_bench_runs() {
    bitglyph()
        .args(["bench", "--size", "4096", "--iterations", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sequential"))
        .stdout(predicate::str::contains("CPU reference"))
        .stdout(predicate::str::contains("NO").not());
}
