//! CLI Driver Integration Tests
//!
//! The compilation driver against real files on disk.

use ampl_cli::{CliError, Driver};
use bytecode::Program;
use std::fs;

const SOURCE: &str = "program demo:\n\
                      inc: takes n as integer returns integer\n\
                      \x20 back n + 1\n\
                      end\n\
                      main:\n\
                      \x20 vars x as integer\n\
                      \x20 input x; let x = inc(x); output x\n\
                      end\n";

/// Test: the listing file matches what the library compiles
#[test]
fn test_driver_listing_matches_library_output() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("demo.ampl");
    fs::write(&source_path, SOURCE).unwrap();

    let program = Driver::new()
        .compile_file(source_path.to_str().unwrap())
        .unwrap();

    let listing = fs::read_to_string(dir.path().join("demo.s")).unwrap();
    let expected = compiler::compile(SOURCE).unwrap();
    assert_eq!(listing, expected.to_string());
    assert_eq!(program, expected);
}

/// Test: compile errors carry the file path and the source position
#[test]
fn test_driver_error_carries_path_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("bad.ampl");
    fs::write(&source_path, "program p:\nmain:\n  output y\nend").unwrap();

    let err = Driver::new()
        .compile_file(source_path.to_str().unwrap())
        .unwrap_err();

    let rendered = err.to_string();
    assert!(rendered.contains("bad.ampl"), "got: {}", rendered);
    assert!(
        rendered.ends_with(":3:10: unknown identifier 'y'"),
        "got: {}",
        rendered
    );
}

/// Test: a stale listing from an earlier run is replaced
#[test]
fn test_driver_overwrites_stale_listing() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("demo.ampl");
    let listing_path = dir.path().join("demo.s");
    fs::write(&source_path, SOURCE).unwrap();
    fs::write(&listing_path, "stale listing\n").unwrap();

    Driver::new()
        .compile_file(source_path.to_str().unwrap())
        .unwrap();

    let listing = fs::read_to_string(&listing_path).unwrap();
    assert!(listing.starts_with(".program demo\n"));
    assert!(!listing.contains("stale"));
}

/// Test: the binary encoding survives a trip through a file
#[test]
fn test_driver_binary_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("demo.ampl");
    let binary_path = dir.path().join("demo.amb");
    fs::write(&source_path, SOURCE).unwrap();

    let program = Driver::new()
        .with_check_only(true)
        .compile_file(source_path.to_str().unwrap())
        .unwrap();
    fs::write(&binary_path, program.to_bytes()).unwrap();

    let bytes = fs::read(&binary_path).unwrap();
    let restored = Program::from_bytes(&bytes).unwrap();
    assert_eq!(restored, program);
}

/// Test: check mode still reports errors and writes nothing
#[test]
fn test_driver_check_mode_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("bad.ampl");
    fs::write(&source_path, "program p: main: output x end").unwrap();

    let err = Driver::new()
        .with_check_only(true)
        .compile_file(source_path.to_str().unwrap())
        .unwrap_err();

    assert!(matches!(err, CliError::Compile { .. }));
    assert!(!dir.path().join("bad.s").exists());
}

/// Test: the output override may point into another directory
#[test]
fn test_driver_output_into_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    let source_path = dir.path().join("demo.ampl");
    let target = out_dir.join("prog.s");
    fs::write(&source_path, SOURCE).unwrap();

    Driver::new()
        .with_output(&target)
        .compile_file(source_path.to_str().unwrap())
        .unwrap();

    assert!(target.exists());
    assert!(!dir.path().join("demo.s").exists());
}
