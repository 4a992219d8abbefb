//! Command-line behavior of the esorun binary

#[path = "common/mod.rs"]
mod common;
use assert_cmd::Command;
use common::write_source;
use predicates::prelude::*;
use tempfile::TempDir;

fn esorun() -> Command {
    let mut cmd = Command::cargo_bin("esorun").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn prints_banner_then_program_output() {
    let dir = TempDir::new().unwrap();
    let prog = write_source(&dir, "a.bf", "++++++++[>++++++++<-]>+.");
    esorun()
        .arg("bf")
        .arg(&prog)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("esorun-"))
        .stdout(predicate::str::contains("Brainfuck interpreter"))
        .stdout(predicate::str::ends_with("A"));
}

#[test]
fn banner_can_be_suppressed() {
    let dir = TempDir::new().unwrap();
    let prog = write_source(&dir, "sum.f", "2 3+.");
    esorun()
        .args(["false", "-n"])
        .arg(&prog)
        .assert()
        .success()
        .stdout("5");
}

#[test]
fn console_input_reads_whole_characters() {
    let dir = TempDir::new().unwrap();
    let prog = write_source(&dir, "code.f", "^.");
    esorun()
        .args(["false", "-n"])
        .arg(&prog)
        .write_stdin("é")
        .assert()
        .success()
        .stdout("233");
}

#[test]
fn runs_every_file_in_order() {
    let dir = TempDir::new().unwrap();
    let first = write_source(&dir, "one.bf93", "1.@");
    let second = write_source(&dir, "two.bf93", "2.@");
    esorun()
        .args(["befunge", "-n"])
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout("12");
}

#[test]
fn failure_aborts_the_rest_of_the_batch() {
    let dir = TempDir::new().unwrap();
    let bad = write_source(&dir, "bad.f", "1 0/");
    let good = write_source(&dir, "good.f", "\"second\"");
    esorun()
        .args(["false", "-n"])
        .arg(&bad)
        .arg(&good)
        .assert()
        .failure()
        .stdout(predicate::str::contains("second").not())
        .stderr(predicate::str::contains("Exception during execution ->"))
        .stderr(predicate::str::contains("Arithmetic error"))
        .stderr(predicate::str::contains("bad.f"))
        .stderr(predicate::str::contains("Source position:"))
        .stderr(predicate::str::contains("\x1b[").not());
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    esorun()
        .args(["bf", "-n"])
        .arg(dir.path().join("nope.bf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn debug_option_writes_transcript() {
    let dir = TempDir::new().unwrap();
    let prog = write_source(&dir, "hello.f", "1 2+.");
    esorun()
        .current_dir(dir.path())
        .args(["false", "-n", "-d"])
        .arg(&prog)
        .assert()
        .success()
        .stdout("3");

    let transcript = std::fs::read_to_string(dir.path().join("debug.hello.f.txt")).unwrap();
    assert!(transcript.starts_with("===="));
    assert!(transcript.contains("command created"));
}

#[test]
fn help_lists_languages() {
    esorun()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE"))
        .stdout(predicate::str::contains("befunge"))
        .stdout(predicate::str::contains("brainfuck"));
}

#[test]
fn bad_arguments_fail_with_usage_hint() {
    esorun()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: No language given"));

    esorun()
        .args(["cobol", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown language: cobol"));

    esorun()
        .args(["bf", "-s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not enough arguments for -s"));
}
