#![expect(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const SCRIPT: &str = "set x 1\nproc show {v} {\n    puts $v\n}\n\nshow $x; show 2\n";

const LITERATE: &str = "A short literate script.\n>set x 1\nprose {\n>show $x\n";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn split_lists_numbered_statements() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "demo.gel", SCRIPT);

    cargo_bin_cmd!("gelstage")
        .arg("split")
        .arg(&script)
        .assert()
        .success()
        .stdout("0 -> set x 1\n1 -> proc show {v} {...\n2 -> show $x;\n3 ->  show 2\n");
}

#[test]
fn split_full_prints_statements_verbatim() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "demo.gel", SCRIPT);

    cargo_bin_cmd!("gelstage")
        .args(["split", "--full"])
        .arg(&script)
        .assert()
        .success()
        .stdout("set x 1\nproc show {v} {\n    puts $v\n}\nshow $x;\n show 2\n");
}

#[test]
fn split_grep_filters_by_regex() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "demo.gel", SCRIPT);

    cargo_bin_cmd!("gelstage")
        .args(["split", "--grep", r"^\s*show"])
        .arg(&script)
        .assert()
        .success()
        .stdout("2 -> show $x;\n3 ->  show 2\n");
}

#[test]
fn split_detects_literate_extension() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "notes.lit", LITERATE);

    cargo_bin_cmd!("gelstage")
        .arg("split")
        .arg(&doc)
        .assert()
        .success()
        .stdout("0 -> set x 1\n1 -> show $x\n");
}

#[test]
fn split_literate_flag_forces_filter() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "notes.txt", LITERATE);

    // read as a plain script the prose brace never closes
    cargo_bin_cmd!("gelstage")
        .arg("split")
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ends inside a statement"));

    cargo_bin_cmd!("gelstage")
        .args(["split", "--literate"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 -> show $x"));
}

#[test]
fn split_reports_unclosed_input() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "open.gel", "puts ok\nproc broken {\n  puts x\n");

    cargo_bin_cmd!("gelstage")
        .arg("split")
        .arg(&script)
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("open.gel ends inside a statement")
                .and(predicate::str::contains("1 unclosed '{'")),
        );
}

#[test]
fn split_saves_history() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "demo.gel", SCRIPT);
    let saved = dir.path().join("history.gel");

    cargo_bin_cmd!("gelstage")
        .arg("split")
        .arg(&script)
        .arg("--save-history")
        .arg(&saved)
        .assert()
        .success();

    // the blank line is the only thing lost
    assert_eq!(
        fs::read_to_string(&saved).unwrap(),
        "set x 1\nproc show {v} {\n    puts $v\n}\nshow $x; show 2\n"
    );
}

#[test]
fn filter_prints_code_lines() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "notes.lit", LITERATE);

    cargo_bin_cmd!("gelstage")
        .args(["filter", "--chunk", "3"])
        .arg(&doc)
        .assert()
        .success()
        .stdout("set x 1\nshow $x\n");
}

#[test]
fn filter_with_custom_marker() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "notes.lit", "|a\n>b\n|c\n");

    cargo_bin_cmd!("gelstage")
        .args(["filter", "--marker", "|"])
        .arg(&doc)
        .assert()
        .success()
        .stdout("a\nc\n");
}

#[test]
fn filter_rejects_bad_arguments() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "notes.lit", LITERATE);

    cargo_bin_cmd!("gelstage")
        .args(["filter", "--marker", ">>"])
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("single ASCII character"));

    cargo_bin_cmd!("gelstage")
        .args(["filter", "--chunk", "0"])
        .arg(&doc)
        .assert()
        .failure();
}

#[test]
fn missing_file_is_reported() {
    cargo_bin_cmd!("gelstage")
        .args(["split", "does-not-exist.gel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open does-not-exist.gel"));
}
