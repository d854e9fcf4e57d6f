use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn codemerge(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("codemerge").expect("binary exists");
    cmd.current_dir(dir)
        .env_remove("CODEMERGE_MAX_FILES")
        .env_remove("CODEMERGE_SORT")
        .env_remove("CODEMERGE_SEPARATOR_STYLE");
    cmd
}

#[test]
fn help_displays_usage() {
    let temp = tempfile::tempdir().unwrap();
    codemerge(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn merges_to_stdout_in_requested_order() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("b.py"), "print('b')").unwrap();
    fs::write(temp.path().join("a.py"), "print('a')").unwrap();

    codemerge(temp.path())
        .args(["--stdout", "--sort", "name", "b.py", "a.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE: a.py"))
        .stdout(predicate::str::is_match(r"(?s)print\('a'\).*print\('b'\)").unwrap());
}

#[test]
fn writes_date_stamped_file_and_warns_on_binary() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("ok.txt"), "fine").unwrap();
    fs::write(temp.path().join("blob.bin"), [0xffu8, 0xfe, 0x00]).unwrap();

    codemerge(temp.path())
        .args(["--output-dir", "out", "ok.txt", "blob.bin"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: blob.bin"));

    let written: Vec<_> = fs::read_dir(temp.path().join("out"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("merged-code-") && written[0].ends_with(".txt"));

    let merged = fs::read_to_string(temp.path().join("out").join(&written[0])).unwrap();
    assert!(merged.contains("fine"));
    assert!(merged.contains("// !!! ERROR READING FILE: blob.bin !!!"));
}

#[test]
fn rejects_more_files_than_allowed() {
    let temp = tempfile::tempdir().unwrap();
    for name in ["1.txt", "2.txt", "3.txt"] {
        fs::write(temp.path().join(name), name).unwrap();
    }

    codemerge(temp.path())
        .args(["--max-files", "2", "--stdout", "1.txt", "2.txt", "3.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Maximum limit of 2 files exceeded"));
}

#[test]
fn lists_plan_without_merging() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("big.md"), "x".repeat(2048)).unwrap();
    fs::write(temp.path().join("small.md"), "y").unwrap();

    codemerge(temp.path())
        .args(["--list", "--sort", "size", "big.md", "small.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. small.md  (1 Bytes)"))
        .stdout(predicate::str::contains("2. big.md  (2 KB)"))
        .stdout(predicate::str::contains("2 files ready to merge"));
}

#[test]
fn no_files_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    codemerge(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no files to merge"));
}
