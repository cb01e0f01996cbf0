//! Exit status and output of the `cache-prune` binary.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::{GIB, MIB, names_in, sparse_entry};
use predicates::prelude::*;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cache-prune"))
        .args(args)
        .output()
        .expect("failed to spawn cache-prune")
}

fn run_on(root: &Path, args: &[&str]) -> Output {
    let root = root.to_str().expect("temp path is UTF-8");
    let mut all = vec!["--cache-dir", root];
    all.extend_from_slice(args);
    run(&all)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stderr_lines(output: &Output) -> Vec<String> {
    stderr(output)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

#[test]
fn within_quota_exits_zero() {
    let temp = TempDir::new().unwrap();
    sparse_entry(temp.path(), "alpha", "obj1", 300 * MIB, 10);
    sparse_entry(temp.path(), "beta", "obj2", 200 * MIB, 20);

    let output = run_on(temp.path(), &["-s", "1", "-p", "0.8"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert!(predicate::str::contains("within boundaries").eval(&stderr(&output)));
    temp.child("alpha/obj1").assert(predicate::path::exists());
    temp.child("beta/obj2").assert(predicate::path::exists());
}

#[test]
fn over_quota_prunes_oldest_and_exits_zero() {
    let temp = TempDir::new().unwrap();
    for atime in 1..=10 {
        sparse_entry(temp.path(), "b", &format!("f{atime:02}"), GIB, atime);
    }

    let output = run_on(temp.path(), &["-s", "5", "-p", "0.8"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
    assert_eq!(names_in(temp.path(), "b"), vec!["f07", "f08", "f09", "f10"]);
    assert!(predicate::str::contains("Prune complete").eval(&stderr(&output)));
}

#[test]
fn dry_run_leaves_cache_alone() {
    let temp = TempDir::new().unwrap();
    for atime in 1..=4 {
        sparse_entry(temp.path(), "b", &format!("f{atime}"), GIB, atime);
    }

    let output = run_on(temp.path(), &["-s", "2", "-p", "0.5", "--dry-run"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(names_in(temp.path(), "b"), vec!["f1", "f2", "f3", "f4"]);
    assert!(predicate::str::contains("Dry run").eval(&stderr(&output)));
}

#[test]
fn quiet_suppresses_informational_output() {
    let temp = TempDir::new().unwrap();
    sparse_entry(temp.path(), "b", "f", MIB, 1);

    let output = run_on(temp.path(), &["-q"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stderr.is_empty(), "stderr: {}", stderr(&output));
}

#[test]
fn zero_ratio_exits_one_without_touching_cache() {
    let temp = TempDir::new().unwrap();
    sparse_entry(temp.path(), "b", "entry", 2 * GIB, 1);

    let output = run_on(temp.path(), &["-s", "1", "-p", "0"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1, "stderr: {}", stderr(&output));
    assert!(predicate::str::contains("prune ratio 0").eval(&lines[0]));
    temp.child("b/entry").assert(predicate::path::exists());
}

#[test]
fn missing_cache_dir_exits_one() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let output = run_on(&missing, &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1, "stderr: {}", stderr(&output));
    assert!(predicate::str::contains("does not exist").eval(&lines[0]));
}

#[test]
fn usage_errors_exit_one() {
    let temp = TempDir::new().unwrap();

    let no_dir = run(&["-s", "5"]);
    assert_eq!(no_dir.status.code(), Some(1));
    assert_eq!(stderr_lines(&no_dir).len(), 1, "stderr: {}", stderr(&no_dir));

    let bad_size = run_on(temp.path(), &["-s", "lots"]);
    assert_eq!(bad_size.status.code(), Some(1));
    assert!(bad_size.stdout.is_empty());
    let lines = stderr_lines(&bad_size);
    assert_eq!(lines.len(), 1, "stderr: {}", stderr(&bad_size));
    assert!(predicate::str::contains("'lots'").eval(&lines[0]));

    let unknown = run_on(temp.path(), &["--frobnicate"]);
    assert_eq!(unknown.status.code(), Some(1));
}

#[test]
fn help_exits_zero() {
    let output = run(&["--help"]);

    assert_eq!(output.status.code(), Some(0));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(predicate::str::contains("--cache-dir").eval(&text));
    assert!(predicate::str::contains("--prune-ratio").eval(&text));
}
