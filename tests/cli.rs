use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn dirmerge(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dirmerge").expect("Binary exists");
    cmd.current_dir(cwd);
    cmd
}

#[test]
fn merges_into_default_output_directory() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "A/x.txt", "hello");
    write(tmp.path(), "B/x.txt", "hello");
    write(tmp.path(), "B/nested/x.txt", "world");

    dirmerge(tmp.path()).args(&["A", "B"]).assert().success();

    let merged = tmp.path().join("merged");
    assert_eq!(fs::read_to_string(merged.join("x.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(merged.join("x_1.txt")).unwrap(), "world");
    assert_eq!(fs::read_dir(&merged).unwrap().count(), 2);
    assert!(tmp.path().join("A/x.txt").exists());
}

#[test]
fn rm_deletes_inputs_after_copy() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "A/a.txt", "a");
    write(tmp.path(), "B/b.txt", "b");

    dirmerge(tmp.path())
        .args(&["A", "B", "--out", "deep/out", "--rm"])
        .assert()
        .success();

    assert!(!tmp.path().join("A").exists());
    assert!(!tmp.path().join("B").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("deep/out/b.txt")).unwrap(),
        "b"
    );
}

#[test]
fn dry_run_prints_plan_and_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "A/a.txt", "a");
    write(tmp.path(), "B/a.txt", "a");

    dirmerge(tmp.path())
        .args(&["A", "B", "--dry", "--rm"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Skip duplicate \"B")
                .and(predicate::str::contains("Copy \"A"))
                .and(predicate::str::contains("Remove \"A\""))
                .and(predicate::str::contains("Remove \"B\"")),
        );

    assert!(tmp.path().join("A/a.txt").exists());
    assert!(!tmp.path().join("merged").exists());
}

#[test]
fn missing_input_fails_without_removing_anything() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "A/a.txt", "a");

    dirmerge(tmp.path())
        .args(&["A", "does-not-exist", "--rm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));

    assert!(tmp.path().join("A/a.txt").exists());
    assert!(!tmp.path().join("merged").exists());
}

#[test]
fn requires_at_least_one_directory() {
    let tmp = TempDir::new().unwrap();
    dirmerge(tmp.path()).assert().failure();
}

#[test]
fn verbosity_controls_log_output() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "A/a.txt", "a");

    dirmerge(tmp.path())
        .args(&["A", "--out", "quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    dirmerge(tmp.path())
        .args(&["A", "--out", "loud", "-vv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Copied 1 files"));
}

#[test]
fn verify_existing_warns_about_drift() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "A/a.txt", "fresh");
    write(tmp.path(), "merged/a.txt", "stale");

    dirmerge(tmp.path())
        .args(&["A", "--verify-existing", "-v"])
        .assert()
        .success()
        .stderr(predicate::str::contains("differs"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("merged/a.txt")).unwrap(),
        "stale"
    );
}

#[test]
fn logs_progress_every_hundred_files() {
    let tmp = TempDir::new().unwrap();
    for i in 0..105 {
        write(tmp.path(), &format!("A/f{}.txt", i), &i.to_string());
    }

    dirmerge(tmp.path())
        .args(&["A", "-vv"])
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Copied 100 files")
                .and(predicate::str::contains("Copied 105 files")),
        );

    assert_eq!(fs::read_dir(tmp.path().join("merged")).unwrap().count(), 105);
}

#[cfg(unix)]
#[test]
fn rm_keeps_symlink_targets_outside_inputs() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "ext/data.txt", "payload");
    fs::create_dir_all(tmp.path().join("A")).unwrap();
    std::os::unix::fs::symlink(tmp.path().join("ext/data.txt"), tmp.path().join("A/link.txt"))
        .unwrap();

    dirmerge(tmp.path())
        .args(&["A", "./A/", "--rm"])
        .assert()
        .success();

    assert!(!tmp.path().join("A").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("merged/link.txt")).unwrap(),
        "payload"
    );
    assert!(tmp.path().join("ext/data.txt").exists());
}
