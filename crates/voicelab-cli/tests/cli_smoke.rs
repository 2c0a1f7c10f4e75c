use assert_cmd::Command;
use predicates::prelude::*;

fn voicelab() -> Command {
    Command::cargo_bin("voicelab").unwrap()
}

fn write_config(dir: &std::path::Path, prompts: &[&str]) -> std::path::PathBuf {
    let path = dir.join("voicelab.yaml");
    let prompt_lines: String = prompts
        .iter()
        .map(|p| format!("  - \"{}\"\n", p))
        .collect();
    std::fs::write(
        &path,
        format!(
            "version: 1\n\
             experiment: smoke\n\
             settings:\n\
             \x20 pacing_ms: 0\n\
             \x20 assess_types: false\n\
             prompts:\n{}\
             output:\n\
             \x20 jsonl: {}\n\
             \x20 csv: {}\n",
            prompt_lines,
            dir.join("r.jsonl").display(),
            dir.join("r.csv").display(),
        ),
    )
    .unwrap();
    path
}

#[test]
fn version_prints_package_version() {
    voicelab()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("voicelab "));
}

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("voicelab.yaml");

    voicelab()
        .current_dir(dir.path())
        .args(["init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));
    assert!(config.exists());

    voicelab()
        .current_dir(dir.path())
        .args(["init", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("refusing to overwrite"));
}

#[test]
fn missing_config_exits_with_config_error() {
    voicelab()
        .args(["run", "--config", "/nonexistent/voicelab.yaml", "--provider", "fake"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fatal"));
}

#[test]
fn unknown_persona_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &["p"]);

    voicelab()
        .args(["run", "--provider", "fake", "--personas", "socrates", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown persona key"));
}

#[test]
fn fake_run_completes_matrix_and_is_resumable() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &["one", "two"]);

    // 1 persona x 2 prompts x (control + 16 overlays)
    voicelab()
        .args(["run", "--provider", "fake", "--personas", "plato", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("34 of"));

    let csv = std::fs::read_to_string(dir.path().join("r.csv")).unwrap();
    assert_eq!(csv.lines().count(), 35); // header + 34 rows

    // Second invocation skips everything already logged.
    voicelab()
        .args(["run", "--provider", "fake", "--personas", "plato", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("34 skipped"));
    let csv_after = std::fs::read_to_string(dir.path().join("r.csv")).unwrap();
    assert_eq!(csv, csv_after);
}

#[test]
fn summarize_reports_means_from_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &["one"]);

    voicelab()
        .args(["run", "--provider", "fake", "--personas", "plato", "--config"])
        .arg(&config)
        .assert()
        .success();

    voicelab()
        .args(["summarize", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Voice accuracy by persona"))
        .stdout(predicate::str::contains("plato"))
        .stdout(predicate::str::contains("INTJ"));
}

#[test]
fn status_counts_logged_trials() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &["one"]);

    voicelab()
        .args(["status", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of"));

    voicelab()
        .args(["run", "--provider", "fake", "--personas", "plato", "--config"])
        .arg(&config)
        .assert()
        .success();

    voicelab()
        .args(["status", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("17 of"));
}
