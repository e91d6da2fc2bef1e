//! Integration test: run the binary against a corpus on disk

use std::process::Command;
use tempfile::TempDir;

const CORPUS_JSON: &str = r#"{
  "verses": [
    "1 Nephi 1:1 I was born of goodly parents",
    "Alma 1:1 The people were at peace",
    "Alma 1:2 They built a great temple"
  ],
  "verseMeta": [
    {"kind": "verse", "book": "1 Nephi", "chapter": 1, "verseNumber": 1},
    {"kind": "verse", "book": "Alma", "chapter": 1, "verseNumber": 1},
    {"kind": "verse", "book": "Alma", "chapter": 1, "verseNumber": 2}
  ]
}"#;

/// Temp dir holding `corpus.json` and a config that logs inside the dir.
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("corpus.json"), CORPUS_JSON).expect("write corpus");
    let log = dir.path().join("verse-canvas.log");
    std::fs::write(
        dir.path().join("config.toml"),
        format!("log_file_path = {:?}\n", log.display().to_string()),
    )
    .expect("write config");
    dir
}

fn run(dir: &TempDir, args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_verse-canvas"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute binary");
    assert!(
        output.status.success(),
        "binary failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_verse-canvas"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("0.1.0"),
        "Expected output to contain version '0.1.0', but got: {}",
        stdout
    );
}

#[test]
fn search_prints_matches_with_references() {
    let dir = workspace();
    let stdout = run(&dir, &["search", "corpus.json", "PEOPLE"]);
    assert!(stdout.contains("Alma 1:1\tAlma 1:1 The people were at peace"));
    assert!(stdout.contains("1 matches for \"PEOPLE\""));
}

#[test]
fn layout_prints_summary() {
    let dir = workspace();
    let stdout = run(&dir, &["layout", "corpus.json", "--width", "800", "--height", "600"]);
    assert!(stdout.contains("verses:           3"));
    assert!(stdout.contains("columns:          1"));
    assert!(stdout.contains("Alma"));
}
