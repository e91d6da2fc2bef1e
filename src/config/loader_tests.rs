//! Tests for config loading and precedence.

use super::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    path
}

// ===== load_config_file =====

#[test]
fn missing_file_returns_none() {
    let dir = TempDir::new().unwrap();
    let result = load_config_file(dir.path().join("nope.toml"));
    assert_eq!(result, Ok(None));
}

#[test]
fn empty_file_parses_to_all_none() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let config = load_config_file(path).unwrap().expect("file exists");
    assert_eq!(config, ConfigFile::default());
}

#[test]
fn parses_layout_and_search_fields() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
line_width = 72
char_width = 8.0
semantic_top_k = 20
use_worker = false
embeddings_path = "/data/embeddings.json"
"#,
    );
    let config = load_config_file(path).unwrap().expect("file exists");
    assert_eq!(config.line_width, Some(72));
    assert_eq!(config.char_width, Some(8.0));
    assert_eq!(config.semantic_top_k, Some(20));
    assert_eq!(config.use_worker, Some(false));
    assert_eq!(
        config.embeddings_path,
        Some(PathBuf::from("/data/embeddings.json"))
    );
}

#[test]
fn invalid_toml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "line_width = [not valid");
    let err = load_config_file(path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn unknown_key_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "colour_scheme = \"dark\"");
    let err = load_config_file(path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn directory_path_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = load_config_file(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

// ===== merge_config =====

#[test]
fn merge_none_returns_defaults() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_overrides_only_present_fields() {
    let file = ConfigFile {
        line_width: Some(40),
        zoom_max: Some(6.0),
        cross_ref_limit: Some(3),
        ..ConfigFile::default()
    };
    let resolved = merge_config(Some(file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.layout.line_width, 40);
    assert_eq!(resolved.viewport.zoom_max, 6.0);
    assert_eq!(resolved.search.cross_ref_limit, 3);
    assert_eq!(resolved.viewport.line_height, defaults.viewport.line_height);
    assert_eq!(resolved.search.use_worker, defaults.search.use_worker);
    assert_eq!(resolved.layout.all_books, defaults.layout.all_books);
}

#[test]
fn merge_keeps_custom_log_path() {
    let file = ConfigFile {
        log_file_path: Some(PathBuf::from("/tmp/canvas.log")),
        ..ConfigFile::default()
    };
    let resolved = merge_config(Some(file));
    assert_eq!(resolved.log_file_path, PathBuf::from("/tmp/canvas.log"));
}

// ===== precedence =====

#[test]
#[serial(config_env)]
fn explicit_path_wins_over_env() {
    let dir = TempDir::new().unwrap();
    let explicit = write_config(&dir, "line_width = 33");
    let other = dir.path().join("other.toml");
    fs::write(&other, "line_width = 99").unwrap();

    std::env::set_var("VERSE_CANVAS_CONFIG", &other);
    let loaded = load_config_with_precedence(Some(explicit)).unwrap();
    std::env::remove_var("VERSE_CANVAS_CONFIG");

    assert_eq!(loaded.and_then(|c| c.line_width), Some(33));
}

#[test]
#[serial(config_env)]
fn env_path_used_without_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "line_width = 44");

    std::env::set_var("VERSE_CANVAS_CONFIG", &path);
    let loaded = load_config_with_precedence(None).unwrap();
    std::env::remove_var("VERSE_CANVAS_CONFIG");

    assert_eq!(loaded.and_then(|c| c.line_width), Some(44));
}

#[test]
#[serial(config_env)]
fn env_embeddings_override_applies() {
    std::env::set_var("VERSE_CANVAS_EMBEDDINGS", "/env/embeddings.json");
    let config = apply_env_overrides(ResolvedConfig::default());
    std::env::remove_var("VERSE_CANVAS_EMBEDDINGS");

    assert_eq!(
        config.embeddings_path,
        Some(PathBuf::from("/env/embeddings.json"))
    );
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let file = ConfigFile {
        line_width: Some(40),
        use_worker: Some(true),
        ..ConfigFile::default()
    };
    let merged = merge_config(Some(file));
    let resolved = apply_cli_overrides(
        merged,
        CliOverrides {
            line_width: Some(80),
            embeddings_path: Some(PathBuf::from("cli.json")),
            use_worker: Some(false),
        },
    );

    assert_eq!(resolved.layout.line_width, 80);
    assert_eq!(resolved.embeddings_path, Some(PathBuf::from("cli.json")));
    assert!(!resolved.search.use_worker);
}

#[test]
fn empty_cli_overrides_change_nothing() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), CliOverrides::default()), base);
}

#[test]
fn default_log_path_ends_with_log_name() {
    let path = default_log_path();
    assert!(path.to_string_lossy().ends_with("verse-canvas.log"));
}

#[test]
fn canvas_copies_component_configs() {
    let resolved = ResolvedConfig::default();
    let canvas = resolved.canvas();
    assert_eq!(canvas.layout, resolved.layout);
    assert_eq!(canvas.viewport, resolved.viewport);
    assert_eq!(canvas.search, resolved.search);
}
