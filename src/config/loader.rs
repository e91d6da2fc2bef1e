//! Configuration file loading with precedence handling.

use super::{CanvasConfig, LayoutConfig, RenderConfig, SearchConfig, ViewportConfig};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/verse-canvas/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Maximum characters per wrapped line.
    #[serde(default)]
    pub line_width: Option<usize>,
    /// Verses wrapped per incremental layout step.
    #[serde(default)]
    pub wrap_batch_size: Option<usize>,
    /// Character width in world units.
    #[serde(default)]
    pub char_width: Option<f64>,
    /// Line height in world units.
    #[serde(default)]
    pub line_height: Option<f64>,
    /// Font size in world units.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Gap between columns in world units.
    #[serde(default)]
    pub column_gap: Option<f64>,
    /// Content margin in world units.
    #[serde(default)]
    pub padding: Option<f64>,
    /// Lines kept live beyond the visible range.
    #[serde(default)]
    pub scroll_padding_lines: Option<usize>,
    /// Fit-to-screen zoom floor.
    #[serde(default)]
    pub min_visible_zoom: Option<f64>,
    /// Lower user zoom bound.
    #[serde(default)]
    pub zoom_min: Option<f64>,
    /// Upper user zoom bound.
    #[serde(default)]
    pub zoom_max: Option<f64>,
    /// Zoom multiplier for jumps.
    #[serde(default)]
    pub jump_zoom_multiplier: Option<f64>,
    /// Lower readable zoom for jumps.
    #[serde(default)]
    pub jump_zoom_min: Option<f64>,
    /// Upper readable zoom for jumps.
    #[serde(default)]
    pub jump_zoom_max: Option<f64>,
    /// Highest text resolution tier.
    #[serde(default)]
    pub max_text_resolution: Option<u8>,
    /// Pan coalescing threshold in screen pixels.
    #[serde(default)]
    pub pan_threshold_px: Option<f64>,
    /// Zoom coalescing threshold as a fraction of the last rendered zoom.
    #[serde(default)]
    pub zoom_epsilon: Option<f64>,
    /// Default semantic top-k.
    #[serde(default)]
    pub semantic_top_k: Option<usize>,
    /// Default semantic score floor.
    #[serde(default)]
    pub semantic_min_score: Option<f32>,
    /// Cross reference score floor.
    #[serde(default)]
    pub cross_ref_min_score: Option<f32>,
    /// Cross reference limit.
    #[serde(default)]
    pub cross_ref_limit: Option<usize>,
    /// Run vector search on a worker thread.
    #[serde(default)]
    pub use_worker: Option<bool>,
    /// Path to the embeddings JSON document.
    #[serde(default)]
    pub embeddings_path: Option<PathBuf>,
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Layout settings.
    pub layout: LayoutConfig,
    /// Viewport settings.
    pub viewport: ViewportConfig,
    /// Render settings.
    pub render: RenderConfig,
    /// Search settings.
    pub search: SearchConfig,
    /// Embeddings document, if semantic search is wanted.
    pub embeddings_path: Option<PathBuf>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
            search: SearchConfig::default(),
            embeddings_path: None,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Component configs for the controller.
    pub fn canvas(&self) -> CanvasConfig {
        CanvasConfig {
            layout: self.layout,
            viewport: self.viewport,
            render: self.render,
            search: self.search,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/verse-canvas/verse-canvas.log` on Unix-like systems,
/// or the platform equivalent. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("verse-canvas").join("verse-canvas.log")
    } else {
        PathBuf::from("verse-canvas.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path (`~/.config/verse-canvas/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("verse-canvas").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `VERSE_CANVAS_CONFIG` environment variable
/// 3. Default path `~/.config/verse-canvas/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("VERSE_CANVAS_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(file) = config_file else {
        return defaults;
    };

    let layout = LayoutConfig {
        line_width: file.line_width.unwrap_or(defaults.layout.line_width),
        wrap_batch_size: file
            .wrap_batch_size
            .unwrap_or(defaults.layout.wrap_batch_size),
        ..defaults.layout
    };

    let d = defaults.viewport;
    let viewport = ViewportConfig {
        char_width: file.char_width.unwrap_or(d.char_width),
        line_height: file.line_height.unwrap_or(d.line_height),
        column_gap: file.column_gap.unwrap_or(d.column_gap),
        padding: file.padding.unwrap_or(d.padding),
        scroll_padding_lines: file.scroll_padding_lines.unwrap_or(d.scroll_padding_lines),
        min_visible_zoom: file.min_visible_zoom.unwrap_or(d.min_visible_zoom),
        fit_margin: d.fit_margin,
        zoom_min: file.zoom_min.unwrap_or(d.zoom_min),
        zoom_max: file.zoom_max.unwrap_or(d.zoom_max),
        jump_zoom_multiplier: file.jump_zoom_multiplier.unwrap_or(d.jump_zoom_multiplier),
        jump_zoom_min: file.jump_zoom_min.unwrap_or(d.jump_zoom_min),
        jump_zoom_max: file.jump_zoom_max.unwrap_or(d.jump_zoom_max),
        max_text_resolution: file.max_text_resolution.unwrap_or(d.max_text_resolution),
        pan_threshold_px: file.pan_threshold_px.unwrap_or(d.pan_threshold_px),
        zoom_epsilon: file.zoom_epsilon.unwrap_or(d.zoom_epsilon),
    };

    let render = RenderConfig {
        font_size: file.font_size.unwrap_or(defaults.render.font_size),
    };

    let s = defaults.search;
    let search = SearchConfig {
        semantic_top_k: file.semantic_top_k.unwrap_or(s.semantic_top_k),
        semantic_min_score: file.semantic_min_score.unwrap_or(s.semantic_min_score),
        cross_ref_min_score: file.cross_ref_min_score.unwrap_or(s.cross_ref_min_score),
        cross_ref_limit: file.cross_ref_limit.unwrap_or(s.cross_ref_limit),
        use_worker: file.use_worker.unwrap_or(s.use_worker),
    };

    ResolvedConfig {
        layout,
        viewport,
        render,
        search,
        embeddings_path: file.embeddings_path.or(defaults.embeddings_path),
        log_file_path: file.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `VERSE_CANVAS_EMBEDDINGS`: Override embeddings path
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var("VERSE_CANVAS_EMBEDDINGS") {
        config.embeddings_path = Some(PathBuf::from(path));
    }

    config
}

/// Values supplied on the command line. `None` leaves the resolved value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// `--line-width`
    pub line_width: Option<usize>,
    /// `--embeddings`
    pub embeddings_path: Option<PathBuf>,
    /// `--no-worker` (forces the in-process backend when `Some(false)`)
    pub use_worker: Option<bool>,
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(width) = cli.line_width {
        config.layout.line_width = width;
    }

    if let Some(path) = cli.embeddings_path {
        config.embeddings_path = Some(path);
    }

    if let Some(use_worker) = cli.use_worker {
        config.search.use_worker = use_worker;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
