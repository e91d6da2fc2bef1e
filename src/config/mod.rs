//! Configuration module.
//!
//! [`loader`] resolves the TOML file, environment and CLI into a
//! [`ResolvedConfig`]; [`ResolvedConfig::canvas`] fans it out into the typed
//! sub-configs each component receives at construction.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, ResolvedConfig,
};

/// Text wrapping and column partitioning settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Maximum characters per wrapped line.
    pub line_width: usize,
    /// Verses wrapped per incremental step.
    pub wrap_batch_size: usize,
    /// Column density for the all-books view.
    pub all_books: ColumnDensity,
    /// Column density for the single-book view.
    pub single_book: ColumnDensity,
}

/// Density target used to choose the column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDensity {
    /// Lines a column should hold before another column is added.
    pub min_lines_per_column: usize,
    /// Upper bound on the number of columns.
    pub max_columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_width: 60,
            wrap_batch_size: 500,
            all_books: ColumnDensity {
                min_lines_per_column: 200,
                max_columns: 60,
            },
            single_book: ColumnDensity {
                min_lines_per_column: 80,
                max_columns: 12,
            },
        }
    }
}

/// World-space metrics and zoom policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Width of one character in world units (monospace approximation).
    pub char_width: f64,
    /// Height of one line in world units.
    pub line_height: f64,
    /// Horizontal gap between columns in world units.
    pub column_gap: f64,
    /// Margin around the content in world units.
    pub padding: f64,
    /// Extra lines kept live above and below the visible range.
    pub scroll_padding_lines: usize,
    /// Smallest zoom the fit-to-screen computation will choose.
    pub min_visible_zoom: f64,
    /// Fraction of the screen the fitted content occupies.
    pub fit_margin: f64,
    /// Hard lower zoom bound for user zoom.
    pub zoom_min: f64,
    /// Hard upper zoom bound for user zoom.
    pub zoom_max: f64,
    /// Zoom multiplier applied when jumping to a match.
    pub jump_zoom_multiplier: f64,
    /// Lower bound of the readable zoom range used by jumps.
    pub jump_zoom_min: f64,
    /// Upper bound of the readable zoom range used by jumps.
    pub jump_zoom_max: f64,
    /// Highest text rasterization tier.
    pub max_text_resolution: u8,
    /// Pan distance in screen pixels below which a render pass is skipped.
    pub pan_threshold_px: f64,
    /// Zoom change, as a fraction of the last rendered zoom, below which a
    /// render pass is skipped.
    pub zoom_epsilon: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            char_width: 7.2,
            line_height: 16.0,
            column_gap: 40.0,
            padding: 50.0,
            scroll_padding_lines: 5,
            min_visible_zoom: 0.05,
            fit_margin: 0.95,
            zoom_min: 0.01,
            zoom_max: 10.0,
            jump_zoom_multiplier: 5.0,
            jump_zoom_min: 1.0,
            jump_zoom_max: 4.0,
            max_text_resolution: 3,
            pan_threshold_px: 1.0,
            zoom_epsilon: 0.001,
        }
    }
}

/// Visual styling inputs for the render reconciler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Font size of text objects in world units.
    pub font_size: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { font_size: 12.0 }
    }
}

/// Search defaults used by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Default number of verses returned by semantic search.
    pub semantic_top_k: usize,
    /// Default score floor for semantic search.
    pub semantic_min_score: f32,
    /// Score floor for automatic cross references.
    pub cross_ref_min_score: f32,
    /// Maximum number of automatic cross references.
    pub cross_ref_limit: usize,
    /// Run vector search on a worker thread instead of in-process.
    pub use_worker: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            semantic_top_k: 50,
            semantic_min_score: 0.3,
            cross_ref_min_score: 0.5,
            cross_ref_limit: 10,
            use_worker: true,
        }
    }
}

/// All component configs, handed to [`crate::controller::Controller`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasConfig {
    /// Layout settings.
    pub layout: LayoutConfig,
    /// Viewport settings.
    pub viewport: ViewportConfig,
    /// Render settings.
    pub render: RenderConfig,
    /// Search settings.
    pub search: SearchConfig,
}

impl CanvasConfig {
    /// Config for a character-cell surface: one world unit per cell at zoom 1.
    pub fn for_terminal(self) -> Self {
        Self {
            viewport: ViewportConfig {
                char_width: 1.0,
                line_height: 1.0,
                column_gap: 3.0,
                padding: 2.0,
                pan_threshold_px: 0.5,
                ..self.viewport
            },
            render: RenderConfig { font_size: 1.0 },
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_density_is_tighter_for_single_book() {
        let config = LayoutConfig::default();
        assert!(config.single_book.max_columns < config.all_books.max_columns);
        assert!(
            config.single_book.min_lines_per_column < config.all_books.min_lines_per_column
        );
    }

    #[test]
    fn terminal_config_uses_unit_cells() {
        let config = CanvasConfig::default().for_terminal();
        assert_eq!(config.viewport.char_width, 1.0);
        assert_eq!(config.viewport.line_height, 1.0);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn jump_range_is_within_zoom_bounds() {
        let config = ViewportConfig::default();
        assert!(config.zoom_min <= config.jump_zoom_min);
        assert!(config.jump_zoom_max <= config.zoom_max);
    }
}
