//! Viewport math: visible ranges, fit-to-screen, and resolution tiers.
//!
//! Every function here is pure. Screen coordinates map to world coordinates
//! as `world = (screen - offset) / zoom`.

use crate::config::ViewportConfig;
use crate::layout::ColumnLayout;
use std::ops::Range;

/// Screen size in pixels (or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ScreenSize {
    /// Create a screen size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Current pan/zoom state. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Uniform zoom factor, always > 0.
    pub zoom: f64,
    /// Horizontal screen offset of the world origin.
    pub offset_x: f64,
    /// Vertical screen offset of the world origin.
    pub offset_y: f64,
    /// Text rasterization tier for the current zoom.
    pub text_resolution: u8,
}

impl ViewportState {
    /// World point under a screen point.
    pub fn screen_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.offset_x) / self.zoom, (y - self.offset_y) / self.zoom)
    }

    /// Screen point of a world point.
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.zoom + self.offset_x, y * self.zoom + self.offset_y)
    }
}

/// Rows (column-relative) and columns that intersect the screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibleWindow {
    /// Column-relative row range, end exclusive.
    pub rows: Range<usize>,
    /// Column range, end exclusive.
    pub columns: Range<usize>,
}

impl VisibleWindow {
    /// True if no line can be visible.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// World-space geometry of the laid-out corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentMetrics {
    /// Width of one column in world units.
    pub column_width: f64,
    /// Number of columns.
    pub num_columns: usize,
    /// Rows in the longest column.
    pub lines_per_column: usize,
    /// Character width.
    pub char_width: f64,
    /// Line height.
    pub line_height: f64,
    /// Gap between columns.
    pub column_gap: f64,
    /// Margin around the content.
    pub padding: f64,
}

impl ContentMetrics {
    /// Metrics for `columns` wrapped at `line_width` characters.
    pub fn new(config: &ViewportConfig, columns: &ColumnLayout, line_width: usize) -> Self {
        Self {
            column_width: line_width as f64 * config.char_width,
            num_columns: columns.num_columns(),
            lines_per_column: columns.lines_per_column(),
            char_width: config.char_width,
            line_height: config.line_height,
            column_gap: config.column_gap,
            padding: config.padding,
        }
    }

    /// Total content width including padding.
    pub fn total_width(&self) -> f64 {
        let columns = self.num_columns as f64;
        let gaps = self.num_columns.saturating_sub(1) as f64;
        self.padding * 2.0 + columns * self.column_width + gaps * self.column_gap
    }

    /// Total content height including padding.
    pub fn total_height(&self) -> f64 {
        self.padding * 2.0 + self.lines_per_column as f64 * self.line_height
    }

    /// World x of the left edge of `column`.
    pub fn column_x(&self, column: usize) -> f64 {
        self.padding + column as f64 * (self.column_width + self.column_gap)
    }

    /// World y of the top edge of `row`.
    pub fn row_y(&self, row: usize) -> f64 {
        self.padding + row as f64 * self.line_height
    }

    /// World position of character `char_index` on `row` of `column`.
    pub fn char_position(&self, column: usize, row: usize, char_index: usize) -> (f64, f64) {
        (
            self.column_x(column) + char_index as f64 * self.char_width,
            self.row_y(row),
        )
    }
}

/// Column-relative rows intersecting the screen, padded by
/// `scroll_padding_lines` and clamped to `0..=max_column_length`.
pub fn visible_line_range(
    config: &ViewportConfig,
    zoom: f64,
    offset_y: f64,
    screen_height: f64,
    max_column_length: usize,
) -> Range<usize> {
    let world_top = -offset_y / zoom;
    let world_bottom = (screen_height - offset_y) / zoom;

    let first = ((world_top - config.padding) / config.line_height).floor()
        - config.scroll_padding_lines as f64;
    let last = ((world_bottom - config.padding) / config.line_height).ceil()
        + config.scroll_padding_lines as f64;

    let limit = max_column_length as f64;
    let start = first.clamp(0.0, limit) as usize;
    let end = last.clamp(0.0, limit) as usize;
    start..end.max(start)
}

/// Columns intersecting the screen horizontally.
pub fn visible_column_range(
    metrics: &ContentMetrics,
    zoom: f64,
    offset_x: f64,
    screen_width: f64,
) -> Range<usize> {
    let stride = metrics.column_width + metrics.column_gap;
    if stride <= 0.0 || metrics.num_columns == 0 {
        return 0..0;
    }
    let world_left = -offset_x / zoom;
    let world_right = (screen_width - offset_x) / zoom;

    let first = ((world_left - metrics.padding - metrics.column_width) / stride).ceil();
    let last = ((world_right - metrics.padding) / stride).floor() + 1.0;

    let limit = metrics.num_columns as f64;
    let start = first.clamp(0.0, limit) as usize;
    let end = last.clamp(0.0, limit) as usize;
    start..end.max(start)
}

/// Rows and columns to render for `state`.
pub fn visible_window(
    config: &ViewportConfig,
    metrics: &ContentMetrics,
    state: &ViewportState,
    screen: ScreenSize,
) -> VisibleWindow {
    VisibleWindow {
        rows: visible_line_range(
            config,
            state.zoom,
            state.offset_y,
            screen.height,
            metrics.lines_per_column,
        ),
        columns: visible_column_range(metrics, state.zoom, state.offset_x, screen.width),
    }
}

/// Fit-to-screen zoom, floored at `min_visible_zoom`.
///
/// `min(screen_w / total_w, screen_h / total_h) * fit_margin`.
pub fn initial_zoom(
    config: &ViewportConfig,
    total_width: f64,
    total_height: f64,
    screen: ScreenSize,
) -> f64 {
    if total_width <= 0.0 || total_height <= 0.0 {
        return 1.0;
    }
    let fit = (screen.width / total_width).min(screen.height / total_height) * config.fit_margin;
    fit.max(config.min_visible_zoom)
}

/// Offset that centers the content at `zoom`.
pub fn centered_offset(zoom: f64, total_width: f64, total_height: f64, screen: ScreenSize) -> (f64, f64) {
    (
        (screen.width - total_width * zoom) / 2.0,
        (screen.height - total_height * zoom) / 2.0,
    )
}

/// Initial offset for `zoom`.
///
/// Centers the content when it fits on screen at `zoom`; otherwise anchors
/// at `(padding, padding)` so the view opens on the start of the corpus.
pub fn initial_offset(
    config: &ViewportConfig,
    zoom: f64,
    total_width: f64,
    total_height: f64,
    screen: ScreenSize,
) -> (f64, f64) {
    let fits = total_width * zoom <= screen.width && total_height * zoom <= screen.height;
    if fits {
        centered_offset(zoom, total_width, total_height, screen)
    } else {
        (config.padding, config.padding)
    }
}

/// Zoom above which text renders at tier 3.
pub const HIGH_ZOOM_THRESHOLD: f64 = 2.0;
/// Zoom above which text renders at tier 2.
pub const MID_ZOOM_THRESHOLD: f64 = 1.0;

/// Coarse text rasterization tier for `zoom`, capped at `max_resolution`.
pub fn text_resolution_for_zoom(zoom: f64, max_resolution: u8) -> u8 {
    let tier = if zoom > HIGH_ZOOM_THRESHOLD {
        3
    } else if zoom > MID_ZOOM_THRESHOLD {
        2
    } else {
        1
    };
    tier.min(max_resolution.max(1))
}

/// Offset keeping the world point under `(focal_x, focal_y)` fixed when the
/// zoom changes from `state.zoom` to `new_zoom`.
pub fn zoom_about_point(state: &ViewportState, new_zoom: f64, focal_x: f64, focal_y: f64) -> (f64, f64) {
    let (world_x, world_y) = state.screen_to_world(focal_x, focal_y);
    (focal_x - world_x * new_zoom, focal_y - world_y * new_zoom)
}

/// Offset placing world `(x, y)` at the screen center at `zoom`.
pub fn center_on(x: f64, y: f64, zoom: f64, screen: ScreenSize) -> (f64, f64) {
    (screen.width / 2.0 - x * zoom, screen.height / 2.0 - y * zoom)
}
