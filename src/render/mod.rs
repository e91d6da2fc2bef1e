//! Render reconciler: keeps pooled visual objects in step with the viewport.
//!
//! # Module Structure
//!
//! - `surface`: [`RenderSurface`], the display capability trait
//! - `scene`: [`Scene`], an in-memory surface
//! - `pool`: [`SpritePool`], reusable text objects
//! - `text`: [`TextRenderer`], one text object per visible line
//! - `background`: [`BackgroundRenderer`], book color bands
//! - `highlight`: [`HighlightRenderer`], clickable match highlights
//! - `reconciler`: [`RenderReconciler`], the three renderers composed

pub mod background;
pub mod highlight;
pub mod pool;
pub mod reconciler;
pub mod scene;
pub mod surface;
pub mod text;

pub use background::{band_opacity, BackgroundRenderer, BOOK_PALETTE};
pub use highlight::{highlight_style, ClickHandler, HighlightKind, HighlightRenderer};
pub use pool::SpritePool;
pub use reconciler::{FrameStats, RenderReconciler};
pub use scene::{ObjectKind, RectObject, Scene, SceneObject, SceneStats, TextObject};
pub use surface::{Layer, ObjectId, Rect, RectStyle, RenderSurface, Rgb, TextStyle};
pub use text::{TextPass, TextRenderer};

use crate::layout::{BookRegion, ColumnLayout};
use crate::view_state::{ContentMetrics, VisibleWindow};

/// Everything a render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Wrapped lines.
    pub lines: &'a [String],
    /// Column partition.
    pub columns: &'a ColumnLayout,
    /// Book regions.
    pub regions: &'a [BookRegion],
    /// World geometry.
    pub metrics: ContentMetrics,
    /// Rows and columns to draw.
    pub window: &'a VisibleWindow,
    /// Current zoom.
    pub zoom: f64,
    /// Current text tier.
    pub resolution: u8,
}

impl FrameContext<'_> {
    /// `(column, row, line_index)` of every visible line.
    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.window.columns.clone().flat_map(move |column| {
            self.window
                .rows
                .clone()
                .filter_map(move |row| self.columns.line_at(column, row).map(|line| (column, row, line)))
        })
    }
}
