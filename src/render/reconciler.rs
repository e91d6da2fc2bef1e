//! The three renderers composed behind one pass.

use super::background::BackgroundRenderer;
use super::highlight::{ClickHandler, HighlightKind, HighlightRenderer};
use super::surface::{RenderSurface, TextStyle};
use super::text::{TextPass, TextRenderer};
use super::FrameContext;
use crate::search::MatchSet;
use tracing::trace;

/// What one pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Text changes.
    pub text: TextPass,
    /// Lines with a text object after the pass.
    pub visible_lines: usize,
    /// Background bands drawn.
    pub bands: usize,
    /// Highlights drawn.
    pub highlights: usize,
}

/// Text, background and highlight renderers sharing one surface.
#[derive(Debug)]
pub struct RenderReconciler {
    text: TextRenderer,
    background: BackgroundRenderer,
    highlights: HighlightRenderer,
}

impl RenderReconciler {
    /// Reconciler creating text objects with `style`.
    pub fn new(style: TextStyle) -> Self {
        Self {
            text: TextRenderer::new(style),
            background: BackgroundRenderer::new(),
            highlights: HighlightRenderer::new(),
        }
    }

    /// Bring the surface in line with `ctx` and the active matches.
    pub fn render<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        ctx: &FrameContext<'_>,
        matches: Option<(&MatchSet, HighlightKind)>,
    ) -> FrameStats {
        let bands = self.background.render(surface, ctx);
        let text = self.text.render(surface, ctx);
        let highlights = match matches {
            Some((set, kind)) => self.highlights.render(surface, ctx, set, kind),
            None => {
                self.highlights.clear(surface);
                0
            }
        };

        let stats = FrameStats {
            text,
            visible_lines: self.text.visible_count(),
            bands,
            highlights,
        };
        trace!(
            added = text.added,
            removed = text.removed,
            updated = text.updated,
            visible = stats.visible_lines,
            bands,
            highlights,
            "Render pass"
        );
        stats
    }

    /// Drop every highlight.
    pub fn clear_highlights<S: RenderSurface>(&mut self, surface: &mut S) {
        self.highlights.clear(surface);
    }

    /// Register the highlight click handler.
    pub fn set_on_highlight_click(&mut self, handler: ClickHandler) {
        self.highlights.set_on_click(handler);
    }

    /// Route a click to the highlights.
    pub fn click<S: RenderSurface>(&mut self, surface: &S, screen_x: f64, screen_y: f64) -> Option<usize> {
        self.highlights.click(surface, screen_x, screen_y)
    }

    /// Text renderer.
    pub fn text(&self) -> &TextRenderer {
        &self.text
    }

    /// Highlight renderer.
    pub fn highlights(&self) -> &HighlightRenderer {
        &self.highlights
    }

    /// Background renderer.
    pub fn background(&self) -> &BackgroundRenderer {
        &self.background
    }

    /// Destroy every object the renderers own.
    pub fn destroy<S: RenderSurface>(&mut self, surface: &mut S) {
        self.highlights.clear(surface);
        self.background.clear(surface);
        self.text.destroy(surface);
    }
}
