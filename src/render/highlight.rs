//! Clickable highlights for search matches on visible lines.
//!
//! Character positions are approximated as `char_index * char_width`.

use super::surface::{Layer, ObjectId, Rect, RectStyle, RenderSurface, Rgb};
use super::FrameContext;
use crate::search::MatchSet;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Below this zoom highlights switch to the exaggerated style.
pub const ZOOMED_OUT_THRESHOLD: f64 = 0.3;

/// Which engine produced the matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    /// Literal matches.
    Exact,
    /// Verse-similarity matches.
    Semantic,
}

fn brighten(c: Rgb) -> Rgb {
    let lift = |v: u8| v.saturating_add((255 - v) / 2);
    Rgb::new(lift(c.r), lift(c.g), lift(c.b))
}

/// Style of one highlight.
pub fn highlight_style(kind: HighlightKind, is_current: bool, zoom: f64) -> RectStyle {
    let (fill, border) = match (kind, is_current) {
        (HighlightKind::Exact, false) => (Rgb::new(250, 220, 40), Rgb::new(200, 160, 0)),
        (HighlightKind::Exact, true) => (Rgb::new(255, 140, 0), Rgb::new(220, 90, 0)),
        (HighlightKind::Semantic, false) => (Rgb::new(60, 200, 190), Rgb::new(20, 150, 140)),
        (HighlightKind::Semantic, true) => (Rgb::new(230, 60, 200), Rgb::new(170, 20, 150)),
    };

    if zoom < ZOOMED_OUT_THRESHOLD {
        RectStyle {
            fill: brighten(fill),
            fill_alpha: 0.8,
            border: brighten(border),
            border_alpha: 1.0,
            border_width: 3.0,
        }
    } else {
        RectStyle {
            fill,
            fill_alpha: 0.45,
            border,
            border_alpha: 0.9,
            border_width: 1.0,
        }
    }
}

/// Extra margin around highlights at `zoom`, in line heights.
fn highlight_padding(zoom: f64, line_height: f64) -> f64 {
    if zoom < ZOOMED_OUT_THRESHOLD {
        line_height * 0.5
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Highlight {
    id: ObjectId,
    rect: Rect,
    style: RectStyle,
}

/// Callback receiving the clicked match index.
pub type ClickHandler = Box<dyn FnMut(usize) + Send>;

/// One interactive rectangle per visible match, keyed by match index.
///
/// Highlights are destroyed when they leave the view rather than pooled.
#[derive(Default)]
pub struct HighlightRenderer {
    highlights: HashMap<usize, Highlight>,
    by_object: HashMap<ObjectId, usize>,
    on_click: Option<ClickHandler>,
}

impl fmt::Debug for HighlightRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightRenderer")
            .field("highlights", &self.highlights.len())
            .field("has_click_handler", &self.on_click.is_some())
            .finish()
    }
}

impl HighlightRenderer {
    /// Renderer with no highlights and no click handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler invoked by [`HighlightRenderer::click`].
    pub fn set_on_click(&mut self, handler: ClickHandler) {
        self.on_click = Some(handler);
    }

    /// Reconcile highlights with the matches on visible lines.
    ///
    /// Returns the number of highlights drawn.
    pub fn render<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        ctx: &FrameContext<'_>,
        matches: &MatchSet,
        kind: HighlightKind,
    ) -> usize {
        let m = &ctx.metrics;
        let pad = highlight_padding(ctx.zoom, m.line_height);
        let current = matches.current();
        let mut wanted: Vec<(usize, Rect, RectStyle)> = Vec::new();

        for (column, row, line_index) in ctx.visible_lines() {
            for &match_index in matches.on_line(line_index) {
                let Some(found) = matches.get(match_index) else {
                    continue;
                };
                let (x, y) = m.char_position(column, row, found.start_char);
                let rect = Rect::new(
                    x - pad,
                    y - pad,
                    found.char_len() as f64 * m.char_width + pad * 2.0,
                    m.line_height + pad * 2.0,
                );
                let style = highlight_style(kind, current == Some(match_index), ctx.zoom);
                wanted.push((match_index, rect, style));
            }
        }

        let keep: HashSet<usize> = wanted.iter().map(|w| w.0).collect();
        let gone: Vec<usize> = self
            .highlights
            .keys()
            .filter(|k| !keep.contains(k))
            .copied()
            .collect();
        for match_index in gone {
            self.discard(surface, match_index);
        }

        for (match_index, rect, style) in wanted {
            match self.highlights.get_mut(&match_index) {
                Some(h) => {
                    if h.rect != rect || h.style != style {
                        surface.set_rect(h.id, rect, style);
                        h.rect = rect;
                        h.style = style;
                    }
                }
                None => {
                    let id = surface.create_rect(rect, style, true);
                    surface.attach(id, Layer::Highlight);
                    self.highlights.insert(match_index, Highlight { id, rect, style });
                    self.by_object.insert(id, match_index);
                }
            }
        }

        self.highlights.len()
    }

    /// Match index of the highlight under a screen point, invoking the click
    /// handler when one is hit.
    pub fn click<S: RenderSurface>(&mut self, surface: &S, screen_x: f64, screen_y: f64) -> Option<usize> {
        let id = surface.hit_test(screen_x, screen_y)?;
        let match_index = *self.by_object.get(&id)?;
        if let Some(handler) = self.on_click.as_mut() {
            handler(match_index);
        }
        Some(match_index)
    }

    /// Match indices currently highlighted, sorted.
    pub fn visible_matches(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.highlights.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Style of the highlight for `match_index`, if visible.
    pub fn style_of(&self, match_index: usize) -> Option<RectStyle> {
        self.highlights.get(&match_index).map(|h| h.style)
    }

    /// Destroy every highlight.
    pub fn clear<S: RenderSurface>(&mut self, surface: &mut S) {
        let all: Vec<usize> = self.highlights.keys().copied().collect();
        for match_index in all {
            self.discard(surface, match_index);
        }
    }

    fn discard<S: RenderSurface>(&mut self, surface: &mut S, match_index: usize) {
        if let Some(h) = self.highlights.remove(&match_index) {
            self.by_object.remove(&h.id);
            surface.detach(h.id);
            surface.destroy(h.id);
        }
    }
}
