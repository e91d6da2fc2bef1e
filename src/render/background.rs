//! Book color bands behind the text.

use super::surface::{Layer, ObjectId, Rect, RectStyle, RenderSurface, Rgb};
use super::FrameContext;

/// Band colors, cycled by book index.
pub const BOOK_PALETTE: [Rgb; 8] = [
    Rgb::new(66, 135, 245),
    Rgb::new(245, 166, 35),
    Rgb::new(80, 200, 120),
    Rgb::new(220, 80, 90),
    Rgb::new(150, 100, 220),
    Rgb::new(40, 190, 200),
    Rgb::new(230, 120, 180),
    Rgb::new(170, 170, 90),
];

/// Fill opacity for bands at `zoom`: stronger as the view zooms out.
pub fn band_opacity(zoom: f64) -> f32 {
    if zoom < 0.1 {
        0.5
    } else if zoom < 0.3 {
        0.35
    } else {
        0.2
    }
}

fn band_style(book_index: usize, zoom: f64) -> RectStyle {
    let color = BOOK_PALETTE[book_index % BOOK_PALETTE.len()];
    let fill_alpha = band_opacity(zoom);
    RectStyle {
        fill: color,
        fill_alpha,
        border: color,
        border_alpha: (fill_alpha * 2.0).min(1.0),
        border_width: 1.0,
    }
}

/// Rebuilds one rectangle per visible book region on every pass.
#[derive(Debug, Default)]
pub struct BackgroundRenderer {
    bands: Vec<ObjectId>,
}

impl BackgroundRenderer {
    /// Renderer with no bands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all bands with those intersecting the visible window.
    ///
    /// Returns the number of bands drawn.
    pub fn render<S: RenderSurface>(&mut self, surface: &mut S, ctx: &FrameContext<'_>) -> usize {
        self.clear(surface);

        let rows = &ctx.window.rows;
        if rows.is_empty() {
            return 0;
        }
        let m = &ctx.metrics;

        for region in ctx.regions {
            if !ctx.window.columns.contains(&region.column) {
                continue;
            }
            let start = region.start_line.max(rows.start);
            let end = region.end_line.min(rows.end - 1);
            if start > end {
                continue;
            }

            let rect = Rect::new(
                m.column_x(region.column),
                m.row_y(start),
                m.column_width,
                (end - start + 1) as f64 * m.line_height,
            );
            let id = surface.create_rect(rect, band_style(region.book_index, ctx.zoom), false);
            surface.attach(id, Layer::Background);
            self.bands.push(id);
        }

        self.bands.len()
    }

    /// Bands currently drawn.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Destroy every band.
    pub fn clear<S: RenderSurface>(&mut self, surface: &mut S) {
        for id in self.bands.drain(..) {
            surface.destroy(id);
        }
    }
}
