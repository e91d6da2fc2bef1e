//! Paints a [`Scene`] into a terminal buffer.
//!
//! One world unit is one cell at zoom 1. Bands and highlights become cell
//! backgrounds blended over black, text objects become glyphs.

use crate::render::{Layer, ObjectKind, Rect as WorldRect, Rgb, Scene, TextObject};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier},
    widgets::Widget,
};

/// Below this zoom glyphs collapse to dots.
pub const GLYPH_ZOOM_THRESHOLD: f64 = 0.75;

/// Glyph drawn for non-space characters when zoomed out.
const DENSE_GLYPH: char = '·';

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Widget drawing the scene with its current transform.
pub struct CanvasWidget<'a> {
    scene: &'a Scene,
    char_width: f64,
}

impl<'a> CanvasWidget<'a> {
    /// Draw `scene`, advancing `char_width` world units per character.
    pub fn new(scene: &'a Scene, char_width: f64) -> Self {
        Self { scene, char_width }
    }

    fn to_cells(&self, rect: WorldRect, area: Rect) -> Option<(u16, u16, u16, u16)> {
        let zoom = self.scene.zoom();
        let (ox, oy) = self.scene.offset();
        let x0 = (rect.x * zoom + ox).floor().max(0.0);
        let y0 = (rect.y * zoom + oy).floor().max(0.0);
        let x1 = ((rect.x + rect.width) * zoom + ox).ceil().min(f64::from(area.width));
        let y1 = ((rect.y + rect.height) * zoom + oy).ceil().min(f64::from(area.height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u16, y0 as u16, x1 as u16, y1 as u16))
    }

    fn fill(&self, buf: &mut Buffer, area: Rect, rect: WorldRect, bg: Color) {
        let Some((x0, y0, x1, y1)) = self.to_cells(rect, area) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                buf[(area.x + x, area.y + y)].set_bg(bg);
            }
        }
    }

    fn draw_text(&self, buf: &mut Buffer, area: Rect, text: &TextObject) {
        let zoom = self.scene.zoom();
        let (ox, oy) = self.scene.offset();
        let row = (text.y * zoom + oy).floor();
        if row < 0.0 || row >= f64::from(area.height) {
            return;
        }
        let row = area.y + row as u16;
        let start = text.x * zoom + ox;
        let step = self.char_width * zoom;
        let dense = zoom < GLYPH_ZOOM_THRESHOLD;
        let fg = color(text.style.color);

        for (i, ch) in text.text.chars().enumerate() {
            let column = (start + i as f64 * step).floor();
            if column < 0.0 {
                continue;
            }
            if column >= f64::from(area.width) {
                break;
            }
            if ch == ' ' {
                continue;
            }
            let glyph = if dense { DENSE_GLYPH } else { ch };
            let cell = &mut buf[(area.x + column as u16, row)];
            cell.set_char(glyph).set_fg(fg);
            if text.resolution >= 3 {
                cell.modifier.insert(Modifier::BOLD);
            }
        }
    }
}

impl Widget for CanvasWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for layer in [Layer::Background, Layer::Highlight] {
            for (_, object) in self.scene.drawable(layer) {
                if let ObjectKind::Rect(r) = &object.kind {
                    let bg = color(r.style.fill.over_black(r.style.fill_alpha));
                    self.fill(buf, area, r.rect, bg);
                }
            }
        }
        for (_, object) in self.scene.drawable(Layer::Text) {
            if let ObjectKind::Text(text) = &object.kind {
                self.draw_text(buf, area, text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RectStyle, RenderSurface, TextStyle};
    use crate::test_harness::buffer_to_string;

    fn scene_with_text(text: &str, zoom: f64) -> Scene {
        let mut scene = Scene::new();
        let id = scene.create_text(TextStyle {
            font_size: 1.0,
            color: Rgb::new(255, 255, 255),
        });
        scene.set_text(id, text);
        scene.set_position(id, 1.0, 1.0);
        scene.attach(id, Layer::Text);
        scene.set_transform(zoom, 0.0, 0.0);
        scene
    }

    fn paint(scene: &Scene, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        CanvasWidget::new(scene, 1.0).render(area, &mut buf);
        buf
    }

    #[test]
    fn text_is_one_char_per_cell_at_unit_zoom() {
        let scene = scene_with_text("great temple", 1.0);
        let buf = paint(&scene, 20, 3);
        assert_eq!(buffer_to_string(&buf), "\n great temple");
    }

    #[test]
    fn zoomed_out_text_collapses_to_dots() {
        let scene = scene_with_text("abcd", 0.5);
        let buf = paint(&scene, 10, 2);
        assert_eq!(buf[(0, 0)].symbol(), "·");
        assert_eq!(buf[(2, 0)].symbol(), "·");
        assert_eq!(buf[(3, 0)].symbol(), " ");
    }

    #[test]
    fn text_is_clipped_to_the_area() {
        let scene = scene_with_text("abcdefghij", 1.0);
        let buf = paint(&scene, 5, 2);
        assert_eq!(buffer_to_string(&buf), "\n abcd");
    }

    #[test]
    fn rects_fill_cell_backgrounds() {
        let mut scene = Scene::new();
        let style = RectStyle {
            fill: Rgb::new(200, 100, 0),
            fill_alpha: 0.5,
            border: Rgb::new(0, 0, 0),
            border_alpha: 1.0,
            border_width: 1.0,
        };
        let id = scene.create_rect(WorldRect::new(1.0, 0.0, 2.0, 1.0), style, true);
        scene.attach(id, Layer::Highlight);
        let buf = paint(&scene, 5, 1);
        assert_eq!(buf[(0, 0)].bg, Color::Reset);
        assert_eq!(buf[(1, 0)].bg, Color::Rgb(100, 50, 0));
        assert_eq!(buf[(2, 0)].bg, Color::Rgb(100, 50, 0));
        assert_eq!(buf[(3, 0)].bg, Color::Reset);
    }
}
