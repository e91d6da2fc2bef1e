//! Line text rendering with pooled objects.

use super::pool::SpritePool;
use super::surface::{Layer, ObjectId, RenderSurface, TextStyle};
use super::FrameContext;
use std::collections::{HashMap, HashSet};

/// A tracked text object.
///
/// Keyed by `column * lines_per_column + row`, which is the global line index.
#[derive(Debug, Clone)]
struct VisibleSprite {
    sprite: ObjectId,
    column: usize,
    row: usize,
    text: String,
    position: (f64, f64),
    resolution: u8,
}

/// Per-pass change counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextPass {
    /// Lines that entered the view.
    pub added: usize,
    /// Lines that left the view.
    pub removed: usize,
    /// Tracked lines whose object was touched.
    pub updated: usize,
}

/// Keeps exactly one attached text object per visible line.
#[derive(Debug)]
pub struct TextRenderer {
    entries: HashMap<usize, VisibleSprite>,
    pool: SpritePool,
}

impl TextRenderer {
    /// Renderer creating text objects with `style`.
    pub fn new(style: TextStyle) -> Self {
        Self {
            entries: HashMap::new(),
            pool: SpritePool::new(style),
        }
    }

    /// Reconcile tracked objects with the lines visible in `ctx`.
    pub fn render<S: RenderSurface>(&mut self, surface: &mut S, ctx: &FrameContext<'_>) -> TextPass {
        let mut pass = TextPass::default();
        let visible: Vec<(usize, usize, usize)> = ctx.visible_lines().collect();
        let keep: HashSet<usize> = visible.iter().map(|&(_, _, line)| line).collect();

        // Release departures first so arrivals can reuse their objects.
        let gone: Vec<usize> = self
            .entries
            .keys()
            .filter(|k| !keep.contains(k))
            .copied()
            .collect();
        for key in gone {
            if let Some(entry) = self.entries.remove(&key) {
                self.pool.release(surface, entry.sprite);
                pass.removed += 1;
            }
        }

        for (column, row, line_index) in visible {
            let text = ctx.lines.get(line_index).map_or("", String::as_str);
            let position = ctx.metrics.char_position(column, row, 0);

            match self.entries.get_mut(&line_index) {
                Some(entry) => {
                    let mut touched = false;
                    if entry.text != text {
                        surface.set_text(entry.sprite, text);
                        entry.text = text.to_string();
                        touched = true;
                    }
                    if entry.position != position {
                        surface.set_position(entry.sprite, position.0, position.1);
                        entry.position = position;
                        touched = true;
                    }
                    if entry.resolution != ctx.resolution {
                        surface.set_resolution(entry.sprite, ctx.resolution);
                        entry.resolution = ctx.resolution;
                        touched = true;
                    }
                    if touched {
                        pass.updated += 1;
                    }
                }
                None => {
                    let sprite = self.pool.acquire(surface);
                    surface.set_text(sprite, text);
                    surface.set_position(sprite, position.0, position.1);
                    surface.set_resolution(sprite, ctx.resolution);
                    surface.attach(sprite, Layer::Text);
                    self.entries.insert(
                        line_index,
                        VisibleSprite {
                            sprite,
                            column,
                            row,
                            text: text.to_string(),
                            position,
                            resolution: ctx.resolution,
                        },
                    );
                    pass.added += 1;
                }
            }
        }

        pass
    }

    /// Number of tracked lines.
    pub fn visible_count(&self) -> usize {
        self.entries.len()
    }

    /// Global line indices currently tracked, sorted.
    pub fn visible_lines(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// `(column, row)` of a tracked line.
    pub fn placement(&self, line_index: usize) -> Option<(usize, usize)> {
        self.entries.get(&line_index).map(|e| (e.column, e.row))
    }

    /// Objects waiting in the pool.
    pub fn pooled_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Release every tracked object and destroy the pool.
    pub fn destroy<S: RenderSurface>(&mut self, surface: &mut S) {
        for (_, entry) in self.entries.drain() {
            surface.destroy(entry.sprite);
        }
        self.pool.drain(surface);
    }
}
