//! Free list of text objects.

use super::surface::{ObjectId, RenderSurface, TextStyle};

/// Reuses text objects across render passes.
#[derive(Debug)]
pub struct SpritePool {
    style: TextStyle,
    free: Vec<ObjectId>,
    created: usize,
}

impl SpritePool {
    /// Pool creating objects with `style`.
    pub fn new(style: TextStyle) -> Self {
        Self {
            style,
            free: Vec::new(),
            created: 0,
        }
    }

    /// Take a free object, creating one if the pool is empty. The object is
    /// visible and detached.
    pub fn acquire<S: RenderSurface>(&mut self, surface: &mut S) -> ObjectId {
        match self.free.pop() {
            Some(id) => {
                surface.set_visible(id, true);
                id
            }
            None => {
                self.created += 1;
                surface.create_text(self.style)
            }
        }
    }

    /// Return an object: clear its text, hide it, detach it.
    pub fn release<S: RenderSurface>(&mut self, surface: &mut S, id: ObjectId) {
        surface.set_text(id, "");
        surface.set_visible(id, false);
        surface.detach(id);
        self.free.push(id);
    }

    /// Objects waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Objects this pool has created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Destroy every free object.
    pub fn drain<S: RenderSurface>(&mut self, surface: &mut S) {
        for id in self.free.drain(..) {
            surface.destroy(id);
        }
    }
}
