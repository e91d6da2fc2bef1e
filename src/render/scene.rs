//! Retained in-memory display tree.

use super::surface::{Layer, ObjectId, Rect, RectStyle, RenderSurface, TextStyle};
use std::collections::HashMap;

/// A text object.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    /// Current text.
    pub text: String,
    /// World x.
    pub x: f64,
    /// World y.
    pub y: f64,
    /// Rasterization tier.
    pub resolution: u8,
    /// Appearance.
    pub style: TextStyle,
}

/// A rectangle object.
#[derive(Debug, Clone, PartialEq)]
pub struct RectObject {
    /// Geometry.
    pub rect: Rect,
    /// Appearance.
    pub style: RectStyle,
    /// Takes part in hit-testing.
    pub interactive: bool,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Text.
    Text(TextObject),
    /// Rectangle.
    Rect(RectObject),
}

/// One object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Payload.
    pub kind: ObjectKind,
    /// Visibility flag.
    pub visible: bool,
    /// Attached layer, if in the display tree.
    pub layer: Option<Layer>,
}

/// Allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Text objects ever created.
    pub texts_created: usize,
    /// Rectangles ever created.
    pub rects_created: usize,
    /// Objects destroyed.
    pub destroyed: usize,
}

/// [`RenderSurface`] backed by maps, used headlessly and by the terminal view.
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<ObjectId, SceneObject>,
    layers: [Vec<ObjectId>; 3],
    next_id: u64,
    zoom: f64,
    offset: (f64, f64),
    stats: SceneStats,
}

impl Scene {
    /// Empty scene with the identity transform.
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            ..Self::default()
        }
    }

    /// Object by id.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Text payload of `id`.
    pub fn text(&self, id: ObjectId) -> Option<&TextObject> {
        match self.objects.get(&id).map(|o| &o.kind) {
            Some(ObjectKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// Rectangle payload of `id`.
    pub fn rect(&self, id: ObjectId) -> Option<&RectObject> {
        match self.objects.get(&id).map(|o| &o.kind) {
            Some(ObjectKind::Rect(r)) => Some(r),
            _ => None,
        }
    }

    /// Ids attached to `layer` in attach order.
    pub fn attached(&self, layer: Layer) -> &[ObjectId] {
        &self.layers[layer.order()]
    }

    /// Attached, visible objects on `layer`.
    pub fn drawable(&self, layer: Layer) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        self.attached(layer).iter().filter_map(|id| {
            self.objects
                .get(id)
                .filter(|o| o.visible)
                .map(|o| (*id, o))
        })
    }

    /// Text of every attached, visible text object, sorted by position.
    pub fn visible_texts(&self) -> Vec<&str> {
        let mut texts: Vec<&TextObject> = self
            .drawable(Layer::Text)
            .filter_map(|(_, o)| match &o.kind {
                ObjectKind::Text(t) => Some(t),
                ObjectKind::Rect(_) => None,
            })
            .collect();
        texts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        texts.into_iter().map(|t| t.text.as_str()).collect()
    }

    /// Objects alive (attached or not).
    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    /// Allocation counters.
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Current zoom.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current offset.
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Screen position of a world point.
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.zoom + self.offset.0, y * self.zoom + self.offset.1)
    }

    fn insert(&mut self, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            SceneObject {
                kind,
                visible: true,
                layer: None,
            },
        );
        id
    }

    fn unlink(&mut self, id: ObjectId) {
        if let Some(layer) = self.objects.get_mut(&id).and_then(|o| o.layer.take()) {
            self.layers[layer.order()].retain(|other| *other != id);
        }
    }
}

impl RenderSurface for Scene {
    fn create_text(&mut self, style: TextStyle) -> ObjectId {
        self.stats.texts_created += 1;
        self.insert(ObjectKind::Text(TextObject {
            text: String::new(),
            x: 0.0,
            y: 0.0,
            resolution: 1,
            style,
        }))
    }

    fn set_text(&mut self, id: ObjectId, text: &str) {
        if let Some(ObjectKind::Text(t)) = self.objects.get_mut(&id).map(|o| &mut o.kind) {
            t.text.clear();
            t.text.push_str(text);
        }
    }

    fn set_position(&mut self, id: ObjectId, x: f64, y: f64) {
        match self.objects.get_mut(&id).map(|o| &mut o.kind) {
            Some(ObjectKind::Text(t)) => {
                t.x = x;
                t.y = y;
            }
            Some(ObjectKind::Rect(r)) => {
                r.rect.x = x;
                r.rect.y = y;
            }
            None => {}
        }
    }

    fn set_resolution(&mut self, id: ObjectId, tier: u8) {
        if let Some(ObjectKind::Text(t)) = self.objects.get_mut(&id).map(|o| &mut o.kind) {
            t.resolution = tier;
        }
    }

    fn set_visible(&mut self, id: ObjectId, visible: bool) {
        if let Some(o) = self.objects.get_mut(&id) {
            o.visible = visible;
        }
    }

    fn create_rect(&mut self, rect: Rect, style: RectStyle, interactive: bool) -> ObjectId {
        self.stats.rects_created += 1;
        self.insert(ObjectKind::Rect(RectObject {
            rect,
            style,
            interactive,
        }))
    }

    fn set_rect(&mut self, id: ObjectId, rect: Rect, style: RectStyle) {
        if let Some(ObjectKind::Rect(r)) = self.objects.get_mut(&id).map(|o| &mut o.kind) {
            r.rect = rect;
            r.style = style;
        }
    }

    fn attach(&mut self, id: ObjectId, layer: Layer) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        if object.layer == Some(layer) {
            return;
        }
        self.unlink(id);
        if let Some(object) = self.objects.get_mut(&id) {
            object.layer = Some(layer);
            self.layers[layer.order()].push(id);
        }
    }

    fn detach(&mut self, id: ObjectId) {
        self.unlink(id);
    }

    fn destroy(&mut self, id: ObjectId) {
        self.unlink(id);
        if self.objects.remove(&id).is_some() {
            self.stats.destroyed += 1;
        }
    }

    fn hit_test(&self, screen_x: f64, screen_y: f64) -> Option<ObjectId> {
        let world_x = (screen_x - self.offset.0) / self.zoom;
        let world_y = (screen_y - self.offset.1) / self.zoom;
        Layer::ALL.iter().rev().find_map(|&layer| {
            self.attached(layer).iter().rev().copied().find(|id| {
                self.objects.get(id).is_some_and(|o| {
                    o.visible
                        && matches!(&o.kind, ObjectKind::Rect(r) if r.interactive && r.rect.contains(world_x, world_y))
                })
            })
        })
    }

    fn set_transform(&mut self, zoom: f64, offset_x: f64, offset_y: f64) {
        self.zoom = zoom;
        self.offset = (offset_x, offset_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::Rgb;

    fn style() -> RectStyle {
        RectStyle {
            fill: Rgb::new(255, 0, 0),
            fill_alpha: 0.5,
            border: Rgb::new(255, 0, 0),
            border_alpha: 1.0,
            border_width: 1.0,
        }
    }

    fn text_style() -> TextStyle {
        TextStyle {
            font_size: 12.0,
            color: Rgb::new(255, 255, 255),
        }
    }

    #[test]
    fn attach_and_detach_track_layers() {
        let mut scene = Scene::new();
        let id = scene.create_text(text_style());
        scene.attach(id, Layer::Text);
        scene.attach(id, Layer::Text);
        assert_eq!(scene.attached(Layer::Text), &[id]);
        scene.detach(id);
        assert!(scene.attached(Layer::Text).is_empty());
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn destroy_removes_object() {
        let mut scene = Scene::new();
        let id = scene.create_rect(Rect::new(0.0, 0.0, 1.0, 1.0), style(), false);
        scene.attach(id, Layer::Background);
        scene.destroy(id);
        assert_eq!(scene.live_count(), 0);
        assert!(scene.attached(Layer::Background).is_empty());
        assert_eq!(scene.stats().destroyed, 1);
    }

    #[test]
    fn hit_test_uses_transform_and_interactivity() {
        let mut scene = Scene::new();
        let passive = scene.create_rect(Rect::new(0.0, 0.0, 100.0, 100.0), style(), false);
        let active = scene.create_rect(Rect::new(10.0, 10.0, 10.0, 10.0), style(), true);
        scene.attach(passive, Layer::Background);
        scene.attach(active, Layer::Highlight);
        scene.set_transform(2.0, 5.0, 5.0);

        // world (15, 15) → screen (35, 35)
        assert_eq!(scene.hit_test(35.0, 35.0), Some(active));
        assert_eq!(scene.hit_test(100.0, 100.0), None);

        scene.set_visible(active, false);
        assert_eq!(scene.hit_test(35.0, 35.0), None);
    }

    #[test]
    fn visible_texts_skip_hidden_and_detached() {
        let mut scene = Scene::new();
        let a = scene.create_text(text_style());
        let b = scene.create_text(text_style());
        let c = scene.create_text(text_style());
        for (id, text, y) in [(a, "a", 0.0), (b, "b", 1.0), (c, "c", 2.0)] {
            scene.set_text(id, text);
            scene.set_position(id, 0.0, y);
        }
        scene.attach(a, Layer::Text);
        scene.attach(b, Layer::Text);
        scene.set_visible(b, false);
        assert_eq!(scene.visible_texts(), vec!["a"]);
    }
}
