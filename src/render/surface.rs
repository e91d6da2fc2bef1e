//! Capability surface the renderers draw through.
//!
//! Positions and sizes are world units. The surface owns the world → screen
//! transform and applies it when drawing and hit-testing.

/// Handle to a visual object owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Display-tree layer, drawn bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Book color bands.
    Background,
    /// Search highlights.
    Highlight,
    /// Line text.
    Text,
}

impl Layer {
    /// Layers in draw order.
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Highlight, Layer::Text];

    /// Position in [`Layer::ALL`].
    pub fn order(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Highlight => 1,
            Self::Text => 2,
        }
    }
}

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// Color from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color scaled toward black by `alpha` in `0..=1`.
    pub fn over_black(self, alpha: f32) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        let scale = |c: u8| (f32::from(c) * a).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Rectangle from origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if `(x, y)` lies inside or on the edge.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Fill and outline of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    /// Fill color.
    pub fill: Rgb,
    /// Fill opacity.
    pub fill_alpha: f32,
    /// Outline color.
    pub border: Rgb,
    /// Outline opacity.
    pub border_alpha: f32,
    /// Outline width in screen pixels.
    pub border_width: f32,
}

/// Text appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in world units.
    pub font_size: f64,
    /// Glyph color.
    pub color: Rgb,
}

/// Display capabilities the renderers need.
pub trait RenderSurface {
    /// Create a detached, visible, empty text object.
    fn create_text(&mut self, style: TextStyle) -> ObjectId;
    /// Replace an object's text.
    fn set_text(&mut self, id: ObjectId, text: &str);
    /// Move an object's top-left corner.
    fn set_position(&mut self, id: ObjectId, x: f64, y: f64);
    /// Set the rasterization tier of a text object.
    fn set_resolution(&mut self, id: ObjectId, tier: u8);
    /// Show or hide an object.
    fn set_visible(&mut self, id: ObjectId, visible: bool);
    /// Create a detached rectangle. Interactive rectangles take part in hit-testing.
    fn create_rect(&mut self, rect: Rect, style: RectStyle, interactive: bool) -> ObjectId;
    /// Change a rectangle's geometry and style.
    fn set_rect(&mut self, id: ObjectId, rect: Rect, style: RectStyle);
    /// Add an object to the display tree on `layer`.
    fn attach(&mut self, id: ObjectId, layer: Layer);
    /// Remove an object from the display tree, keeping it alive.
    fn detach(&mut self, id: ObjectId);
    /// Free an object.
    fn destroy(&mut self, id: ObjectId);
    /// Topmost attached, visible, interactive rectangle under a screen point.
    fn hit_test(&self, screen_x: f64, screen_y: f64) -> Option<ObjectId>;
    /// Set the world → screen transform: `screen = world * zoom + offset`.
    fn set_transform(&mut self, zoom: f64, offset_x: f64, offset_y: f64);
}
