//! View-state layer: viewport transform, culling and fit-to-screen.
//!
//! # Module Structure
//!
//! - `viewport`: [`ViewportState`], [`ContentMetrics`] and the pure range and
//!   zoom functions built on them

pub mod viewport;

pub use viewport::{
    center_on, centered_offset, initial_offset, initial_zoom, text_resolution_for_zoom,
    visible_column_range, visible_line_range, visible_window, zoom_about_point, ContentMetrics,
    ScreenSize, ViewportState, VisibleWindow,
};
