//! Layout and input constants for the canvas view.

use std::time::Duration;

/// Height of the status bar at the bottom of the screen.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Width of the help popup as a percentage of the terminal.
pub const HELP_POPUP_WIDTH_PERCENT: u16 = 60;

/// Height of the help popup as a percentage of the terminal.
pub const HELP_POPUP_HEIGHT_PERCENT: u16 = 80;

/// Height of the cross-reference panel, borders included.
pub const CROSS_REF_PANEL_HEIGHT: u16 = 8;

/// Cells moved per pan key press.
pub const PAN_STEP: f64 = 8.0;

/// Zoom factor per zoom key press or wheel notch.
pub const ZOOM_STEP: f64 = 1.25;

/// How long the event loop waits for input before checking background work.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
