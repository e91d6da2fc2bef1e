//! Shared styles for the canvas view.

use ratatui::style::{Color, Modifier, Style};

/// Section headers in overlays.
pub const SECTION_HEADER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

/// Key names in the help overlay.
pub const KEY_TEXT: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

/// Secondary text.
pub const MUTED_TEXT: Style = Style::new().fg(Color::Gray);

/// Status bar background.
pub const STATUS_BAR: Style = Style::new().bg(Color::DarkGray).fg(Color::White);

/// Status messages reporting a failure.
pub const ERROR_TEXT: Style = Style::new().fg(Color::LightRed);

/// Cross-reference verse references.
pub const REFERENCE_TEXT: Style = Style::new().fg(Color::LightCyan).add_modifier(Modifier::BOLD);
