//! Bottom status bar: search state, view, semantic status and zoom.

use super::styles::{ERROR_TEXT, STATUS_BAR};
use crate::controller::{Controller, SearchMode};
use crate::layout::ViewMode;
use crate::render::RenderSurface;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// A transient message shown in place of the search summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Text.
    pub text: String,
    /// Render as an error.
    pub is_error: bool,
}

impl StatusMessage {
    /// Informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    /// Error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Summary of the active search.
pub fn search_summary<S: RenderSurface>(controller: &Controller<S>) -> String {
    let position = |count: usize| match controller.current_match_index() {
        Some(_) if count > 0 => format!("{}/{}", current_position(controller) + 1, count),
        _ => count.to_string(),
    };
    match controller.search_mode() {
        SearchMode::None => format!("{} verses", controller.view_corpus().len()),
        SearchMode::Exact => {
            let count = controller.search_result_count();
            format!(
                "\"{}\": {} matches",
                controller.search_term().unwrap_or_default(),
                position(count)
            )
        }
        SearchMode::Semantic => {
            let count = controller.semantic_result_count();
            format!(
                "semantic \"{}\": {} verses",
                controller.semantic_query().unwrap_or_default(),
                position(count)
            )
        }
    }
}

/// Zero-based position of the current result within its list.
fn current_position<S: RenderSurface>(controller: &Controller<S>) -> usize {
    match controller.search_mode() {
        SearchMode::Semantic => controller
            .current_semantic_verse()
            .and_then(|verse| {
                controller
                    .semantic_results()
                    .iter()
                    .position(|v| v.verse_index == verse)
            })
            .unwrap_or(0),
        _ => controller.current_match_index().unwrap_or(0),
    }
}

/// Name of the current view.
pub fn view_label<S: RenderSurface>(controller: &Controller<S>) -> String {
    match controller.view_mode() {
        ViewMode::AllBooks => "All books".to_string(),
        ViewMode::SingleBook(book) => controller
            .corpus()
            .books()
            .get(book)
            .cloned()
            .unwrap_or_else(|| format!("Book {book}")),
    }
}

/// One-line status bar.
pub struct StatusBar {
    left: String,
    right: String,
    is_error: bool,
}

impl StatusBar {
    /// Status for `controller` at the displayed `zoom`.
    pub fn new<S: RenderSurface>(controller: &Controller<S>, zoom: f64, message: Option<&StatusMessage>) -> Self {
        let (left, is_error) = match message {
            Some(m) => (m.text.clone(), m.is_error),
            None => (search_summary(controller), false),
        };
        let semantic = controller
            .semantic_status()
            .map(|s| format!(" | semantic: {}", s.as_str()))
            .unwrap_or_default();
        let right = format!("{}{} | zoom {:.0}% ", view_label(controller), semantic, zoom * 100.0);
        Self {
            left: format!(" {left}"),
            right,
            is_error,
        }
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let left = if self.is_error {
            Span::styled(self.left, ERROR_TEXT)
        } else {
            Span::raw(self.left)
        };
        let right = Span::raw(self.right);
        let gap = usize::from(area.width).saturating_sub(left.width() + right.width());
        Paragraph::new(Line::from(vec![left, Span::raw(" ".repeat(gap)), right]))
            .style(STATUS_BAR)
            .render(area, buf);
    }
}
