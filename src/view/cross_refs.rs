//! Panel listing cross-references for the current match.

use super::styles::{MUTED_TEXT, REFERENCE_TEXT};
use crate::controller::CrossReference;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Bordered list of similar verses, best first.
pub struct CrossRefPanel<'a> {
    title: &'a str,
    refs: &'a [CrossReference],
}

impl<'a> CrossRefPanel<'a> {
    /// Panel titled `title` listing `refs`.
    pub fn new(title: &'a str, refs: &'a [CrossReference]) -> Self {
        Self { title, refs }
    }
}

impl Widget for CrossRefPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let lines: Vec<Line> = self
            .refs
            .iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled(r.reference.clone(), REFERENCE_TEXT),
                    Span::styled(format!("  {:.2}  ", r.score), MUTED_TEXT),
                    Span::raw(r.text.clone()),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(format!(" {} ", self.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .render(area, buf);
    }
}
