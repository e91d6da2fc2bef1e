//! Help overlay listing the canvas key bindings.
//!
//! Toggled by '?', dismissed by 'Esc' or '?'.

use super::constants::{HELP_POPUP_HEIGHT_PERCENT, HELP_POPUP_WIDTH_PERCENT};
use super::styles::{KEY_TEXT, MUTED_TEXT, SECTION_HEADER};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SECTIONS: [(&str, &[(&str, &str)]); 4] = [
    (
        "Navigation",
        &[
            ("h/j/k/l, arrows", "Pan"),
            ("+/-, wheel", "Zoom in / out"),
            ("0", "Fit to screen"),
            ("z", "Center at current zoom"),
            ("b", "Cycle book view"),
        ],
    ),
    (
        "Search",
        &[
            ("/", "Exact search"),
            ("s", "Semantic search"),
            ("n", "Next match"),
            ("c, Esc", "Clear search"),
            ("click", "Jump to highlight"),
        ],
    ),
    (
        "Verses",
        &[
            ("g", "Go to verse (number or reference)"),
            ("r", "Cross-references for current match"),
        ],
    ),
    ("Application", &[("?", "Toggle help"), ("q, Ctrl+c", "Quit")]),
];

/// Render the help overlay centered on the screen.
pub fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(HELP_POPUP_WIDTH_PERCENT, HELP_POPUP_HEIGHT_PERCENT, frame.area());
    frame.render_widget(Clear, popup_area);

    let help = Paragraph::new(build_help_content())
        .block(
            Block::default()
                .title(" Keyboard Shortcuts ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);
    frame.render_widget(help, popup_area);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(1),
        width: popup_area.width,
        height: 1,
    };
    let hint = Paragraph::new(Line::from(Span::styled(
        " Press Esc or ? to close ",
        MUTED_TEXT.add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hint, hint_area);
}

/// Rect of `percent_x` by `percent_y` of `area`, centered.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, (title, keys)) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(*title, SECTION_HEADER)));
        for (key, description) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<16}"), KEY_TEXT),
                Span::raw(*description),
            ]));
        }
    }
    lines
}
