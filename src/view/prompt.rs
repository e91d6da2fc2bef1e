//! One-line input prompt for search terms and verse references.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// What a submitted prompt does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Exact search.
    Search,
    /// Semantic search.
    Semantic,
    /// Jump to a verse by reference or number.
    GoTo,
}

impl PromptKind {
    fn label(self) -> &'static str {
        match self {
            Self::Search => "/",
            Self::Semantic => "semantic: ",
            Self::GoTo => "go to: ",
        }
    }
}

/// Text being typed into a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    /// Empty prompt of `kind`.
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    /// What the prompt is for.
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Typed text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Append a character.
    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Remove the last character.
    pub fn pop(&mut self) {
        self.input.pop();
    }
}

/// Renders a [`Prompt`] with a block cursor.
pub struct PromptBar<'a> {
    prompt: &'a Prompt,
}

impl<'a> PromptBar<'a> {
    /// Widget for `prompt`.
    pub fn new(prompt: &'a Prompt) -> Self {
        Self { prompt }
    }
}

impl Widget for PromptBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(self.prompt.kind.label(), Style::default().fg(Color::Cyan)),
            Span::raw(self.prompt.input.as_str()),
            Span::styled(
                " ",
                Style::default()
                    .bg(Color::White)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(line)
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
    }
}
