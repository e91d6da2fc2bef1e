//! Terminal front-end (impure shell).
//!
//! [`CanvasApp`] paints the controller's [`Scene`] into a ratatui terminal
//! and maps keys and mouse events to controller operations. Semantic
//! searches run on a small tokio runtime owned by the app; the event loop
//! applies their outcome once the task finishes.

mod canvas;
pub mod constants;
mod cross_refs;
mod help;
mod prompt;
mod status;
mod styles;

pub use canvas::CanvasWidget;
pub use cross_refs::CrossRefPanel;
pub use help::render_help_overlay;
pub use prompt::{Prompt, PromptBar, PromptKind};
pub use status::{search_summary, view_label, StatusBar, StatusMessage};

use crate::config::CanvasConfig;
use crate::controller::{Controller, CrossReference, SemanticOutcome};
use crate::layout::ViewMode;
use crate::model::{AppError, Corpus};
use crate::render::Scene;
use crate::search::semantic::SemanticSearchEngine;
use constants::{CROSS_REF_PANEL_HEIGHT, PAN_STEP, POLL_INTERVAL, STATUS_BAR_HEIGHT, ZOOM_STEP};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Canvas TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct CanvasApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    controller: Controller<Scene>,
    runtime: Runtime,
    pending: Option<JoinHandle<SemanticOutcome>>,
    prompt: Option<Prompt>,
    message: Option<StatusMessage>,
    cross_refs: Option<(String, Vec<CrossReference>)>,
    show_help: bool,
    /// Zoom as last reported by the controller's zoom observer.
    zoom_display: Arc<AtomicU64>,
}

impl CanvasApp<CrosstermBackend<Stdout>> {
    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Between input events the
    /// loop checks for finished semantic searches.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => self.handle_resize(width, height),
                    _ => continue,
                }
                self.draw()?;
            } else if self.poll_pending() {
                self.draw()?;
            }
        }
    }
}

impl<B> CanvasApp<B>
where
    B: Backend,
{
    /// Wrap `controller` for display on `terminal`.
    ///
    /// The controller's screen is synced to the terminal size minus the
    /// status bar.
    pub fn new(terminal: Terminal<B>, mut controller: Controller<Scene>) -> Result<Self, TuiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("verse-canvas-search")
            .enable_all()
            .build()?;

        let zoom_display = Arc::new(AtomicU64::new(controller.viewport().zoom.to_bits()));
        let sink = Arc::clone(&zoom_display);
        controller.on_zoom_changed(move |zoom| sink.store(zoom.to_bits(), Ordering::Relaxed));

        let size = terminal.size()?;
        controller.handle_resize(
            f64::from(size.width),
            f64::from(size.height.saturating_sub(STATUS_BAR_HEIGHT)),
        );

        Ok(Self {
            terminal,
            controller,
            runtime,
            pending: None,
            prompt: None,
            message: None,
            cross_refs: None,
            show_help: false,
            zoom_display,
        })
    }

    // ===== Accessors =====

    /// The controller.
    pub fn controller(&self) -> &Controller<Scene> {
        &self.controller
    }

    /// Mutable controller access.
    pub fn controller_mut(&mut self) -> &mut Controller<Scene> {
        &mut self.controller
    }

    /// The terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Prompt being typed, if any.
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Status message, if any.
    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Open cross-reference panel: title and entries.
    pub fn cross_refs(&self) -> Option<(&str, &[CrossReference])> {
        self.cross_refs
            .as_ref()
            .map(|(title, refs)| (title.as_str(), refs.as_slice()))
    }

    /// True while the help overlay is shown.
    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    /// Zoom shown in the status bar.
    pub fn zoom_display(&self) -> f64 {
        f64::from_bits(self.zoom_display.load(Ordering::Relaxed))
    }

    /// True while a semantic search is running.
    pub fn has_pending_search(&self) -> bool {
        self.pending.is_some()
    }

    // ===== Input =====

    /// Handle one key press. Returns true if the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return false;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return false;
        }

        self.message = None;
        let center = self.screen_center();
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Left | KeyCode::Char('h') => self.controller.pan(PAN_STEP, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.controller.pan(-PAN_STEP, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.controller.pan(0.0, PAN_STEP),
            KeyCode::Down | KeyCode::Char('j') => self.controller.pan(0.0, -PAN_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.controller.zoom_by(ZOOM_STEP, Some(center)),
            KeyCode::Char('-') => self.controller.zoom_by(1.0 / ZOOM_STEP, Some(center)),
            KeyCode::Char('0') => self.controller.fit_to_screen(),
            KeyCode::Char('z') => self.controller.reset_view(),
            KeyCode::Char('/') => self.prompt = Some(Prompt::new(PromptKind::Search)),
            KeyCode::Char('s') => self.prompt = Some(Prompt::new(PromptKind::Semantic)),
            KeyCode::Char('g') => self.prompt = Some(Prompt::new(PromptKind::GoTo)),
            KeyCode::Char('n') => {
                if self.controller.jump_to_next_match().is_none() {
                    self.message = Some(StatusMessage::info("No active search"));
                }
            }
            KeyCode::Char('c') | KeyCode::Esc => {
                if self.cross_refs.take().is_none() {
                    self.cancel_pending();
                    self.controller.clear_search();
                }
            }
            KeyCode::Char('r') => self.show_cross_refs(),
            KeyCode::Char('b') => self.cycle_book(),
            _ => {}
        }
        false
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit(prompt);
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.push(ch);
                }
            }
            _ => {}
        }
    }

    /// Handle one mouse event.
    ///
    /// Left click jumps to a highlight; the wheel zooms about the pointer.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = (f64::from(mouse.column) + 0.5, f64::from(mouse.row) + 0.5);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.controller.handle_click(point.0, point.1) {
                    debug!(match_index = index, "Highlight clicked");
                    self.cross_refs = None;
                }
            }
            MouseEventKind::ScrollUp => self.controller.zoom_by(ZOOM_STEP, Some(point)),
            MouseEventKind::ScrollDown => self.controller.zoom_by(1.0 / ZOOM_STEP, Some(point)),
            _ => {}
        }
    }

    /// Adopt a new terminal size.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        debug!("Handling resize to {}x{}", width, height);
        self.controller.handle_resize(
            f64::from(width),
            f64::from(height.saturating_sub(STATUS_BAR_HEIGHT)),
        );
    }

    fn screen_center(&self) -> (f64, f64) {
        let screen = self.controller.screen();
        (screen.width / 2.0, screen.height / 2.0)
    }

    // ===== Commands =====

    fn submit(&mut self, prompt: Prompt) {
        let input = prompt.input().trim().to_string();
        match prompt.kind() {
            PromptKind::Search => self.submit_search(&input),
            PromptKind::Semantic => self.submit_semantic(&input),
            PromptKind::GoTo => self.submit_goto(&input),
        }
    }

    fn submit_search(&mut self, term: &str) {
        self.cancel_pending();
        self.cross_refs = None;
        let count = self.controller.search(term);
        if self.controller.search_term().is_none() {
            self.message = Some(StatusMessage::info("Search terms need at least 3 characters"));
        } else if count == 0 {
            self.message = Some(StatusMessage::info(format!("No matches for \"{term}\"")));
        } else {
            self.controller.jump_to_next_match();
        }
    }

    fn submit_semantic(&mut self, query: &str) {
        self.cancel_pending();
        self.cross_refs = None;
        let search = self.controller.config().search;
        match self.controller.begin_semantic_search(
            query,
            Some(search.semantic_top_k),
            Some(search.semantic_min_score),
        ) {
            Ok(ticket) => {
                info!(query, "Semantic search submitted");
                self.pending = Some(self.runtime.spawn(ticket.run()));
                self.message = Some(StatusMessage::info(format!("Searching for \"{query}\"")));
            }
            Err(e) => self.message = Some(StatusMessage::error(e.to_string())),
        }
    }

    fn submit_goto(&mut self, query: &str) {
        match resolve_verse(self.controller.view_corpus(), query) {
            Some(verse_index) => {
                if let Err(e) = self.controller.jump_to_verse(verse_index) {
                    self.message = Some(StatusMessage::error(e.to_string()));
                }
            }
            None => {
                self.message = Some(StatusMessage::error(format!("No verse matching \"{query}\"")));
            }
        }
    }

    fn show_cross_refs(&mut self) {
        let Some(match_index) = self.controller.current_match_index() else {
            self.message = Some(StatusMessage::info("Select a match first (n)"));
            return;
        };
        let search = self.controller.config().search;
        let result = self.runtime.block_on(self.controller.get_auto_cross_refs_for_match(
            match_index,
            search.cross_ref_min_score,
            search.cross_ref_limit,
        ));

        match result {
            Ok(refs) if refs.is_empty() => {
                self.message = Some(StatusMessage::info("No cross-references found"));
            }
            Ok(refs) => {
                let source = self
                    .controller
                    .active_matches()
                    .and_then(|set| set.get(match_index))
                    .and_then(|found| {
                        found
                            .verse_index
                            .or_else(|| self.controller.layout().text.verse_of_line(found.line_index))
                    })
                    .and_then(|verse| self.controller.get_verse_info(verse))
                    .map(|info| info.reference)
                    .unwrap_or_default();
                self.cross_refs = Some((format!("Cross-references for {source}"), refs));
            }
            Err(e) => self.message = Some(StatusMessage::error(e.to_string())),
        }
    }

    fn cycle_book(&mut self) {
        let books = self.controller.corpus().books().len();
        let next = match self.controller.view_mode() {
            ViewMode::AllBooks if books > 0 => ViewMode::SingleBook(0),
            ViewMode::SingleBook(book) if book + 1 < books => ViewMode::SingleBook(book + 1),
            _ => ViewMode::AllBooks,
        };
        self.cancel_pending();
        self.cross_refs = None;
        if let Err(e) = self.controller.set_view_mode(next) {
            self.message = Some(StatusMessage::error(e.to_string()));
        }
    }

    // ===== Background search =====

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Apply a finished semantic search. Returns true if one was applied.
    pub fn poll_pending(&mut self) -> bool {
        if !self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            return false;
        }
        self.wait_for_pending();
        true
    }

    /// Block until the running semantic search finishes and apply it.
    pub fn wait_for_pending(&mut self) {
        let Some(handle) = self.pending.take() else {
            return;
        };
        match self.runtime.block_on(handle) {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(e) => {
                warn!(error = %e, "Semantic search task failed");
                self.message = Some(StatusMessage::error(format!("Semantic search failed: {e}")));
            }
        }
    }

    fn apply_outcome(&mut self, outcome: SemanticOutcome) {
        match self.controller.finish_semantic_search(outcome) {
            Ok(Some(0)) => self.message = Some(StatusMessage::info("No similar verses")),
            Ok(Some(_)) => {
                self.message = None;
                self.controller.jump_to_next_semantic_match();
            }
            Ok(None) => {}
            Err(e) => self.message = Some(StatusMessage::error(e.to_string())),
        }
    }

    // ===== Rendering =====

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        self.poll_pending();
        self.controller.render_frame();

        let zoom = self.zoom_display();
        let char_width = self.controller.config().viewport.char_width;
        let status = StatusBar::new(&self.controller, zoom, self.message.as_ref());
        let scene = self.controller.surface();
        let prompt = self.prompt.as_ref();
        let cross_refs = self.cross_refs.as_ref();
        let show_help = self.show_help;

        self.terminal.draw(|frame| {
            let [canvas_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                    .areas(frame.area());
            frame.render_widget(CanvasWidget::new(scene, char_width), canvas_area);

            match prompt {
                Some(prompt) => frame.render_widget(PromptBar::new(prompt), status_area),
                None => frame.render_widget(status, status_area),
            }

            if let Some((title, refs)) = cross_refs {
                let height = CROSS_REF_PANEL_HEIGHT.min(canvas_area.height);
                let panel = Rect {
                    y: canvas_area.y + canvas_area.height - height,
                    height,
                    ..canvas_area
                };
                frame.render_widget(CrossRefPanel::new(title, refs), panel);
            }

            if show_help {
                render_help_overlay(frame);
            }
        })?;

        Ok(())
    }
}

/// Verse index for a 1-based verse number or a reference like `"Alma 1:2"`.
pub fn resolve_verse(corpus: &Corpus, query: &str) -> Option<usize> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if let Ok(number) = query.parse::<usize>() {
        return number.checked_sub(1).filter(|&index| index < corpus.len());
    }
    corpus
        .verses()
        .iter()
        .find(|verse| verse.reference().eq_ignore_ascii_case(query))
        .map(|verse| verse.index)
}

/// Initialize and run the canvas TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// even when the loop fails.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_canvas(
    corpus: Corpus,
    config: CanvasConfig,
    engine: Option<Arc<SemanticSearchEngine>>,
    mode: ViewMode,
) -> Result<(), TuiError> {
    let (width, height) = crossterm::terminal::size()?;
    let mut controller = Controller::new(
        corpus,
        config,
        Scene::new(),
        f64::from(width),
        f64::from(height.saturating_sub(STATUS_BAR_HEIGHT)),
    );
    if let Some(engine) = engine {
        controller = controller.with_semantic_engine(engine);
    }
    if mode != ViewMode::AllBooks {
        controller.set_view_mode(mode).map_err(AppError::from)?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(crossterm::event::EnableMouseCapture)?;

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .map_err(TuiError::from)
        .and_then(|terminal| CanvasApp::new(terminal, controller))
        .and_then(|mut app| app.run());

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "canvas_app_tests.rs"]
mod tests;
