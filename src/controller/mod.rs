//! Visualization controller.
//!
//! [`Controller`] owns the corpus layout, the viewport, both search engines
//! and the render reconciler, and sequences every user operation against
//! them. Operations only mutate state and mark the frame dirty;
//! [`Controller::render_frame`] decides whether a reconciliation pass is
//! worth running.
//!
//! Exact and semantic search are mutually exclusive. Starting either one
//! clears the other's matches. Every search operation bumps a token, and
//! semantic outcomes carrying an older token are discarded on arrival.

use crate::config::CanvasConfig;
use crate::layout::{CorpusLayout, ViewMode};
use crate::model::{ControllerError, Corpus, SemanticError};
use crate::render::{FrameContext, FrameStats, HighlightKind, RenderReconciler, RenderSurface, Rgb, TextStyle};
use crate::search::semantic::{ScoredVerse, SemanticSearchEngine, SemanticStatus};
use crate::search::{ExactSearchEngine, MatchSet, SearchMatch};
use crate::view_state::{
    center_on, centered_offset, initial_offset, initial_zoom, text_resolution_for_zoom, visible_window,
    zoom_about_point, ContentMetrics, ScreenSize, ViewportState,
};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Color of verse text.
pub const TEXT_COLOR: Rgb = Rgb::new(225, 225, 225);

/// Receives the new zoom after every zoom change.
pub type ZoomObserver = Box<dyn FnMut(f64) + Send>;

// ===== Search state =====

/// Which result set drives highlights and navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// No active search.
    #[default]
    None,
    /// Literal matches.
    Exact,
    /// Verse-similarity matches.
    Semantic,
}

/// Applied semantic results.
///
/// Each scored verse expands to one whole-line match per wrapped line.
#[derive(Debug, Default)]
struct SemanticResults {
    query: String,
    verses: Vec<ScoredVerse>,
    matches: MatchSet,
    /// Position in `matches` of the first line of each entry in `verses`.
    first_match: Vec<usize>,
    cursor: Option<usize>,
}

impl SemanticResults {
    fn build(query: String, layout: &CorpusLayout, scored: Vec<ScoredVerse>) -> Self {
        let lines = layout.text.lines();
        let mut verses = Vec::with_capacity(scored.len());
        let mut first_match = Vec::with_capacity(scored.len());
        let mut matches = Vec::new();

        for hit in scored {
            let Some(range) = layout.text.verse_lines(hit.verse_index) else {
                debug!(verse = hit.verse_index, "Semantic hit outside the corpus");
                continue;
            };
            first_match.push(matches.len());
            for line_index in range {
                let line_text = lines.get(line_index).cloned().unwrap_or_default();
                matches.push(SearchMatch {
                    line_index,
                    start_char: 0,
                    end_char: line_text.chars().count(),
                    line_text,
                    verse_index: Some(hit.verse_index),
                    score: Some(hit.score),
                });
            }
            verses.push(hit);
        }

        Self {
            query,
            verses,
            matches: MatchSet::new(matches),
            first_match,
            cursor: None,
        }
    }

    /// Position in `verses` owning match `match_index`.
    fn verse_position(&self, match_index: usize) -> Option<usize> {
        self.first_match
            .partition_point(|&first| first <= match_index)
            .checked_sub(1)
    }
}

/// A semantic search waiting to run.
///
/// Owns everything it needs, so it can be spawned on a runtime while the
/// controller keeps handling input.
pub struct SemanticTicket {
    token: u64,
    query: String,
    top_k: Option<usize>,
    min_score: Option<f32>,
    engine: Arc<SemanticSearchEngine>,
}

impl fmt::Debug for SemanticTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticTicket")
            .field("token", &self.token)
            .field("query", &self.query)
            .field("top_k", &self.top_k)
            .field("min_score", &self.min_score)
            .finish()
    }
}

impl SemanticTicket {
    /// Search token this ticket was issued under.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Embed the query and rank verses.
    pub async fn run(self) -> SemanticOutcome {
        let result = self
            .engine
            .search_text(&self.query, self.top_k, self.min_score)
            .await;
        SemanticOutcome {
            token: self.token,
            query: self.query,
            result,
        }
    }
}

/// Result of a [`SemanticTicket`], applied with
/// [`Controller::finish_semantic_search`].
#[derive(Debug, Clone)]
pub struct SemanticOutcome {
    token: u64,
    query: String,
    result: Result<Vec<ScoredVerse>, SemanticError>,
}

impl SemanticOutcome {
    /// Search token the ticket was issued under.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Query text.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Display information for one verse.
#[derive(Debug, Clone, PartialEq)]
pub struct VerseInfo {
    /// Verse index in the viewed corpus.
    pub verse_index: usize,
    /// `"Book chapter:verse"`, empty for unlabeled rows.
    pub reference: String,
    /// Book title, if any.
    pub book: Option<String>,
    /// Verse text.
    pub text: String,
    /// Wrapped lines of the verse.
    pub lines: Range<usize>,
}

/// A verse similar to another one.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossReference {
    /// Verse index.
    pub verse_index: usize,
    /// Similarity to the source verse.
    pub score: f32,
    /// Human-readable reference.
    pub reference: String,
    /// Verse text.
    pub text: String,
}

// ===== Controller =====

/// Composes layout, viewport, search and rendering for one canvas.
pub struct Controller<S: RenderSurface> {
    config: CanvasConfig,
    corpus: Corpus,
    book_view: Option<Corpus>,
    view_mode: ViewMode,
    layout: CorpusLayout,
    metrics: ContentMetrics,

    surface: S,
    reconciler: RenderReconciler,
    viewport: ViewportState,
    screen: ScreenSize,
    fit_zoom: f64,

    mode: SearchMode,
    exact: ExactSearchEngine,
    semantic: SemanticResults,
    semantic_engine: Option<Arc<SemanticSearchEngine>>,
    search_token: u64,

    zoom_observers: Vec<ZoomObserver>,
    content_dirty: bool,
    last_rendered: Option<ViewportState>,
    last_stats: FrameStats,
}

impl<S: RenderSurface> fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("view_mode", &self.view_mode)
            .field("viewport", &self.viewport)
            .field("screen", &self.screen)
            .field("mode", &self.mode)
            .field("search_token", &self.search_token)
            .field("zoom_observers", &self.zoom_observers.len())
            .finish_non_exhaustive()
    }
}

impl<S: RenderSurface> Controller<S> {
    /// Lay out `corpus` in the all-books view and fit it to the screen.
    pub fn new(corpus: Corpus, config: CanvasConfig, surface: S, screen_width: f64, screen_height: f64) -> Self {
        let layout = CorpusLayout::build(&corpus, &config.layout, ViewMode::AllBooks);
        let metrics = ContentMetrics::new(&config.viewport, &layout.columns, config.layout.line_width);
        let reconciler = RenderReconciler::new(TextStyle {
            font_size: config.render.font_size,
            color: TEXT_COLOR,
        });

        let mut controller = Self {
            config,
            corpus,
            book_view: None,
            view_mode: ViewMode::AllBooks,
            layout,
            metrics,
            surface,
            reconciler,
            viewport: ViewportState {
                zoom: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
                text_resolution: 1,
            },
            screen: ScreenSize::new(screen_width, screen_height),
            fit_zoom: 1.0,
            mode: SearchMode::None,
            exact: ExactSearchEngine::new(),
            semantic: SemanticResults::default(),
            semantic_engine: None,
            search_token: 0,
            zoom_observers: Vec::new(),
            content_dirty: true,
            last_rendered: None,
            last_stats: FrameStats::default(),
        };
        controller.fit_to_screen();
        controller
    }

    /// Attach the semantic engine used by semantic search and cross-references.
    pub fn with_semantic_engine(mut self, engine: Arc<SemanticSearchEngine>) -> Self {
        self.semantic_engine = Some(engine);
        self
    }

    /// Register a zoom-change observer.
    pub fn on_zoom_changed(&mut self, observer: impl FnMut(f64) + Send + 'static) {
        self.zoom_observers.push(Box::new(observer));
    }

    /// Register the handler invoked with the match index of a clicked highlight.
    pub fn on_highlight_click(&mut self, handler: impl FnMut(usize) + Send + 'static) {
        self.reconciler.set_on_highlight_click(Box::new(handler));
    }

    // ===== Accessors =====

    /// Active configuration.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The full corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The corpus currently laid out: the full corpus or one book.
    pub fn view_corpus(&self) -> &Corpus {
        self.book_view.as_ref().unwrap_or(&self.corpus)
    }

    /// Current view mode.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Layout of the viewed corpus.
    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    /// World geometry of the layout.
    pub fn metrics(&self) -> &ContentMetrics {
        &self.metrics
    }

    /// Current viewport.
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Current screen size.
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Fit-to-screen zoom for the current screen.
    pub fn fit_zoom(&self) -> f64 {
        self.fit_zoom
    }

    /// The render surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable render surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Statistics of the last reconciliation pass.
    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Active search mode.
    pub fn search_mode(&self) -> SearchMode {
        self.mode
    }

    /// Token of the latest search operation.
    pub fn search_token(&self) -> u64 {
        self.search_token
    }

    /// Exact search term, if one is active.
    pub fn search_term(&self) -> Option<&str> {
        self.exact.term()
    }

    /// Number of exact matches.
    pub fn search_result_count(&self) -> usize {
        self.exact.match_count()
    }

    /// Number of verses in the applied semantic results.
    pub fn semantic_result_count(&self) -> usize {
        self.semantic.verses.len()
    }

    /// Applied semantic results, best first.
    pub fn semantic_results(&self) -> &[ScoredVerse] {
        &self.semantic.verses
    }

    /// Query of the applied semantic results.
    pub fn semantic_query(&self) -> Option<&str> {
        (self.mode == SearchMode::Semantic).then_some(self.semantic.query.as_str())
    }

    /// Verse index of the current semantic result.
    pub fn current_semantic_verse(&self) -> Option<usize> {
        let position = self.semantic.cursor?;
        self.semantic.verses.get(position).map(|v| v.verse_index)
    }

    /// Matches of the active mode.
    pub fn active_matches(&self) -> Option<&MatchSet> {
        match self.mode {
            SearchMode::None => None,
            SearchMode::Exact => Some(self.exact.results()),
            SearchMode::Semantic => Some(&self.semantic.matches),
        }
    }

    /// Current match index of the active mode.
    pub fn current_match_index(&self) -> Option<usize> {
        self.active_matches()?.current()
    }

    /// Semantic engine status, if an engine is attached.
    pub fn semantic_status(&self) -> Option<SemanticStatus> {
        self.semantic_engine.as_ref().map(|e| e.status())
    }

    /// The attached semantic engine.
    pub fn semantic_engine(&self) -> Option<&Arc<SemanticSearchEngine>> {
        self.semantic_engine.as_ref()
    }

    /// Display information for a verse of the viewed corpus.
    pub fn get_verse_info(&self, verse_index: usize) -> Option<VerseInfo> {
        let verse = self.view_corpus().verse(verse_index)?;
        let lines = self.layout.text.verse_lines(verse_index)?;
        Some(VerseInfo {
            verse_index,
            reference: verse.reference(),
            book: (!verse.meta.book.is_empty()).then(|| verse.meta.book.clone()),
            text: verse.text.clone(),
            lines,
        })
    }

    // ===== Viewport =====

    /// Zoom to `new_zoom`, clamped to the configured range.
    ///
    /// With a focal point, the world point under it stays in place.
    /// Otherwise the offset is unchanged.
    pub fn set_zoom(&mut self, new_zoom: f64, focal: Option<(f64, f64)>) {
        if !new_zoom.is_finite() || new_zoom <= 0.0 {
            warn!(zoom = new_zoom, "Ignoring invalid zoom");
            return;
        }
        let cfg = &self.config.viewport;
        let zoom = new_zoom.max(cfg.zoom_min).min(cfg.zoom_max);
        let (offset_x, offset_y) = match focal {
            Some((fx, fy)) => zoom_about_point(&self.viewport, zoom, fx, fy),
            None => (self.viewport.offset_x, self.viewport.offset_y),
        };
        let changed = (zoom - self.viewport.zoom).abs() > f64::EPSILON;
        self.apply_viewport(zoom, offset_x, offset_y);
        if changed {
            self.notify_zoom();
        }
    }

    /// Multiply the zoom by `factor`.
    pub fn zoom_by(&mut self, factor: f64, focal: Option<(f64, f64)>) {
        self.set_zoom(self.viewport.zoom * factor, focal);
    }

    /// Translate the view. Unclamped.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.offset_x += dx;
        self.viewport.offset_y += dy;
    }

    /// Center the content at the current zoom.
    pub fn reset_view(&mut self) {
        let (offset_x, offset_y) = centered_offset(
            self.viewport.zoom,
            self.metrics.total_width(),
            self.metrics.total_height(),
            self.screen,
        );
        self.apply_viewport(self.viewport.zoom, offset_x, offset_y);
    }

    /// Return to the fitted zoom and its initial offset.
    pub fn fit_to_screen(&mut self) {
        let (width, height) = (self.metrics.total_width(), self.metrics.total_height());
        let zoom = initial_zoom(&self.config.viewport, width, height, self.screen);
        let (offset_x, offset_y) = initial_offset(&self.config.viewport, zoom, width, height, self.screen);
        self.fit_zoom = zoom;
        let changed = (zoom - self.viewport.zoom).abs() > f64::EPSILON;
        self.apply_viewport(zoom, offset_x, offset_y);
        if changed {
            self.notify_zoom();
        }
    }

    /// Adopt a new screen size.
    ///
    /// A zoom still at the previous fit snaps to the new fit. A zoom the user
    /// changed is kept.
    pub fn handle_resize(&mut self, screen_width: f64, screen_height: f64) {
        let previous_fit = self.fit_zoom;
        let at_fit = !zoom_moved(previous_fit, self.viewport.zoom, self.config.viewport.zoom_epsilon);
        self.screen = ScreenSize::new(screen_width, screen_height);
        self.content_dirty = true;

        if at_fit {
            self.fit_to_screen();
        } else {
            self.fit_zoom = initial_zoom(
                &self.config.viewport,
                self.metrics.total_width(),
                self.metrics.total_height(),
                self.screen,
            );
        }
        debug!(
            width = screen_width,
            height = screen_height,
            snapped = at_fit,
            zoom = self.viewport.zoom,
            "Screen resized"
        );
    }

    fn apply_viewport(&mut self, zoom: f64, offset_x: f64, offset_y: f64) {
        self.viewport = ViewportState {
            zoom,
            offset_x,
            offset_y,
            text_resolution: text_resolution_for_zoom(zoom, self.config.viewport.max_text_resolution),
        };
    }

    fn notify_zoom(&mut self) {
        let zoom = self.viewport.zoom;
        for observer in &mut self.zoom_observers {
            observer(zoom);
        }
    }

    /// Zoom in for reading and center world `(x, y)`.
    fn zoom_to_point(&mut self, x: f64, y: f64) {
        let cfg = &self.config.viewport;
        let zoom = (self.viewport.zoom * cfg.jump_zoom_multiplier)
            .max(cfg.jump_zoom_min)
            .min(cfg.jump_zoom_max);
        let (offset_x, offset_y) = center_on(x, y, zoom, self.screen);
        self.apply_viewport(zoom, offset_x, offset_y);
        self.notify_zoom();
    }

    /// World point at the middle of a match.
    fn match_point(&self, found: &SearchMatch) -> Option<(f64, f64)> {
        let (column, row) = self.layout.columns.locate(found.line_index)?;
        let (x, y) = self.metrics.char_position(column, row, 0);
        Some((
            x + found.mid_char() * self.metrics.char_width,
            y + self.metrics.line_height / 2.0,
        ))
    }

    // ===== Exact search =====

    /// Search the viewed lines for `term`.
    ///
    /// Clears semantic results. Terms shorter than three characters clear
    /// the search and return 0.
    pub fn search(&mut self, term: &str) -> usize {
        self.search_token += 1;
        self.semantic = SemanticResults::default();
        let count = self.exact.search(self.layout.text.lines(), term);
        self.mode = if self.exact.term().is_some() {
            SearchMode::Exact
        } else {
            SearchMode::None
        };
        self.content_dirty = true;
        info!(term, matches = count, "Exact search");
        count
    }

    // ===== Semantic search =====

    /// Start a semantic search for `term`.
    ///
    /// Clears current results and invalidates in-flight searches. Only
    /// available in the all-books view.
    pub fn begin_semantic_search(
        &mut self,
        term: &str,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<SemanticTicket, ControllerError> {
        if self.view_mode.is_single_book() {
            return Err(ControllerError::SemanticNotInView);
        }
        let engine = self
            .semantic_engine
            .clone()
            .ok_or(ControllerError::NoSemanticEngine)?;

        self.search_token += 1;
        self.exact.clear();
        self.semantic = SemanticResults::default();
        self.mode = SearchMode::None;
        self.content_dirty = true;
        debug!(token = self.search_token, query = term, "Semantic search started");

        Ok(SemanticTicket {
            token: self.search_token,
            query: term.trim().to_string(),
            top_k,
            min_score,
            engine,
        })
    }

    /// Apply a finished semantic search.
    ///
    /// Returns `Ok(None)` if a newer search operation superseded it.
    pub fn finish_semantic_search(&mut self, outcome: SemanticOutcome) -> Result<Option<usize>, ControllerError> {
        if outcome.token != self.search_token {
            debug!(
                token = outcome.token,
                latest = self.search_token,
                "Discarding stale semantic results"
            );
            return Ok(None);
        }

        let scored = outcome.result?;
        self.semantic = SemanticResults::build(outcome.query, &self.layout, scored);
        self.mode = SearchMode::Semantic;
        self.content_dirty = true;

        let count = self.semantic.verses.len();
        info!(
            query = %self.semantic.query,
            verses = count,
            lines = self.semantic.matches.len(),
            "Semantic search applied"
        );
        Ok(Some(count))
    }

    /// Run a semantic search to completion and apply it.
    pub async fn search_semantic(
        &mut self,
        term: &str,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<usize, ControllerError> {
        let ticket = self.begin_semantic_search(term, top_k, min_score)?;
        let outcome = ticket.run().await;
        Ok(self.finish_semantic_search(outcome)?.unwrap_or(0))
    }

    /// Drop all search state and invalidate in-flight searches.
    pub fn clear_search(&mut self) {
        self.search_token += 1;
        self.exact.clear();
        self.semantic = SemanticResults::default();
        self.mode = SearchMode::None;
        self.reconciler.clear_highlights(&mut self.surface);
        self.content_dirty = true;
    }

    // ===== Navigation =====

    /// Advance to the next match of the active mode and jump to it.
    ///
    /// Returns the new current match index.
    pub fn jump_to_next_match(&mut self) -> Option<usize> {
        match self.mode {
            SearchMode::None => None,
            SearchMode::Exact => {
                let index = self.exact.results_mut().advance()?;
                self.jump_to_match_and_zoom(index).ok()?;
                Some(index)
            }
            SearchMode::Semantic => {
                self.jump_to_next_semantic_match()?;
                self.semantic.matches.current()
            }
        }
    }

    /// Advance to the next semantic verse, wrapping, and jump to it.
    ///
    /// Returns its verse index.
    pub fn jump_to_next_semantic_match(&mut self) -> Option<usize> {
        if self.mode != SearchMode::Semantic || self.semantic.verses.is_empty() {
            return None;
        }
        let next = self
            .semantic
            .cursor
            .map_or(0, |c| (c + 1) % self.semantic.verses.len());
        let match_index = *self.semantic.first_match.get(next)?;
        self.jump_to_match_and_zoom(match_index).ok()?;
        self.current_semantic_verse()
    }

    /// Select match `match_index`, zoom in and center it.
    pub fn jump_to_match_and_zoom(&mut self, match_index: usize) -> Result<(), ControllerError> {
        let unknown = ControllerError::UnknownMatch(match_index);
        let point = {
            let found = self
                .active_matches()
                .and_then(|set| set.get(match_index))
                .ok_or_else(|| unknown.clone())?;
            self.match_point(found).ok_or_else(|| unknown.clone())?
        };

        match self.mode {
            SearchMode::Exact => {
                self.exact.results_mut().select(match_index);
            }
            SearchMode::Semantic => {
                self.semantic.matches.select(match_index);
                self.semantic.cursor = self.semantic.verse_position(match_index);
            }
            SearchMode::None => {}
        }

        self.zoom_to_point(point.0, point.1);
        self.content_dirty = true;
        debug!(match_index, zoom = self.viewport.zoom, "Jumped to match");
        Ok(())
    }

    /// Zoom in on the first line of a verse of the viewed corpus.
    pub fn jump_to_verse(&mut self, verse_index: usize) -> Result<(), ControllerError> {
        let lines = self
            .layout
            .text
            .verse_lines(verse_index)
            .ok_or(ControllerError::UnknownVerse(verse_index))?;
        let (column, row) = self
            .layout
            .columns
            .locate(lines.start)
            .ok_or(ControllerError::UnknownVerse(verse_index))?;
        let width = self
            .layout
            .text
            .lines()
            .get(lines.start)
            .map_or(0, |line| line.chars().count());

        let (x, y) = self.metrics.char_position(column, row, 0);
        self.zoom_to_point(
            x + width as f64 / 2.0 * self.metrics.char_width,
            y + self.metrics.line_height / 2.0,
        );
        debug!(verse_index, "Jumped to verse");
        Ok(())
    }

    /// Verses most similar to the verse owning match `match_index`.
    pub async fn get_auto_cross_refs_for_match(
        &self,
        match_index: usize,
        min_score: f32,
        limit: usize,
    ) -> Result<Vec<CrossReference>, ControllerError> {
        if self.view_mode.is_single_book() {
            return Err(ControllerError::SemanticNotInView);
        }
        let engine = self
            .semantic_engine
            .clone()
            .ok_or(ControllerError::NoSemanticEngine)?;
        let verse_index = self
            .active_matches()
            .and_then(|set| set.get(match_index))
            .and_then(|found| {
                found
                    .verse_index
                    .or_else(|| self.layout.text.verse_of_line(found.line_index))
            })
            .ok_or(ControllerError::UnknownMatch(match_index))?;

        let hits = engine
            .search_by_verse(verse_index, Some(limit), Some(min_score))
            .await?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                let verse = self.corpus.verse(hit.verse_index)?;
                Some(CrossReference {
                    verse_index: hit.verse_index,
                    score: hit.score,
                    reference: verse.reference(),
                    text: verse.text.clone(),
                })
            })
            .collect())
    }

    /// Route a click to the highlights.
    ///
    /// A hit fires the highlight click handler, then jumps to the match.
    pub fn handle_click(&mut self, screen_x: f64, screen_y: f64) -> Option<usize> {
        self.render_frame();
        let match_index = self.reconciler.click(&self.surface, screen_x, screen_y)?;
        if let Err(e) = self.jump_to_match_and_zoom(match_index) {
            warn!(error = %e, "Clicked highlight has no match");
        }
        Some(match_index)
    }

    // ===== View mode =====

    /// Switch between the all-books view and a single book.
    ///
    /// Clears the search and fits the new layout to the screen.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), ControllerError> {
        let book_view = match mode {
            ViewMode::AllBooks => None,
            ViewMode::SingleBook(book) => {
                Some(self.corpus.filter_book(book).ok_or(ControllerError::UnknownBook(book))?)
            }
        };

        self.clear_search();
        self.book_view = book_view;
        self.view_mode = mode;
        let layout = CorpusLayout::build(self.view_corpus(), &self.config.layout, mode);
        self.metrics = ContentMetrics::new(&self.config.viewport, &layout.columns, self.config.layout.line_width);
        self.layout = layout;
        self.content_dirty = true;
        self.fit_to_screen();
        info!(mode = ?mode, verses = self.view_corpus().len(), "View mode changed");
        Ok(())
    }

    // ===== Rendering =====

    fn needs_pass(&self) -> bool {
        if self.content_dirty {
            return true;
        }
        let Some(last) = self.last_rendered else {
            return true;
        };
        let cfg = &self.config.viewport;
        let vp = &self.viewport;
        vp.text_resolution != last.text_resolution
            || zoom_moved(last.zoom, vp.zoom, cfg.zoom_epsilon)
            || (vp.offset_x - last.offset_x).abs() >= cfg.pan_threshold_px
            || (vp.offset_y - last.offset_y).abs() >= cfg.pan_threshold_px
    }

    /// Sync the surface with the current state.
    ///
    /// The surface transform always follows the viewport. Reconciliation runs
    /// only after a content change, a tier change, or a viewport move past
    /// the pan and zoom thresholds. Returns whether it ran.
    pub fn render_frame(&mut self) -> bool {
        let vp = self.viewport;
        self.surface.set_transform(vp.zoom, vp.offset_x, vp.offset_y);
        if !self.needs_pass() {
            return false;
        }

        let window = visible_window(&self.config.viewport, &self.metrics, &vp, self.screen);
        let ctx = FrameContext {
            lines: self.layout.text.lines(),
            columns: &self.layout.columns,
            regions: &self.layout.regions,
            metrics: self.metrics,
            window: &window,
            zoom: vp.zoom,
            resolution: vp.text_resolution,
        };
        let matches = match self.mode {
            SearchMode::None => None,
            SearchMode::Exact => Some((self.exact.results(), HighlightKind::Exact)),
            SearchMode::Semantic => Some((&self.semantic.matches, HighlightKind::Semantic)),
        };

        self.last_stats = self.reconciler.render(&mut self.surface, &ctx, matches);
        self.last_rendered = Some(vp);
        self.content_dirty = false;
        true
    }

    /// Destroy every visual object and drop observers and search state.
    pub fn destroy(&mut self) {
        self.search_token += 1;
        self.exact.clear();
        self.semantic = SemanticResults::default();
        self.mode = SearchMode::None;
        self.reconciler.destroy(&mut self.surface);
        self.zoom_observers.clear();
        self.semantic_engine = None;
        self.last_rendered = None;
        self.content_dirty = true;
        debug!("Controller destroyed");
    }
}

/// True when `to` differs from `from` by more than `epsilon` relative to `from`.
fn zoom_moved(from: f64, to: f64, epsilon: f64) -> bool {
    (to - from).abs() > epsilon * from.abs()
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
