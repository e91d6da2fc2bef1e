//! Test fixtures: a small two-book corpus with matching embeddings, a
//! keyword embedder, and a headless terminal harness for the canvas view.

use crate::config::CanvasConfig;
use crate::controller::Controller;
use crate::model::{Corpus, EmbeddingRecord, EmbeddingSet, EmbeddingLoadError, SemanticError, VerseKind, VerseMeta};
use crate::render::Scene;
use crate::search::semantic::{normalize, Embedder, SemanticSearchEngine};
use crate::view::CanvasApp;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::sync::Arc;

/// `(book, chapter, verse, text)` rows of the sample corpus.
pub const SAMPLE_VERSES: [(&str, u32, u32, &str); 6] = [
    ("1 Nephi", 1, 1, "1 Nephi 1:1 I was born of goodly parents"),
    ("1 Nephi", 1, 2, "1 Nephi 1:2 I was taught in the language of my father"),
    ("1 Nephi", 2, 1, "1 Nephi 2:1 My father dwelt in a tent"),
    ("Alma", 1, 1, "Alma 1:1 The people were at peace"),
    ("Alma", 1, 2, "Alma 1:2 They built a great temple"),
    ("Alma", 1, 3, "Alma 1:3 And the temple was holy"),
];

/// Unit vectors for the sample verses on the axes (father, peace, temple).
pub const SAMPLE_EMBEDDINGS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [0.8, 0.6, 0.0],
    [0.6, 0.0, 0.8],
    [0.0, 1.0, 0.0],
    [0.0, 0.8, 0.6],
    [0.0, 0.0, 1.0],
];

/// Six verses, two books (book 1 starts at verse 3).
pub fn sample_corpus() -> Corpus {
    let texts = SAMPLE_VERSES.iter().map(|v| v.3.to_string()).collect();
    let meta = SAMPLE_VERSES
        .iter()
        .map(|&(book, chapter, verse_number, _)| VerseMeta {
            kind: VerseKind::Verse,
            book: book.to_string(),
            chapter,
            verse_number,
        })
        .collect();
    Corpus::from_parts(texts, meta, None).expect("sample corpus is consistent")
}

/// Embeddings for [`sample_corpus`].
pub fn sample_embedding_set() -> EmbeddingSet {
    let records = SAMPLE_EMBEDDINGS
        .iter()
        .enumerate()
        .map(|(verse_index, v)| EmbeddingRecord {
            verse_index,
            embedding: v.to_vec(),
        })
        .collect();
    EmbeddingSet::from_records(3, records).0
}

/// Embeds text as the normalized sum of the axes of the keywords it contains.
#[derive(Debug, Clone)]
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let text = text.to_lowercase();
        let mut v = vec![0.0f32; 3];
        for (axis, word) in ["father", "peace", "temple"].iter().enumerate() {
            if text.contains(word) {
                v[axis] += 1.0;
            }
        }
        normalize(&mut v);
        Ok(v)
    }
}

/// Engine over the sample embeddings with the keyword model attached.
pub fn sample_engine(use_worker: bool) -> SemanticSearchEngine {
    SemanticSearchEngine::new(
        || Ok::<_, EmbeddingLoadError>(sample_embedding_set()),
        use_worker,
    )
    .with_model(|| Ok::<Arc<dyn Embedder>, SemanticError>(Arc::new(KeywordEmbedder)))
}

/// Controller over the sample corpus on an 800x600 screen.
pub fn sample_controller(use_worker: bool) -> Controller<Scene> {
    Controller::new(
        sample_corpus(),
        CanvasConfig::default(),
        Scene::new(),
        800.0,
        600.0,
    )
    .with_semantic_engine(Arc::new(sample_engine(use_worker)))
}

/// Convert a ratatui buffer to text, dropping empty trailing lines.
pub fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area();
    let mut lines = Vec::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer[(x, y)].symbol());
        }
        lines.push(line.trim_end().to_string());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Drives a [`CanvasApp`] on a [`TestBackend`].
pub struct CanvasHarness {
    app: CanvasApp<TestBackend>,
    running: bool,
}

impl CanvasHarness {
    /// Sample corpus on a `width` x `height` terminal.
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height)).expect("test backend");
        let controller = Controller::new(
            sample_corpus(),
            CanvasConfig::default().for_terminal(),
            Scene::new(),
            f64::from(width),
            f64::from(height.saturating_sub(1)),
        )
        .with_semantic_engine(Arc::new(sample_engine(false)));
        Self {
            app: CanvasApp::new(terminal, controller).expect("app"),
            running: true,
        }
    }

    /// Send one key. Returns true if the app quit.
    pub fn send_key(&mut self, key: KeyCode) -> bool {
        if !self.running {
            return true;
        }
        let quit = self.app.handle_key(KeyEvent::new(key, KeyModifiers::NONE));
        if quit {
            self.running = false;
        }
        quit
    }

    /// Type text one character at a time.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            if self.send_key(KeyCode::Char(ch)) {
                break;
            }
        }
    }

    /// Send a key with modifiers. Returns true if the app quit.
    pub fn send_key_with(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        let quit = self.app.handle_key(KeyEvent::new(key, modifiers));
        if quit {
            self.running = false;
        }
        quit
    }

    /// Left-click at a terminal cell.
    pub fn click_at(&mut self, column: u16, row: u16) {
        self.app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    /// Draw one frame and return the screen text.
    pub fn render_to_string(&mut self) -> String {
        self.app.draw().expect("draw succeeds on test backend");
        buffer_to_string(self.app.terminal().backend().buffer())
    }

    /// The app under test.
    pub fn app(&self) -> &CanvasApp<TestBackend> {
        &self.app
    }

    /// Mutable app access.
    pub fn app_mut(&mut self) -> &mut CanvasApp<TestBackend> {
        &mut self.app
    }
}
