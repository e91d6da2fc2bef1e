//! Verse Canvas - Entry Point

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use verse_canvas::config::{CliOverrides, ResolvedConfig};
use verse_canvas::layout::{CorpusLayout, ViewMode};
use verse_canvas::model::{AppError, ControllerError, Corpus};
use verse_canvas::search::semantic::SemanticSearchEngine;
use verse_canvas::search::ExactSearchEngine;
use verse_canvas::source::{load_corpus, EmbeddingFile};
use verse_canvas::view_state::{initial_zoom, ContentMetrics, ScreenSize};

/// Verse Canvas - zoomable canvas for reading and searching a verse corpus
#[derive(Parser, Debug)]
#[command(name = "verse-canvas")]
#[command(version)]
#[command(about = "Pan, zoom and search a verse corpus laid out as one canvas")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Wrap width in characters
    #[arg(long, global = true)]
    pub line_width: Option<usize>,

    /// Run vector search in-process instead of on a worker thread
    #[arg(long, global = true)]
    pub no_worker: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive canvas
    View {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Precomputed verse embeddings for semantic search
        #[arg(short, long)]
        embeddings: Option<PathBuf>,

        /// Show only this book (0-based index)
        #[arg(short, long)]
        book: Option<usize>,
    },

    /// Print exact matches for a term
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Search term (at least 3 characters)
        term: String,
    },

    /// Print the verses most similar to a verse
    Similar {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Verse reference ("Alma 1:2") or 1-based verse number
        verse: String,

        /// Precomputed verse embeddings
        #[arg(short, long)]
        embeddings: Option<PathBuf>,

        /// Maximum number of neighbors
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Score floor
        #[arg(long)]
        min_score: Option<f32>,
    },

    /// Print the layout summary
    Layout {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Screen width in world units
        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        /// Screen height in world units
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// Lay out only this book (0-based index)
        #[arg(short, long)]
        book: Option<usize>,
    },
}

/// Corpus input shared by every subcommand
#[derive(ClapArgs, Debug)]
pub struct CorpusArgs {
    /// Path to the corpus JSON file
    pub corpus: PathBuf,
}

impl Command {
    fn embeddings(&self) -> Option<PathBuf> {
        match self {
            Self::View { embeddings, .. } | Self::Similar { embeddings, .. } => embeddings.clone(),
            Self::Search { .. } | Self::Layout { .. } => None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = verse_canvas::config::load_config_with_precedence(args.config.clone())?;
        let merged = verse_canvas::config::merge_config(config_file);
        let with_env = verse_canvas::config::apply_env_overrides(merged);
        verse_canvas::config::apply_cli_overrides(
            with_env,
            CliOverrides {
                line_width: args.line_width,
                embeddings_path: args.command.embeddings(),
                use_worker: args.no_worker.then_some(false),
            },
        )
    };

    verse_canvas::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    match args.command {
        Command::View { corpus, book, .. } => run_view(&corpus.corpus, &config, book)?,
        Command::Search { corpus, term } => run_search(&corpus.corpus, &term)?,
        Command::Similar {
            corpus,
            verse,
            top_k,
            min_score,
            ..
        } => run_similar(&corpus.corpus, &config, &verse, top_k, min_score)?,
        Command::Layout {
            corpus,
            width,
            height,
            book,
        } => run_layout(&corpus.corpus, &config, width, height, book)?,
    }

    Ok(())
}

fn view_mode(book: Option<usize>) -> ViewMode {
    book.map_or(ViewMode::AllBooks, ViewMode::SingleBook)
}

fn engine_for(config: &ResolvedConfig) -> Option<Arc<SemanticSearchEngine>> {
    config.embeddings_path.as_ref().map(|path| {
        Arc::new(SemanticSearchEngine::new(
            EmbeddingFile::new(path),
            config.search.use_worker,
        ))
    })
}

fn run_view(path: &Path, config: &ResolvedConfig, book: Option<usize>) -> Result<(), AppError> {
    let corpus = load_corpus(path)?;
    let canvas = config.canvas().for_terminal();
    verse_canvas::view::run_canvas(corpus, canvas, engine_for(config), view_mode(book)).map_err(
        |e| match e {
            verse_canvas::view::TuiError::Io(io) => AppError::Terminal(io),
            verse_canvas::view::TuiError::App(app) => app,
        },
    )
}

fn run_search(path: &Path, term: &str) -> Result<(), AppError> {
    let corpus = load_corpus(path)?;
    let texts: Vec<&str> = corpus.verses().iter().map(|v| v.text.as_str()).collect();
    let mut engine = ExactSearchEngine::new();
    let count = engine.search(&texts, term);
    if engine.term().is_none() {
        println!("Search terms need at least 3 characters");
        return Ok(());
    }

    for found in engine.results().matches() {
        let reference = corpus
            .verse(found.line_index)
            .map(|v| v.reference())
            .unwrap_or_default();
        println!("{reference}\t{}", found.line_text);
    }
    println!("{count} matches for \"{term}\"");
    Ok(())
}

fn run_similar(
    path: &Path,
    config: &ResolvedConfig,
    verse: &str,
    top_k: Option<usize>,
    min_score: Option<f32>,
) -> Result<(), AppError> {
    let corpus = load_corpus(path)?;
    let engine = engine_for(config).ok_or(ControllerError::NoSemanticEngine)?;
    let verse_index = verse_canvas::view::resolve_verse(&corpus, verse)
        .ok_or_else(|| ControllerError::UnknownVerse(verse.parse().unwrap_or(usize::MAX)))?;

    let top_k = top_k.unwrap_or(config.search.cross_ref_limit);
    let min_score = min_score.unwrap_or(config.search.cross_ref_min_score);
    let runtime = tokio::runtime::Runtime::new()?;
    let hits = runtime.block_on(engine.search_by_verse(verse_index, Some(top_k), Some(min_score)))?;

    print_reference(&corpus, verse_index, None);
    for hit in hits {
        print_reference(&corpus, hit.verse_index, Some(hit.score));
    }
    Ok(())
}

fn print_reference(corpus: &Corpus, verse_index: usize, score: Option<f32>) {
    let Some(verse) = corpus.verse(verse_index) else {
        return;
    };
    match score {
        Some(score) => println!("  {score:.3}\t{}\t{}", verse.reference(), verse.text),
        None => println!("{}\t{}", verse.reference(), verse.text),
    }
}

fn run_layout(
    path: &Path,
    config: &ResolvedConfig,
    width: f64,
    height: f64,
    book: Option<usize>,
) -> Result<(), AppError> {
    let corpus = load_corpus(path)?;
    let corpus = match book {
        Some(index) => corpus
            .filter_book(index)
            .ok_or(ControllerError::UnknownBook(index))?,
        None => corpus,
    };
    let canvas = config.canvas();
    let layout = CorpusLayout::build(&corpus, &canvas.layout, view_mode(book));
    let metrics = ContentMetrics::new(&canvas.viewport, &layout.columns, canvas.layout.line_width);
    let zoom = initial_zoom(
        &canvas.viewport,
        metrics.total_width(),
        metrics.total_height(),
        ScreenSize::new(width, height),
    );

    println!("verses:           {}", corpus.len());
    println!("lines:            {}", layout.text.line_count());
    println!("columns:          {}", layout.columns.num_columns());
    println!("lines per column: {}", layout.columns.lines_per_column());
    println!(
        "content size:     {:.0} x {:.0}",
        metrics.total_width(),
        metrics.total_height()
    );
    println!("fitted zoom:      {zoom:.4} ({width} x {height})");
    println!("regions:");
    for region in &layout.regions {
        let name = corpus
            .books()
            .get(region.book_index)
            .map_or("?", String::as_str);
        println!(
            "  column {:>3}  rows {:>5}..={:<5}  {}",
            region.column, region.start_line, region.end_line, name
        );
    }
    Ok(())
}
