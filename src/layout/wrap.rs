//! Greedy word wrap of verses into fixed-width lines.
//!
//! Wrapping runs incrementally so a caller can report progress between
//! batches. The output is identical for every batch size.

/// Wrapped lines plus the verse ↔ line mapping.
///
/// # Invariants
/// - `verse_start_lines.len()` equals the number of wrapped verses
/// - `verse_start_lines` is non-decreasing
/// - every verse occupies the contiguous span
///   `verse_start_lines[i]..verse_start_lines[i + 1]` (or `..lines.len()`)
/// - `line_to_verse[l] == i` for every line `l` in verse `i`'s span
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLayout {
    lines: Vec<String>,
    verse_start_lines: Vec<usize>,
    line_to_verse: Vec<usize>,
}

impl TextLayout {
    /// Wrapped lines in verse order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// First line index of each verse.
    pub fn verse_start_lines(&self) -> &[usize] {
        &self.verse_start_lines
    }

    /// Number of wrapped lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of verses wrapped.
    pub fn verse_count(&self) -> usize {
        self.verse_start_lines.len()
    }

    /// Verse owning `line_index`.
    pub fn verse_of_line(&self, line_index: usize) -> Option<usize> {
        self.line_to_verse.get(line_index).copied()
    }

    /// Line span `start..end` of `verse_index`.
    pub fn verse_lines(&self, verse_index: usize) -> Option<std::ops::Range<usize>> {
        let start = *self.verse_start_lines.get(verse_index)?;
        let end = self
            .verse_start_lines
            .get(verse_index + 1)
            .copied()
            .unwrap_or(self.lines.len());
        Some(start..end)
    }
}

/// Progress of an incremental wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapProgress {
    /// More verses remain.
    Pending {
        /// Verses wrapped so far.
        done: usize,
        /// Total verses.
        total: usize,
    },
    /// Every verse has been wrapped.
    Complete,
}

/// Incremental wrapper over a verse sequence.
///
/// ```
/// # use verse_canvas::layout::{LineWrapper, WrapProgress};
/// let verses = ["one two three", "four"];
/// let mut wrapper = LineWrapper::new(&verses, 8);
/// while let WrapProgress::Pending { .. } = wrapper.step(1) {}
/// let layout = wrapper.finish();
/// assert_eq!(layout.lines(), &["one two", "three", "four"]);
/// assert_eq!(layout.verse_start_lines(), &[0, 2]);
/// ```
#[derive(Debug)]
pub struct LineWrapper<'a, S> {
    verses: &'a [S],
    line_width: usize,
    next: usize,
    layout: TextLayout,
}

impl<'a, S: AsRef<str>> LineWrapper<'a, S> {
    /// Prepare to wrap `verses` at `line_width` characters.
    pub fn new(verses: &'a [S], line_width: usize) -> Self {
        Self {
            verses,
            line_width: line_width.max(1),
            next: 0,
            layout: TextLayout {
                lines: Vec::with_capacity(verses.len()),
                verse_start_lines: Vec::with_capacity(verses.len()),
                line_to_verse: Vec::with_capacity(verses.len()),
            },
        }
    }

    /// Wrap up to `batch` more verses.
    pub fn step(&mut self, batch: usize) -> WrapProgress {
        let end = (self.next + batch.max(1)).min(self.verses.len());
        for verse_index in self.next..end {
            let text = self.verses[verse_index].as_ref();
            self.layout.verse_start_lines.push(self.layout.lines.len());
            let before = self.layout.lines.len();
            wrap_into(text, self.line_width, &mut self.layout.lines);
            let added = self.layout.lines.len() - before;
            self.layout
                .line_to_verse
                .extend(std::iter::repeat(verse_index).take(added));
        }
        self.next = end;

        if self.next >= self.verses.len() {
            WrapProgress::Complete
        } else {
            WrapProgress::Pending {
                done: self.next,
                total: self.verses.len(),
            }
        }
    }

    /// Wrap any remaining verses and return the layout.
    pub fn finish(mut self) -> TextLayout {
        while self.next < self.verses.len() {
            self.step(self.verses.len() - self.next);
        }
        self.layout
    }
}

/// Wrap all verses at once.
pub fn wrap<S: AsRef<str>>(verses: &[S], line_width: usize) -> TextLayout {
    LineWrapper::new(verses, line_width).finish()
}

/// Wrap all verses, reporting progress after every `batch` verses.
pub fn wrap_with_progress<S: AsRef<str>>(
    verses: &[S],
    line_width: usize,
    batch: usize,
    mut on_progress: impl FnMut(usize, usize),
) -> TextLayout {
    let mut wrapper = LineWrapper::new(verses, line_width);
    while let WrapProgress::Pending { done, total } = wrapper.step(batch) {
        on_progress(done, total);
    }
    on_progress(verses.len(), verses.len());
    wrapper.finish()
}

/// Wrap one verse, appending its lines to `out`. Always appends at least one line.
fn wrap_into(text: &str, line_width: usize, out: &mut Vec<String>) {
    if text.chars().count() <= line_width {
        out.push(text.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_len = 0usize;
    let mut has_words = false;

    for word in text.split(' ') {
        let word_len = word.chars().count();
        if has_words && current_len + 1 + word_len > line_width {
            out.push(std::mem::take(&mut current));
            current_len = 0;
            has_words = false;
        }
        if has_words {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
        has_words = true;
    }

    if has_words {
        out.push(current);
    }
}
