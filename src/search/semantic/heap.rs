//! Fixed-capacity min-heap for top-k selection.
//!
//! The root always holds the lowest score among members, so a candidate
//! only enters a full heap when it beats the root. Ties are unordered.

use std::cmp::Ordering;

/// A score attached to an index row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    /// Similarity score.
    pub score: f32,
    /// Row in the packed index.
    pub row: usize,
}

/// Min-heap of at most `capacity` entries keyed by score.
#[derive(Debug, Clone)]
pub struct ScoreHeap {
    items: Vec<Scored>,
    capacity: usize,
}

impl ScoreHeap {
    /// Empty heap holding at most `capacity` entries.
    ///
    /// Storage grows with the members actually kept, so `capacity` may be
    /// arbitrarily large.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the heap has no members.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True once `capacity` members are held.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Lowest-scoring member.
    pub fn peek(&self) -> Option<&Scored> {
        self.items.first()
    }

    /// Members in heap order.
    pub fn as_slice(&self) -> &[Scored] {
        &self.items
    }

    /// Offer a candidate. Pushes while there is room; afterwards replaces
    /// the root only when `candidate` scores strictly higher.
    ///
    /// Returns true if the candidate was kept.
    pub fn offer(&mut self, candidate: Scored) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if !self.is_full() {
            self.push(candidate);
            return true;
        }
        match self.peek() {
            Some(root) if candidate.score > root.score => {
                self.replace_root(candidate);
                true
            }
            _ => false,
        }
    }

    /// Members sorted by descending score.
    pub fn into_sorted_desc(self) -> Vec<Scored> {
        let mut items = self.items;
        items.sort_by(|a, b| b.score.total_cmp(&a.score));
        items
    }

    fn push(&mut self, item: Scored) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    fn replace_root(&mut self, item: Scored) {
        self.items[0] = item;
        self.sift_down(0);
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.items[a].score.total_cmp(&self.items[b].score) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                break;
            }
            self.items.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.items.swap(i, smallest);
            i = smallest;
        }
    }
}
