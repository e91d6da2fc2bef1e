//! Packed embedding index with exhaustive and bounded top-k scans.

use super::heap::{ScoreHeap, Scored};
use crate::model::{EmbeddingRecord, EmbeddingSet, SemanticError};
use std::collections::HashMap;
use tracing::debug;

/// A verse and its similarity to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredVerse {
    /// Verse index.
    pub verse_index: usize,
    /// Dot product with the query.
    pub score: f32,
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit length in place. Zero vectors are left unchanged.
pub fn normalize(v: &mut [f32]) {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Embeddings packed row-major into one buffer.
///
/// Row `r` occupies `data[r * dimension..(r + 1) * dimension]` and belongs to
/// `verse_indices[r]`.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
    verse_indices: Vec<usize>,
    rows: HashMap<usize, usize>,
}

impl VectorIndex {
    /// Pack a validated embedding set. Later duplicates of a verse are ignored.
    pub fn from_set(set: EmbeddingSet) -> Self {
        let dimension = set.embedding_size();
        let records = set.into_records();
        let mut index = Self {
            dimension,
            data: Vec::with_capacity(records.len() * dimension),
            verse_indices: Vec::with_capacity(records.len()),
            rows: HashMap::with_capacity(records.len()),
        };
        let mut duplicates = 0usize;
        for EmbeddingRecord {
            verse_index,
            embedding,
        } in records
        {
            if index.rows.contains_key(&verse_index) {
                duplicates += 1;
                continue;
            }
            index.rows.insert(verse_index, index.verse_indices.len());
            index.verse_indices.push(verse_index);
            index.data.extend_from_slice(&embedding);
        }
        if duplicates > 0 {
            debug!(duplicates, "Skipped duplicate verse embeddings");
        }
        index
    }

    /// Pack raw records of `dimension` components.
    ///
    /// Fails on the first record of the wrong length.
    pub fn from_records(
        dimension: usize,
        records: Vec<EmbeddingRecord>,
    ) -> Result<Self, SemanticError> {
        if let Some(bad) = records.iter().find(|r| r.embedding.len() != dimension) {
            return Err(SemanticError::DimensionMismatch {
                expected: dimension,
                got: bad.embedding.len(),
            });
        }
        let (set, _) = EmbeddingSet::from_records(dimension, records);
        Ok(Self::from_set(set))
    }

    /// Vector length.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.verse_indices.len()
    }

    /// True if the index holds no rows.
    pub fn is_empty(&self) -> bool {
        self.verse_indices.is_empty()
    }

    /// True if `verse_index` has a stored embedding.
    pub fn contains(&self, verse_index: usize) -> bool {
        self.rows.contains_key(&verse_index)
    }

    /// Stored embedding of `verse_index`.
    pub fn embedding(&self, verse_index: usize) -> Option<&[f32]> {
        self.rows.get(&verse_index).map(|&row| self.row(row))
    }

    /// Rank every row against `query`.
    ///
    /// `top_k` of `None` or `0` returns every row scoring at least
    /// `min_score`, fully sorted. Otherwise the best `top_k` rows are kept in
    /// a bounded heap and then filtered by `min_score`.
    pub fn search(
        &self,
        query: &[f32],
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredVerse>, SemanticError> {
        self.check_dimension(query)?;
        Ok(self.rank(query, None, top_k, min_score))
    }

    /// Rank rows against the stored embedding of `verse_index`, excluding it.
    pub fn search_by_verse(
        &self,
        verse_index: usize,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredVerse>, SemanticError> {
        let row = *self
            .rows
            .get(&verse_index)
            .ok_or(SemanticError::UnknownVerse(verse_index))?;
        Ok(self.rank(self.row(row), Some(row), top_k, min_score))
    }

    fn check_dimension(&self, query: &[f32]) -> Result<(), SemanticError> {
        if query.len() == self.dimension {
            Ok(())
        } else {
            Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            })
        }
    }

    fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.dimension..(row + 1) * self.dimension]
    }

    fn scores<'a>(
        &'a self,
        query: &'a [f32],
        exclude: Option<usize>,
    ) -> impl Iterator<Item = Scored> + 'a {
        (0..self.len())
            .filter(move |&row| Some(row) != exclude)
            .map(move |row| Scored {
                score: dot(query, self.row(row)),
                row,
            })
    }

    fn rank(
        &self,
        query: &[f32],
        exclude: Option<usize>,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Vec<ScoredVerse> {
        let passes = |s: &Scored| min_score.is_none_or(|min| s.score >= min);

        let ranked = match top_k {
            None | Some(0) => {
                let mut all: Vec<Scored> = self.scores(query, exclude).filter(passes).collect();
                all.sort_by(|a, b| b.score.total_cmp(&a.score));
                all
            }
            Some(k) => {
                let mut heap = ScoreHeap::new(k.min(self.len()));
                for candidate in self.scores(query, exclude) {
                    heap.offer(candidate);
                }
                let mut best = heap.into_sorted_desc();
                best.retain(passes);
                best
            }
        };

        ranked
            .into_iter()
            .map(|s| ScoredVerse {
                verse_index: self.verse_indices[s.row],
                score: s.score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(verse_index: usize, embedding: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            verse_index,
            embedding,
        }
    }

    fn index() -> VectorIndex {
        VectorIndex::from_records(
            2,
            vec![
                record(10, vec![1.0, 0.0]),
                record(11, vec![0.8, 0.6]),
                record(12, vec![0.0, 1.0]),
                record(13, vec![-1.0, 0.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn exhaustive_search_sorts_descending() {
        let results = index().search(&[1.0, 0.0], None, None).unwrap();
        let verses: Vec<usize> = results.iter().map(|r| r.verse_index).collect();
        assert_eq!(verses, vec![10, 11, 12, 13]);
    }

    #[test]
    fn zero_top_k_means_exhaustive() {
        let a = index().search(&[1.0, 0.0], Some(0), Some(0.5)).unwrap();
        let b = index().search(&[1.0, 0.0], None, Some(0.5)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn bounded_search_keeps_top_k() {
        let results = index().search(&[0.0, 1.0], Some(2), None).unwrap();
        let verses: Vec<usize> = results.iter().map(|r| r.verse_index).collect();
        assert_eq!(verses, vec![12, 11]);
    }

    #[test]
    fn top_k_beyond_row_count_is_exhaustive() {
        let exhaustive = index().search(&[1.0, 0.0], None, None).unwrap();
        assert_eq!(index().search(&[1.0, 0.0], Some(5), None).unwrap(), exhaustive);
        assert_eq!(
            index().search(&[1.0, 0.0], Some(usize::MAX), None).unwrap(),
            exhaustive
        );
        let by_verse = index().search_by_verse(10, Some(usize::MAX), None).unwrap();
        assert_eq!(by_verse.len(), 3);
    }

    #[test]
    fn min_score_post_filters_bounded_results() {
        let results = index().search(&[1.0, 0.0], Some(3), Some(0.9)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].verse_index, 10);
    }

    #[test]
    fn search_by_verse_excludes_itself() {
        let results = index().search_by_verse(10, Some(2), None).unwrap();
        let verses: Vec<usize> = results.iter().map(|r| r.verse_index).collect();
        assert_eq!(verses, vec![11, 12]);
    }

    #[test]
    fn unknown_verse_is_error() {
        assert_eq!(
            index().search_by_verse(99, None, None),
            Err(SemanticError::UnknownVerse(99))
        );
    }

    #[test]
    fn wrong_query_length_is_error() {
        assert_eq!(
            index().search(&[1.0], None, None),
            Err(SemanticError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn duplicate_verses_keep_first_row() {
        let index = VectorIndex::from_records(
            1,
            vec![record(0, vec![1.0]), record(0, vec![-1.0])],
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.embedding(0), Some(&[1.0][..]));
    }

    #[test]
    fn normalize_makes_unit_vectors() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((dot(&v, &v) - 1.0).abs() < 1e-6);
        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
