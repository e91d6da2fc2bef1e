//! Precomputed verse embeddings as loaded from persistence.

/// One verse's embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    /// Verse the vector belongs to.
    pub verse_index: usize,
    /// Fixed-length, pre-normalized vector.
    pub embedding: Vec<f32>,
}

/// Validated embedding collection.
///
/// # Invariants
/// - `embedding_size > 0`
/// - every record's embedding has exactly `embedding_size` components
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSet {
    embedding_size: usize,
    records: Vec<EmbeddingRecord>,
}

impl EmbeddingSet {
    /// Keep records whose length matches `embedding_size`.
    ///
    /// Returns the set and the number of records dropped.
    pub fn from_records(embedding_size: usize, records: Vec<EmbeddingRecord>) -> (Self, usize) {
        let before = records.len();
        let records: Vec<EmbeddingRecord> = records
            .into_iter()
            .filter(|r| r.embedding.len() == embedding_size)
            .collect();
        let dropped = before - records.len();
        (
            Self {
                embedding_size,
                records,
            },
            dropped,
        )
    }

    /// Vector length.
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }

    /// Records in load order.
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Consume into records.
    pub fn into_records(self) -> Vec<EmbeddingRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records survived validation.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
