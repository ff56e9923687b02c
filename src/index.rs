//! The index module
//! Builds the all-pairs similarity matrix and answers nearest-neighbor queries by title

use crate::catalog::{normalize_catalog, Item, RawRecord};
use crate::config::IndexConfig;
use crate::vector::{cosine_from_parts, dot_product, squared_norm, to_dense, SparseVector};
use crate::vectorize::{CountVectorizer, Vocabulary};
use serde::Serialize;
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Instant,
};

/// Number of recommendations returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 5;

/// Dense, symmetric `n × n` cosine similarity matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Upper triangle is computed once and mirrored, so `get(i, j) == get(j, i)` exactly.
    fn from_vectors(vectors: &[SparseVector]) -> SimilarityMatrix {
        let n = vectors.len();
        let norms: Vec<u64> = vectors.iter().map(|v| squared_norm(v)).collect();
        let mut values = vec![0.0f32; n * n];

        for i in 0..n {
            for j in i..n {
                let sim = if i == j {
                    if norms[i] == 0 { 0.0 } else { 1.0 }
                } else {
                    cosine_from_parts(dot_product(&vectors[i], &vectors[j]), norms[i], norms[j])
                };
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        SimilarityMatrix { size: n, values }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, row: usize, column: usize) -> f32 {
        assert!(column < self.size, "column {} out of bounds", column);
        self.values[row * self.size + column]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.size;
        &self.values[start..start + self.size]
    }
}

/// A ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub row: usize,
    pub id: i64,
    pub title: String,
    pub score: f32,
}

/// Immutable content-based similarity index over a catalog.
///
/// Items, feature vectors and matrix rows share the same row index.
///
/// # Examples
///
/// ```
/// use movierec::{Item, IndexConfig, SimilarityIndex};
///
/// let items = vec![
///     Item::new(1, "A", "  space adventure"),
///     Item::new(2, "B", "  space adventure"),
///     Item::new(3, "C", "  cooking show"),
/// ];
/// let index = SimilarityIndex::build(items, &IndexConfig::default());
///
/// assert_eq!(index.recommend("A", 2), vec!["B", "C"]);
/// assert!(index.recommend("Nonexistent Title XYZ", 5).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    items: Vec<Item>,
    vocabulary: Vocabulary,
    vectors: Vec<SparseVector>,
    matrix: SimilarityMatrix,
}

impl SimilarityIndex {
    /// Vectorizes every tag and precomputes the similarity matrix.
    ///
    /// Deterministic for a fixed item order; an empty catalog gives an
    /// empty vocabulary and a 0×0 matrix.
    pub fn build(items: Vec<Item>, config: &IndexConfig) -> SimilarityIndex {
        let start = Instant::now();

        let vectorizer = CountVectorizer::new(config);
        let tags: Vec<&str> = items.iter().map(|i| i.tag.as_str()).collect();
        let vocabulary = vectorizer.fit(&tags);
        let vectors: Vec<SparseVector> = tags
            .iter()
            .map(|tag| vectorizer.transform(&vocabulary, tag))
            .collect();
        let matrix = SimilarityMatrix::from_vectors(&vectors);

        tracing::info!(
            items = items.len(),
            vocabulary = vocabulary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "similarity index built"
        );

        SimilarityIndex { items, vocabulary, vectors, matrix }
    }

    /// Normalizes raw records and builds the index from them.
    pub fn from_records(records: &[RawRecord], config: &IndexConfig) -> SimilarityIndex {
        SimilarityIndex::build(normalize_catalog(records), config)
    }

    /// Row index of the first item whose title equals `title` exactly.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.items.iter().position(|item| item.title == title)
    }

    /// Up to `k` items most similar to `title`, best first.
    ///
    /// Returns `None` if no item has that title. Ties in score rank by
    /// ascending row. The query item, and any other item with the same title,
    /// never appears in the result.
    pub fn neighbors(&self, title: &str, k: usize) -> Option<Vec<Neighbor>> {
        let query = self.position(title)?;

        let mut ranked: Vec<(usize, f32)> = self
            .matrix
            .row(query)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(row, _)| self.items[row].title != title)
            .collect();
        // stable sort keeps ascending row order among equal scores
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        let neighbors = ranked
            .into_iter()
            .map(|(row, score)| Neighbor {
                row,
                id: self.items[row].id,
                title: self.items[row].title.clone(),
                score,
            })
            .collect();

        Some(neighbors)
    }

    /// Titles of up to `k` items most similar to `title`.
    /// Empty if the title is not in the catalog.
    pub fn recommend(&self, title: &str, k: usize) -> Vec<String> {
        self.neighbors(title, k)
            .unwrap_or_default()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, row: usize) -> Option<&Item> {
        self.items.get(row)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.title.as_str())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Dense count vector of an item, aligned with vocabulary columns.
    pub fn feature_vector(&self, row: usize) -> Option<Vec<u32>> {
        self.vectors
            .get(row)
            .map(|v| to_dense(v, self.vocabulary.len()))
    }

    /// Non-zero `(token, count)` features of an item, in column order.
    pub fn features(&self, row: usize) -> Option<Vec<(&str, u32)>> {
        self.vectors.get(row).map(|v| {
            v.iter()
                .filter_map(|&(c, n)| self.vocabulary.token(c).map(|t| (t, n)))
                .collect()
        })
    }

    pub fn similarity(&self, left: usize, right: usize) -> Option<f32> {
        (left < self.len() && right < self.len()).then(|| self.matrix.get(left, right))
    }
}

/// Shared slot holding the live index.
///
/// Readers take an `Arc` snapshot; a rebuilt index is swapped in whole, so
/// no reader sees a partially built one.
#[derive(Debug)]
pub struct IndexHandle {
    current: RwLock<Arc<SimilarityIndex>>,
}

impl IndexHandle {
    pub fn new(index: SimilarityIndex) -> IndexHandle {
        IndexHandle { current: RwLock::new(Arc::new(index)) }
    }

    pub fn current(&self) -> Arc<SimilarityIndex> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `index` and returns the one it replaced.
    pub fn replace(&self, index: SimilarityIndex) -> Arc<SimilarityIndex> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, Arc::new(index))
    }
}

#[cfg(test)]
mod index_test {
    use super::*;

    fn scenario_items() -> Vec<Item> {
        vec![
            Item::new(1, "A", "  space adventure"),
            Item::new(2, "B", "  space adventure"),
            Item::new(3, "C", "  cooking show"),
        ]
    }

    fn build(items: Vec<Item>) -> SimilarityIndex {
        SimilarityIndex::build(items, &IndexConfig::default())
    }

    // ========== Build Tests ==========

    #[test]
    fn test_build_alignment() {
        let index = build(scenario_items());
        assert_eq!(index.len(), 3);
        assert_eq!(index.matrix().size(), 3);
        assert_eq!(index.vocabulary().tokens(), &["adventure", "cooking", "space"]);
        assert_eq!(index.feature_vector(0), Some(vec![1, 0, 1]));
        assert_eq!(index.feature_vector(2), Some(vec![0, 1, 0]));
        assert_eq!(index.feature_vector(3), None);
    }

    #[test]
    fn test_build_matrix_values() {
        let index = build(scenario_items());
        assert_eq!(index.similarity(0, 0), Some(1.0));
        assert!((index.similarity(0, 1).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(index.similarity(0, 2), Some(0.0));
        assert_eq!(index.similarity(0, 3), None);
    }

    #[test]
    fn test_build_empty_catalog() {
        let index = build(Vec::new());
        assert!(index.is_empty());
        assert!(index.vocabulary().is_empty());
        assert_eq!(index.matrix().size(), 0);
        assert!(index.recommend("A", 5).is_empty());
        assert!(index.neighbors("A", 5).is_none());
    }

    #[test]
    fn test_build_zero_vector_row() {
        let items = vec![
            Item::new(1, "A", "  space adventure"),
            Item::new(2, "Empty", "  "),
        ];
        let index = build(items);
        assert_eq!(index.similarity(1, 1), Some(0.0));
        assert_eq!(index.similarity(0, 1), Some(0.0));
        assert_eq!(index.similarity(0, 0), Some(1.0));
    }

    #[test]
    fn test_build_deterministic() {
        let a = build(scenario_items());
        let b = build(scenario_items());
        assert_eq!(a.matrix(), b.matrix());
    }

    #[test]
    fn test_build_respects_max_features() {
        let index = SimilarityIndex::build(
            scenario_items(),
            &IndexConfig::default().with_max_features(1),
        );
        // adventure (2) and space (2) tie; the lexicographically first wins
        assert_eq!(index.vocabulary().tokens(), &["adventure"]);
        assert_eq!(index.feature_vector(2), Some(vec![0]));
    }

    #[test]
    fn test_from_records() {
        let records = vec![RawRecord {
            id: 7,
            title: "Avatar".to_string(),
            genres: Some(r#"[{"id": 28, "name": "Action"}]"#.to_string()),
            keywords: Some("not a list".to_string()),
            overview: None,
        }];
        let index = SimilarityIndex::from_records(&records, &IndexConfig::default());
        assert_eq!(index.item(0).unwrap().tag, "Action  ");
        assert_eq!(index.features(0), Some(vec![("action", 1)]));
    }

    // ========== Query Tests ==========

    #[test]
    fn test_recommend_scenario() {
        let index = build(scenario_items());
        assert_eq!(index.recommend("A", 2), vec!["B", "C"]);
    }

    #[test]
    fn test_recommend_excludes_query() {
        let index = build(scenario_items());
        for title in ["A", "B", "C"] {
            assert!(!index.recommend(title, 10).iter().any(|t| t == title));
        }
    }

    #[test]
    fn test_recommend_fewer_than_k() {
        let index = build(scenario_items());
        assert_eq!(index.recommend("C", 5).len(), 2);
        assert!(index.recommend("C", 0).is_empty());
    }

    #[test]
    fn test_recommend_not_found() {
        let index = build(scenario_items());
        assert!(index.recommend("Nonexistent Title XYZ", 5).is_empty());
        assert!(index.recommend("a", 5).is_empty()); // case-sensitive
    }

    #[test]
    fn test_neighbors_found_but_alone() {
        let index = build(vec![Item::new(1, "Solo", "  space")]);
        assert_eq!(index.neighbors("Solo", 5), Some(Vec::new()));
        assert_eq!(index.neighbors("Other", 5), None);
    }

    #[test]
    fn test_neighbors_ties_by_row() {
        let items = vec![
            Item::new(1, "Q", "  robot"),
            Item::new(2, "X", "  dragon"),
            Item::new(3, "Y", "  wizard"),
            Item::new(4, "Z", "  robot"),
        ];
        let index = build(items);
        let neighbors = index.neighbors("Q", 3).unwrap();
        let rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();
        assert_eq!(rows, vec![3, 1, 2]);
        assert_eq!(neighbors[0].id, 4);
        assert!((neighbors[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recommend_duplicate_titles_use_first() {
        let items = vec![
            Item::new(1, "X", "  space"),
            Item::new(2, "Space Film", "  space"),
            Item::new(3, "Cooking Film", "  cooking"),
            Item::new(4, "X", "  cooking"),
        ];
        let index = build(items);
        assert_eq!(index.position("X"), Some(0));
        for _ in 0..3 {
            assert_eq!(index.recommend("X", 2), vec!["Space Film", "Cooking Film"]);
        }
    }

    // ========== Handle Tests ==========

    #[test]
    fn test_handle_replace_keeps_old_snapshot() {
        let handle = IndexHandle::new(build(scenario_items()));
        let before = handle.current();

        let old = handle.replace(build(Vec::new()));
        assert_eq!(old.len(), 3);
        assert_eq!(before.len(), 3);
        assert!(handle.current().is_empty());
    }
}
