//! # movierec - Content-Based Movie Recommendations
//!
//! movierec turns catalog metadata (genres, keywords, overview) into one
//! normalized text tag per movie, vectorizes the tags as bag-of-words token
//! counts, and precomputes a dense all-pairs cosine similarity matrix.
//! Recommendations for a title are a row lookup plus a sort.
//!
//! The index is immutable once built. A catalog change means building a new
//! index and swapping it in through an [`IndexHandle`].
//!
//! ## Example
//!
//! ```
//! use movierec::{IndexConfig, RawRecord, SimilarityIndex};
//!
//! let record = |id, title: &str, overview: &str| RawRecord {
//!     id,
//!     title: title.to_string(),
//!     genres: Some("[]".to_string()),
//!     keywords: Some("[]".to_string()),
//!     overview: Some(overview.to_string()),
//! };
//!
//! let catalog = vec![
//!     record(1, "A", "space adventure"),
//!     record(2, "B", "space adventure"),
//!     record(3, "C", "cooking show"),
//! ];
//!
//! let index = SimilarityIndex::from_records(&catalog, &IndexConfig::default());
//! assert_eq!(index.recommend("A", 2), vec!["B", "C"]);
//! ```

pub mod catalog;
pub mod config;
mod error;
pub mod index;
pub mod literal;
pub mod server;
pub mod stopwords;
pub mod vector;
pub mod vectorize;

pub use catalog::{Item, RawRecord};
pub use config::{AppConfig, IndexConfig};
pub use error::{Error, Result};
pub use index::{IndexHandle, Neighbor, SimilarityIndex, SimilarityMatrix, DEFAULT_TOP_K};
pub use vectorize::{CountVectorizer, Vocabulary};
