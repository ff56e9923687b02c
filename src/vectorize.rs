//! Bag-of-words vectorization of item tags.
//!
//! Text is lowercased and split into word tokens of at least two word
//! characters. Stop words are dropped, the most frequent tokens across the
//! corpus form the [`Vocabulary`], and each tag becomes a count vector over it.

use crate::config::IndexConfig;
use crate::stopwords::StopWords;
use crate::vector::SparseVector;
use regex::Regex;
use std::{
    collections::{BTreeMap, HashMap},
    sync::LazyLock,
};

/// Word tokens of two or more word characters.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex")
});

/// Frozen token → column mapping. Columns follow ascending token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    columns: HashMap<String, u32>,
}

impl Vocabulary {
    fn from_sorted(tokens: Vec<String>) -> Vocabulary {
        let columns = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Vocabulary { tokens, columns }
    }

    pub fn column(&self, token: &str) -> Option<u32> {
        self.columns.get(token).copied()
    }

    pub fn token(&self, column: u32) -> Option<&str> {
        self.tokens.get(column as usize).map(String::as_str)
    }

    /// Tokens in column order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Token counter with a fixed stop-word set and vocabulary bound.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    stop_words: StopWords,
    max_features: usize,
}

impl CountVectorizer {
    pub fn new(config: &IndexConfig) -> CountVectorizer {
        let stop_words = if config.stop_words {
            StopWords::english()
        } else {
            StopWords::none()
        };

        CountVectorizer {
            stop_words,
            max_features: config.max_features,
        }
    }

    /// Lowercased, stop-word-filtered tokens of `text`, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use movierec::{CountVectorizer, IndexConfig};
    ///
    /// let vectorizer = CountVectorizer::new(&IndexConfig::default());
    /// assert_eq!(vectorizer.tokenize("The Dark Knight, a hero"), vec!["dark", "knight", "hero"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(t))
            .map(str::to_string)
            .collect()
    }

    /// Builds the vocabulary from a corpus.
    ///
    /// Tokens are ranked by total occurrences across all documents (ties by
    /// ascending token) and the top `max_features` are kept.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Vocabulary {
        let mut frequencies: BTreeMap<String, u64> = BTreeMap::new();
        for doc in documents {
            for token in self.tokenize(doc.as_ref()) {
                *frequencies.entry(token).or_insert(0) += 1;
            }
        }

        // BTreeMap iterates in token order; the stable sort keeps it for ties
        let mut ranked: Vec<(String, u64)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut tokens: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        tokens.sort();

        Vocabulary::from_sorted(tokens)
    }

    /// Count vector of `text` over `vocabulary`. Unknown tokens are ignored.
    pub fn transform(&self, vocabulary: &Vocabulary, text: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for token in self.tokenize(text) {
            if let Some(column) = vocabulary.column(&token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }
}
