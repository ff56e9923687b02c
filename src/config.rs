//! Build parameters and process configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Number of vocabulary columns kept when nothing else is configured.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Parameters of a [`SimilarityIndex`](crate::SimilarityIndex) build.
///
/// # Examples
///
/// ```
/// use movierec::IndexConfig;
///
/// let config = IndexConfig::default().with_max_features(100);
/// assert_eq!(config.max_features, 100);
/// assert!(config.stop_words);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexConfig {
    /// Upper bound on vocabulary size (top tokens by corpus frequency)
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Drop English stop words before counting
    #[serde(default = "default_stop_words")]
    pub stop_words: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            max_features: DEFAULT_MAX_FEATURES,
            stop_words: true,
        }
    }
}

impl IndexConfig {
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_stop_words(mut self, stop_words: bool) -> Self {
        self.stop_words = stop_words;
        self
    }
}

/// Process configuration loaded from `MOVIEREC_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Catalog file (.csv or .json)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Default number of recommendations per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_stop_words")]
    pub stop_words: bool,
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_stop_words() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_top_k() -> usize {
    crate::index::DEFAULT_TOP_K
}

impl AppConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::prefixed("MOVIEREC_").from_env::<AppConfig>()?)
    }

    /// Parse configuration from an explicit set of (unprefixed) variables.
    pub fn from_vars<I>(vars: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, AppConfig>(vars)?)
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            max_features: self.max_features,
            stop_words: self.stop_words,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
