//! The catalog module
//! Raw catalog records, tag normalization and catalog file loading

use crate::error::{Error, Result};
use crate::literal::parse_literal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::File,
    io::BufReader,
    path::Path,
};

/// One catalog row as supplied by the data source.
///
/// `genres` and `keywords` hold string-serialized lists of named entities,
/// e.g. `[{"id": 28, "name": "Action"}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// A catalog item with its normalized tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub tag: String,
}

impl Item {
    pub fn new(id: i64, title: impl Into<String>, tag: impl Into<String>) -> Item {
        Item { id, title: title.into(), tag: tag.into() }
    }

    pub fn from_record(record: &RawRecord) -> Item {
        Item {
            id: record.id,
            title: record.title.clone(),
            tag: normalize(record),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EntityParseError {
    #[error("not a JSON or Python-style list: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("expected a list of entities")]
    NotAList,

    #[error("entity {0} has no string 'name'")]
    MissingName(usize),
}

/// Parses a string-serialized entity list and returns the `name` of each
/// entity in order.
///
/// JSON is tried first; Python-style literals with single quotes are
/// accepted as well. The JSON error is reported when neither form parses.
///
/// # Examples
///
/// ```
/// use movierec::catalog::parse_entity_names;
///
/// let names = parse_entity_names(r#"[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]"#).unwrap();
/// assert_eq!(names, vec!["Action", "Adventure"]);
///
/// let names = parse_entity_names("[{'id': 18, 'name': 'Drama'}]").unwrap();
/// assert_eq!(names, vec!["Drama"]);
///
/// assert!(parse_entity_names("not a list").is_err());
/// ```
pub fn parse_entity_names(raw: &str) -> std::result::Result<Vec<String>, EntityParseError> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(json_error) => parse_literal(raw).map_err(|_| EntityParseError::Syntax(json_error))?,
    };
    let Value::Array(entities) = value else {
        return Err(EntityParseError::NotAList);
    };

    entities
        .iter()
        .enumerate()
        .map(|(i, entity)| {
            entity
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(EntityParseError::MissingName(i))
        })
        .collect()
}

/// Space-joined entity names of a list field.
/// Missing or malformed fields contribute an empty string.
pub fn entity_tokens(field: Option<&str>) -> String {
    let Some(raw) = field else {
        return String::new();
    };

    match parse_entity_names(raw) {
        Ok(names) => names.join(" "),
        Err(e) => {
            tracing::debug!(field = raw, error = %e, "treating malformed entity list as empty");
            String::new()
        }
    }
}

/// Builds the tag of a record: `genres + " " + keywords + " " + overview`.
///
/// # Examples
///
/// ```
/// use movierec::catalog::{normalize, RawRecord};
///
/// let record = RawRecord {
///     id: 1,
///     title: "Avatar".to_string(),
///     genres: Some(r#"[{"id": 878, "name": "Science Fiction"}]"#.to_string()),
///     keywords: Some("[]".to_string()),
///     overview: None,
/// };
/// assert_eq!(normalize(&record), "Science Fiction  ");
/// ```
pub fn normalize(record: &RawRecord) -> String {
    let genres = entity_tokens(record.genres.as_deref());
    let keywords = entity_tokens(record.keywords.as_deref());
    let overview = record.overview.as_deref().unwrap_or("");

    format!("{} {} {}", genres, keywords, overview)
}

/// Normalizes every record, preserving order.
pub fn normalize_catalog(records: &[RawRecord]) -> Vec<Item> {
    records.iter().map(Item::from_record).collect()
}

/// Loads catalog records from a `.csv` or `.json` file.
///
/// CSV files are read by header name so extra columns (as in the TMDB
/// movies export) are ignored. JSON files hold an array of records.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let records = match extension.as_str() {
        "csv" => read_csv(reader)?,
        "json" => serde_json::from_reader(reader)?,
        _ => return Err(Error::UnsupportedFormat(path.display().to_string())),
    };

    tracing::info!(path = %path.display(), records = records.len(), "catalog loaded");
    Ok(records)
}

fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
