//! Error types for the scoped-search crate.
//!
//! Only configuration mistakes surface as errors. Malformed query text
//! always degrades to a narrower filter instead.

use thiserror::Error;

/// Errors that can occur when declaring or invoking searches.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A declared field is neither a column nor an `<association>_<column>` name.
    #[error("field '{field}' on model '{model}' is neither a column nor an association field")]
    UnknownField { model: String, field: String },

    /// The schema reports no type for a column the search refers to.
    #[error("column '{column}' on model '{model}' has no declared type")]
    MissingColumnType { model: String, column: String },

    /// No search with this name was registered for the model.
    #[error("no search named '{name}' is registered for model '{model}'")]
    UnknownSearch { model: String, name: String },

    /// A YAML configuration document could not be parsed.
    #[error("invalid search configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON configuration document could not be parsed.
    #[error("invalid search configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    /// Returns `true` for errors caused by a bad search declaration.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, SearchError::UnknownSearch { .. })
    }
}

/// Result type for scoped-search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
