//! In-memory [`SchemaView`] implementation.
//!
//! [`MemorySchema`] lets a host describe its models without a live
//! database, either in code or from a YAML/JSON document:
//!
//! ```yaml
//! models:
//!   post:
//!     table: posts
//!     columns:
//!       - { name: title, type: string }
//!       - { name: views, type: integer }
//!     associations:
//!       - { name: author, target: user }
//!   user:
//!     table: users
//!     columns:
//!       - { name: name, type: string }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::{Association, SchemaView};
use crate::value::ValueType;

/// A typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// Description of one model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Backing table, defaults to the model name.
    #[serde(default)]
    pub table: Option<String>,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Associations in declaration order.
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl ModelSchema {
    /// Creates an empty model description.
    pub fn new() -> Self {
        ModelSchema::default()
    }

    /// Sets the backing table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Adds a column.
    pub fn column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            value_type,
        });
        self
    }

    /// Adds an association to `target`.
    pub fn association(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.associations.push(Association::new(name, target));
        self
    }
}

/// Schema held entirely in memory. Models absent from the map have no table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySchema {
    #[serde(default)]
    models: BTreeMap<String, ModelSchema>,
}

impl MemorySchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        MemorySchema::default()
    }

    /// Adds or replaces a model.
    pub fn model(mut self, name: impl Into<String>, model: ModelSchema) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    /// Parses a schema from YAML.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses a schema from JSON.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Returns the description of a model, if present.
    pub fn get(&self, model: &str) -> Option<&ModelSchema> {
        self.models.get(model)
    }
}

impl SchemaView for MemorySchema {
    fn table_exists(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    fn column_names(&self, model: &str) -> Vec<String> {
        self.get(model)
            .map(|m| m.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    fn column_type(&self, model: &str, column: &str) -> Option<ValueType> {
        self.get(model)?
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.value_type)
    }

    fn associations(&self, model: &str) -> Vec<Association> {
        self.get(model)
            .map(|m| m.associations.clone())
            .unwrap_or_default()
    }

    fn table_name(&self, model: &str) -> String {
        self.get(model)
            .and_then(|m| m.table.clone())
            .unwrap_or_else(|| model.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> MemorySchema {
        MemorySchema::new()
            .model(
                "post",
                ModelSchema::new()
                    .table("posts")
                    .column("title", ValueType::String)
                    .column("views", ValueType::Integer)
                    .association("author", "user"),
            )
            .model("user", ModelSchema::new().column("name", ValueType::String))
    }

    #[test]
    fn answers_schema_questions() {
        let schema = schema();
        assert!(schema.table_exists("post"));
        assert!(!schema.table_exists("comment"));
        assert_eq!(schema.column_names("post"), ["title", "views"]);
        assert_eq!(schema.column_type("post", "views"), Some(ValueType::Integer));
        assert_eq!(schema.column_type("post", "ghost"), None);
        assert_eq!(schema.associations("post"), [Association::new("author", "user")]);
        assert!(schema.associations("comment").is_empty());
    }

    #[test]
    fn table_name_defaults_to_model() {
        let schema = schema();
        assert_eq!(schema.table_name("post"), "posts");
        assert_eq!(schema.table_name("user"), "user");
    }

    #[test]
    fn loads_from_yaml() {
        let yaml = r#"
models:
  post:
    table: posts
    columns:
      - { name: title, type: string }
      - { name: views, type: int }
    associations:
      - { name: author, target: user }
  user:
    columns:
      - { name: name, type: string }
"#;
        let loaded = MemorySchema::from_yaml(yaml).unwrap();
        assert_eq!(loaded, schema());
    }

    #[test]
    fn bad_yaml_is_a_configuration_error() {
        let err = MemorySchema::from_yaml("models: [1, 2").unwrap_err();
        assert!(err.is_configuration_error());
    }
}
